// File: gameplug-common/src/models/loyalty.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership level attached to a loyalty balance. Drives the earn-side
/// point multiplier and gates access to rewards and packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Silver,
    Gold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }

    /// Unrecognized values fall back to `Free`, mirroring the multiplier
    /// lookup which defaults to 1x.
    pub fn parse(s: &str) -> Tier {
        match s {
            "silver" => Tier::Silver,
            "gold" => Tier::Gold,
            _ => Tier::Free,
        }
    }

    /// Earn-side multiplier: free 1x, silver 1.5x, gold 2x.
    pub fn multiplier(&self) -> f64 {
        match self {
            Tier::Free => 1.0,
            Tier::Silver => 1.5,
            Tier::Gold => 2.0,
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Silver => 1,
            Tier::Gold => 2,
        }
    }
}

/// Tier gate on a reward or pack. `None` bypasses the check entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TierRequirement {
    #[default]
    None,
    Free,
    Silver,
    Gold,
}

impl TierRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierRequirement::None => "none",
            TierRequirement::Free => "free",
            TierRequirement::Silver => "silver",
            TierRequirement::Gold => "gold",
        }
    }

    pub fn parse(s: &str) -> TierRequirement {
        match s {
            "free" => TierRequirement::Free,
            "silver" => TierRequirement::Silver,
            "gold" => TierRequirement::Gold,
            _ => TierRequirement::None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TierRequirement::None | TierRequirement::Free => 0,
            TierRequirement::Silver => 1,
            TierRequirement::Gold => 2,
        }
    }

    pub fn allows(&self, tier: Tier) -> bool {
        tier.rank() >= self.rank()
    }
}

/// One balance row per user, created lazily on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyBalance {
    pub user_id: Uuid,
    /// Current spendable balance; never negative.
    pub points: i64,
    /// Monotonically non-decreasing sum of all positive amounts.
    pub lifetime_points: i64,
    pub tier: Tier,
    pub tier_expires_at: Option<DateTime<Utc>>,
    /// Last daily-login claim, "YYYY-MM-DD".
    pub daily_login_date: Option<String>,
    pub streak_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earn,
    Spend,
    Expire,
    Refund,
    Bonus,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earn => "earn",
            TransactionType::Spend => "spend",
            TransactionType::Expire => "expire",
            TransactionType::Refund => "refund",
            TransactionType::Bonus => "bonus",
        }
    }

    pub fn parse(s: &str) -> Result<TransactionType, crate::Error> {
        match s {
            "earn" => Ok(TransactionType::Earn),
            "spend" => Ok(TransactionType::Spend),
            "expire" => Ok(TransactionType::Expire),
            "refund" => Ok(TransactionType::Refund),
            "bonus" => Ok(TransactionType::Bonus),
            other => Err(crate::Error::Parse(format!(
                "unknown transaction type '{other}'"
            ))),
        }
    }
}

/// Why a transaction happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Purchase,
    Signup,
    DailyLogin,
    Quest,
    PackOpen,
    RedeemReward,
    AdminGrant,
    TierBonus,
    Referral,
    Expiration,
    Refund,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::Purchase => "purchase",
            TransactionSource::Signup => "signup",
            TransactionSource::DailyLogin => "daily_login",
            TransactionSource::Quest => "quest",
            TransactionSource::PackOpen => "pack_open",
            TransactionSource::RedeemReward => "redeem_reward",
            TransactionSource::AdminGrant => "admin_grant",
            TransactionSource::TierBonus => "tier_bonus",
            TransactionSource::Referral => "referral",
            TransactionSource::Expiration => "expiration",
            TransactionSource::Refund => "refund",
        }
    }

    pub fn parse(s: &str) -> Result<TransactionSource, crate::Error> {
        match s {
            "purchase" => Ok(TransactionSource::Purchase),
            "signup" => Ok(TransactionSource::Signup),
            "daily_login" => Ok(TransactionSource::DailyLogin),
            "quest" => Ok(TransactionSource::Quest),
            "pack_open" => Ok(TransactionSource::PackOpen),
            "redeem_reward" => Ok(TransactionSource::RedeemReward),
            "admin_grant" => Ok(TransactionSource::AdminGrant),
            "tier_bonus" => Ok(TransactionSource::TierBonus),
            "referral" => Ok(TransactionSource::Referral),
            "expiration" => Ok(TransactionSource::Expiration),
            "refund" => Ok(TransactionSource::Refund),
            other => Err(crate::Error::Parse(format!(
                "unknown transaction source '{other}'"
            ))),
        }
    }
}

/// Append-only ledger entry. `balance` snapshots the user's points
/// immediately after this transaction committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransaction {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub tx_type: TransactionType,
    /// Signed; positive for earn, negative for spend. Tier multiplier
    /// already applied for earn-type entries.
    pub amount: i64,
    pub balance: i64,
    pub source: TransactionSource,
    pub description: String,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One page of transaction history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<PointsTransaction>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}
