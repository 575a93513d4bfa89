// File: gameplug-common/src/models/reward.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::loyalty::TierRequirement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Coupon,
    GiftCard,
    Product,
    PointsBoost,
}

impl RewardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Coupon => "coupon",
            RewardType::GiftCard => "gift_card",
            RewardType::Product => "product",
            RewardType::PointsBoost => "points_boost",
        }
    }

    pub fn parse(s: &str) -> Result<RewardType, crate::Error> {
        match s {
            "coupon" => Ok(RewardType::Coupon),
            "gift_card" => Ok(RewardType::GiftCard),
            "product" => Ok(RewardType::Product),
            "points_boost" => Ok(RewardType::PointsBoost),
            other => Err(crate::Error::Parse(format!("unknown reward type '{other}'"))),
        }
    }

    /// Coupon and gift-card redemptions get a generated code attached.
    pub fn issues_coupon(&self) -> bool {
        matches!(self, RewardType::Coupon | RewardType::GiftCard)
    }
}

/// Admin-curated redeemable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: Uuid,
    pub name: String,
    pub description: String,
    pub reward_type: RewardType,
    pub points_cost: i64,
    pub discount_percent: i32,
    pub discount_amount: i32,
    pub product_id: Option<Uuid>,
    pub image: String,
    /// -1 means unlimited; anything else is decremented per redemption.
    pub stock: i32,
    pub enabled: bool,
    pub tier_required: TierRequirement,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Completed => "completed",
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<RedemptionStatus, crate::Error> {
        match s {
            "completed" => Ok(RedemptionStatus::Completed),
            "pending" => Ok(RedemptionStatus::Pending),
            "cancelled" => Ok(RedemptionStatus::Cancelled),
            other => Err(crate::Error::Parse(format!(
                "unknown redemption status '{other}'"
            ))),
        }
    }
}

/// Immutable record of one successful redemption. Metadata snapshots the
/// reward name/type so later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub redemption_id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub points_spent: i64,
    pub status: RedemptionStatus,
    pub coupon_code: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
