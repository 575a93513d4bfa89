use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::{Tier, TransactionSource};
use gameplug_common::models::membership::Membership;
use gameplug_common::traits::repository_traits::MembershipRepository;

use crate::Error;
use crate::services::ledger_service::LedgerService;

/// Paid tiers run for 30 days per upgrade.
const TIER_DURATION_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct MembershipOverview {
    pub current_tier: Tier,
    pub tier_expires_at: Option<DateTime<Utc>>,
    pub tiers: Vec<Membership>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierUpgradeResult {
    pub tier: Tier,
    pub expires_at: Option<DateTime<Utc>>,
    pub new_balance: i64,
    pub message: String,
}

pub struct MembershipService {
    membership_repo: Arc<dyn MembershipRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
}

impl MembershipService {
    pub fn new(
        membership_repo: Arc<dyn MembershipRepository + Send + Sync>,
        ledger: Arc<LedgerService>,
    ) -> Self {
        Self {
            membership_repo,
            ledger,
        }
    }

    pub async fn overview(&self, user_id: Uuid) -> Result<MembershipOverview, Error> {
        let balance = self.ledger.get_balance(user_id).await?;
        let tiers = self.membership_repo.list_enabled().await?;
        Ok(MembershipOverview {
            current_tier: balance.tier,
            tier_expires_at: balance.tier_expires_at,
            tiers,
        })
    }

    /// Points-funded upgrade: the membership `price` is charged as a point
    /// cost. The spend is conditional, so an underfunded upgrade fails as
    /// `InsufficientPoints` without touching the tier.
    pub async fn upgrade_tier(&self, user_id: Uuid, tier: Tier) -> Result<TierUpgradeResult, Error> {
        if tier == Tier::Free {
            return Err(Error::InvalidInput("Invalid tier".to_string()));
        }

        let membership = self
            .membership_repo
            .get_by_tier(tier)
            .await?
            .filter(|m| m.enabled)
            .ok_or_else(|| Error::NotFound("Membership tier not found".to_string()))?;

        self.ledger
            .try_spend(
                user_id,
                membership.price,
                TransactionSource::TierBonus,
                &format!("Upgraded to {}", membership.name),
                json!({ "tier": tier }),
            )
            .await?;

        let expires_at = Utc::now() + Duration::days(TIER_DURATION_DAYS);
        let balance = self
            .ledger
            .set_tier(user_id, tier, Some(expires_at))
            .await?;

        Ok(TierUpgradeResult {
            tier: balance.tier,
            expires_at: balance.tier_expires_at,
            new_balance: balance.points,
            message: format!("Upgraded to {}!", membership.name),
        })
    }
}
