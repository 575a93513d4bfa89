use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use gameplug_common::models::loyalty::{TransactionSource, TransactionType};
use gameplug_common::models::reward::{Redemption, RedemptionStatus, Reward};
use gameplug_common::traits::repository_traits::RewardRepository;

use crate::Error;
use crate::services::ledger_service::LedgerService;
use crate::utils::generate_coupon_code;

#[derive(Debug, Clone, Serialize)]
pub struct RedemptionResult {
    pub redemption: Redemption,
    pub coupon_code: Option<String>,
    pub new_balance: i64,
    pub message: String,
}

pub struct RewardService {
    reward_repo: Arc<dyn RewardRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
}

impl RewardService {
    pub fn new(
        reward_repo: Arc<dyn RewardRepository + Send + Sync>,
        ledger: Arc<LedgerService>,
    ) -> Self {
        Self { reward_repo, ledger }
    }

    /// Enabled rewards, cheapest first.
    pub async fn list_rewards(&self) -> Result<Vec<Reward>, Error> {
        self.reward_repo.list_enabled().await
    }

    pub async fn redemption_history(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        self.reward_repo.list_redemptions_for_user(user_id).await
    }

    /// Gate order: existence -> tier -> points -> stock. The points check
    /// is the ledger's conditional debit and the stock check is a
    /// conditional decrement, so neither can be raced past; if stock runs
    /// out after the spend already committed, the spend is refunded.
    pub async fn redeem_reward(
        &self,
        user_id: Uuid,
        reward_id: Uuid,
    ) -> Result<RedemptionResult, Error> {
        let reward = self
            .reward_repo
            .get_reward(reward_id)
            .await?
            .filter(|r| r.enabled)
            .ok_or_else(|| Error::NotFound("Reward not found or disabled".to_string()))?;

        let balance = self.ledger.get_balance(user_id).await?;
        if !reward.tier_required.allows(balance.tier) {
            return Err(Error::Forbidden(format!(
                "Requires {} tier or higher",
                reward.tier_required.as_str()
            )));
        }

        let (updated, _tx) = self
            .ledger
            .try_spend(
                user_id,
                reward.points_cost,
                TransactionSource::RedeemReward,
                &format!("Redeemed: {}", reward.name),
                json!({ "reward_id": reward.reward_id }),
            )
            .await?;

        if reward.stock != -1 {
            let took_unit = self.reward_repo.try_decrement_stock(reward_id).await?;
            if !took_unit {
                self.refund_spend(user_id, &reward).await;
                return Err(Error::OutOfStock(reward.name));
            }
        }

        let coupon_code = if reward.reward_type.issues_coupon() {
            Some(generate_coupon_code()?)
        } else {
            None
        };

        let redemption = Redemption {
            redemption_id: Uuid::new_v4(),
            user_id,
            reward_id: reward.reward_id,
            points_spent: reward.points_cost,
            status: RedemptionStatus::Completed,
            coupon_code: coupon_code.clone(),
            metadata: json!({
                "reward_name": reward.name,
                "reward_type": reward.reward_type,
            }),
            created_at: Utc::now(),
        };
        if let Err(e) = self.reward_repo.insert_redemption(&redemption).await {
            if reward.stock != -1 {
                if let Err(restore_err) = self.reward_repo.restore_stock(reward_id).await {
                    error!("failed to restore stock for {}: {}", reward_id, restore_err);
                }
            }
            self.refund_spend(user_id, &reward).await;
            return Err(e);
        }

        Ok(RedemptionResult {
            redemption,
            coupon_code,
            new_balance: updated.points,
            message: format!("Successfully redeemed: {}", reward.name),
        })
    }

    async fn refund_spend(&self, user_id: Uuid, reward: &Reward) {
        let outcome = self
            .ledger
            .add_points(
                user_id,
                reward.points_cost,
                TransactionType::Refund,
                TransactionSource::Refund,
                &format!("Refund: redemption failed ({})", reward.name),
                json!({ "reward_id": reward.reward_id }),
            )
            .await;
        if let Err(e) = outcome {
            error!(
                "failed to refund {} points to {} after redemption error: {}",
                reward.points_cost, user_id, e
            );
        }
    }
}
