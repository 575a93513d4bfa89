use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use gameplug_common::models::loyalty::{TransactionSource, TransactionType};
use gameplug_common::models::pack::{
    DropResult, DropType, Pack, PackDrop, PackListing, PackOpening,
};
use gameplug_common::traits::repository_traits::PackRepository;

use crate::Error;
use crate::services::ledger_service::LedgerService;
use crate::utils::generate_coupon_code;

/// Openings kept in the user-facing history response.
const OPENING_HISTORY_LIMIT: i64 = 50;

/// Points granted by a points-type drop that forgot to configure an amount.
const DEFAULT_POINTS_DROP: i64 = 50;

/// Roulette-wheel selection over a drop table: draws a uniform integer in
/// `[0, total_weight)` and walks the table in stored order, so each drop's
/// probability is exactly `weight / total_weight` regardless of position.
/// Returns `None` when the table has no probability mass at all. The
/// trailing fallback to the last drop is unreachable while the invariant
/// `roll < total` holds, but keeps a malformed table from panicking.
pub fn select_drop<'a, R: Rng>(drops: &'a [PackDrop], rng: &mut R) -> Option<&'a PackDrop> {
    let total: i64 = drops.iter().map(|d| i64::from(d.weight.max(0))).sum();
    if total <= 0 {
        return None;
    }

    let roll = rng.random_range(0..total);
    let mut cumulative = 0i64;
    for drop in drops {
        cumulative += i64::from(drop.weight.max(0));
        if roll < cumulative {
            return Some(drop);
        }
    }
    drops.last()
}

#[derive(Debug, Clone, Serialize)]
pub struct PackOpenResult {
    pub result: DropResult,
    pub new_balance: i64,
    pub message: String,
}

/// Charges the pack cost through the ledger, then performs the server-side
/// draw. The client never sees weights and never supplies randomness; the
/// draw runs on an OS-seeded ChaCha generator so observed outcomes cannot
/// be predicted or replayed.
pub struct PackService {
    pack_repo: Arc<dyn PackRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
}

impl PackService {
    pub fn new(pack_repo: Arc<dyn PackRepository + Send + Sync>, ledger: Arc<LedgerService>) -> Self {
        Self { pack_repo, ledger }
    }

    /// Enabled packs with drop weights stripped.
    pub async fn list_packs(&self) -> Result<Vec<PackListing>, Error> {
        let packs = self.pack_repo.list_enabled().await?;
        Ok(packs.into_iter().map(PackListing::from).collect())
    }

    pub async fn opening_history(&self, user_id: Uuid) -> Result<Vec<PackOpening>, Error> {
        self.pack_repo
            .list_openings_for_user(user_id, OPENING_HISTORY_LIMIT)
            .await
    }

    pub async fn open_pack(&self, user_id: Uuid, pack_id: Uuid) -> Result<PackOpenResult, Error> {
        let pack = self
            .pack_repo
            .get_pack(pack_id)
            .await?
            .filter(|p| p.enabled)
            .ok_or_else(|| Error::NotFound("Pack not found or disabled".to_string()))?;

        let balance = self.ledger.get_balance(user_id).await?;
        if !pack.tier_required.allows(balance.tier) {
            return Err(Error::Forbidden(format!(
                "Requires {} tier",
                pack.tier_required.as_str()
            )));
        }

        // A pack with no probability mass is a catalog bug; reject before
        // taking any points.
        if pack.total_weight() <= 0 {
            return Err(Error::InvalidInput(
                "pack has no drops configured".to_string(),
            ));
        }

        self.ledger
            .try_spend(
                user_id,
                pack.points_cost,
                TransactionSource::PackOpen,
                &format!("Opened pack: {}", pack.name),
                json!({ "pack_id": pack.pack_id }),
            )
            .await?;

        let mut rng = StdRng::try_from_os_rng().map_err(|e| Error::Rng(e.to_string()))?;
        let selected = match select_drop(&pack.drops, &mut rng) {
            Some(drop) => drop.clone(),
            None => {
                self.refund_spend(user_id, &pack).await;
                return Err(Error::InvalidInput(
                    "pack has no drops configured".to_string(),
                ));
            }
        };

        // The spend has committed; if granting the reward fails the cost is
        // handed back before the error propagates.
        let result = match self.realize_drop(user_id, &pack, &selected).await {
            Ok(result) => result,
            Err(e) => {
                self.refund_spend(user_id, &pack).await;
                return Err(e);
            }
        };

        let opening = PackOpening {
            opening_id: Uuid::new_v4(),
            user_id,
            pack_id: pack.pack_id,
            points_spent: pack.points_cost,
            result: result.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.pack_repo.insert_opening(&opening).await {
            self.refund_spend(user_id, &pack).await;
            return Err(e);
        }

        let refreshed = self.ledger.get_balance(user_id).await?;
        Ok(PackOpenResult {
            result,
            new_balance: refreshed.points,
            message: "Pack opened!".to_string(),
        })
    }

    async fn realize_drop(
        &self,
        user_id: Uuid,
        pack: &Pack,
        selected: &PackDrop,
    ) -> Result<DropResult, Error> {
        let (value, fallback_label): (Value, String) = match selected.drop_type {
            DropType::Points => {
                let amount = if selected.points_amount > 0 {
                    selected.points_amount
                } else {
                    DEFAULT_POINTS_DROP
                };
                self.ledger
                    .add_points(
                        user_id,
                        amount,
                        TransactionType::Earn,
                        TransactionSource::PackOpen,
                        &format!("Pack drop: {amount} points"),
                        json!({ "pack_id": pack.pack_id }),
                    )
                    .await?;
                (json!(amount), format!("{amount} bonus points"))
            }
            DropType::Coupon => {
                let code = generate_coupon_code()?;
                (
                    json!({
                        "code": code,
                        "discount_percent": selected.discount_percent,
                        "discount_amount": selected.discount_amount,
                    }),
                    "Discount coupon".to_string(),
                )
            }
            DropType::Product => (
                json!({ "product_id": selected.product_id }),
                "Free product".to_string(),
            ),
            DropType::Nothing => (Value::Null, "Better luck next time!".to_string()),
        };

        let label = if selected.label.is_empty() {
            fallback_label
        } else {
            selected.label.clone()
        };

        Ok(DropResult {
            drop_type: selected.drop_type,
            rarity: selected.rarity,
            label,
            value,
        })
    }

    /// Compensating credit for a spend whose follow-up failed. A refund
    /// failure is logged and dropped; the original error still propagates.
    async fn refund_spend(&self, user_id: Uuid, pack: &Pack) {
        let outcome = self
            .ledger
            .add_points(
                user_id,
                pack.points_cost,
                TransactionType::Refund,
                TransactionSource::Refund,
                &format!("Refund: pack open failed ({})", pack.name),
                json!({ "pack_id": pack.pack_id }),
            )
            .await;
        if let Err(e) = outcome {
            error!(
                "failed to refund {} points to {} after pack open error: {}",
                pack.points_cost, user_id, e
            );
        }
    }
}
