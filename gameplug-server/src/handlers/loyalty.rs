// File: gameplug-server/src/handlers/loyalty.rs

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use gameplug_common::Error;
use gameplug_common::models::loyalty::{Tier, TransactionPage};
use gameplug_common::models::pack::{PackListing, PackOpening};
use gameplug_common::models::quest::QuestWithProgress;
use gameplug_common::models::reward::{Redemption, Reward};
use gameplug_core::services::ledger_service::{DailyLoginResult, EarnResult, SignupBonusResult};
use gameplug_core::services::membership_service::{MembershipOverview, TierUpgradeResult};
use gameplug_core::services::pack_service::PackOpenResult;
use gameplug_core::services::quest_service::QuestCompletionResult;
use gameplug_core::services::reward_service::RedemptionResult;

use crate::auth::AuthUser;
use crate::context::ServerContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EarnPurchaseBody {
    pub order_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeTierBody {
    pub tier: Option<String>,
}

pub async fn get_balance(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let balance = ctx.ledger.get_balance(auth.user_id).await?;
    Ok(Json(json!({
        "points": balance.points,
        "lifetime_points": balance.lifetime_points,
        "tier": balance.tier,
        "streak_days": balance.streak_days,
    })))
}

pub async fn get_history(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TransactionPage>, ApiError> {
    let page = ctx
        .ledger
        .history(
            auth.user_id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(20),
        )
        .await?;
    Ok(Json(page))
}

pub async fn daily_login(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<DailyLoginResult>, ApiError> {
    Ok(Json(ctx.ledger.daily_login(auth.user_id).await?))
}

pub async fn earn_purchase(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(body): Json<EarnPurchaseBody>,
) -> Result<Json<EarnResult>, ApiError> {
    let (order_id, amount) = match (body.order_id, body.amount) {
        (Some(order_id), Some(amount)) => (order_id, amount),
        _ => {
            return Err(ApiError(Error::InvalidInput(
                "order_id and amount required".to_string(),
            )));
        }
    };
    Ok(Json(
        ctx.ledger
            .earn_from_purchase(auth.user_id, &order_id, amount)
            .await?,
    ))
}

pub async fn signup_bonus(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<SignupBonusResult>, ApiError> {
    Ok(Json(ctx.ledger.signup_bonus(auth.user_id).await?))
}

pub async fn list_rewards(
    State(ctx): State<Arc<ServerContext>>,
    _auth: AuthUser,
) -> Result<Json<Vec<Reward>>, ApiError> {
    Ok(Json(ctx.rewards.list_rewards().await?))
}

pub async fn redeem_reward(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(reward_id): Path<Uuid>,
) -> Result<Json<RedemptionResult>, ApiError> {
    Ok(Json(ctx.rewards.redeem_reward(auth.user_id, reward_id).await?))
}

pub async fn list_redemptions(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<Redemption>>, ApiError> {
    Ok(Json(ctx.rewards.redemption_history(auth.user_id).await?))
}

pub async fn list_quests(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<QuestWithProgress>>, ApiError> {
    Ok(Json(ctx.quests.list_with_progress(auth.user_id).await?))
}

pub async fn complete_quest(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(quest_id): Path<Uuid>,
) -> Result<Json<QuestCompletionResult>, ApiError> {
    Ok(Json(ctx.quests.complete_quest(auth.user_id, quest_id).await?))
}

pub async fn list_packs(
    State(ctx): State<Arc<ServerContext>>,
    _auth: AuthUser,
) -> Result<Json<Vec<PackListing>>, ApiError> {
    Ok(Json(ctx.packs.list_packs().await?))
}

pub async fn open_pack(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(pack_id): Path<Uuid>,
) -> Result<Json<PackOpenResult>, ApiError> {
    Ok(Json(ctx.packs.open_pack(auth.user_id, pack_id).await?))
}

pub async fn pack_history(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<PackOpening>>, ApiError> {
    Ok(Json(ctx.packs.opening_history(auth.user_id).await?))
}

pub async fn get_membership(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<MembershipOverview>, ApiError> {
    Ok(Json(ctx.memberships.overview(auth.user_id).await?))
}

pub async fn upgrade_tier(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(body): Json<UpgradeTierBody>,
) -> Result<Json<TierUpgradeResult>, ApiError> {
    let tier = match body.tier.as_deref() {
        Some("silver") => Tier::Silver,
        Some("gold") => Tier::Gold,
        _ => return Err(ApiError(Error::InvalidInput("Invalid tier".to_string()))),
    };
    Ok(Json(ctx.memberships.upgrade_tier(auth.user_id, tier).await?))
}
