// File: gameplug-server/src/handlers/admin.rs

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use gameplug_common::Error;
use gameplug_common::models::membership::{LoyaltyConfigEntry, Membership};
use gameplug_common::models::pack::Pack;
use gameplug_common::models::quest::Quest;
use gameplug_common::models::reward::Reward;
use gameplug_core::services::admin_service::{
    MembershipInput, PackInput, QuestInput, RewardInput,
};

use crate::auth::AuthUser;
use crate::context::ServerContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GrantPointsBody {
    pub user_id: Option<Uuid>,
    pub amount: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetConfigBody {
    pub key: String,
    pub value: Value,
    pub description: Option<String>,
}

pub async fn seed_defaults(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    auth.require_admin()?;
    ctx.admin.seed_defaults().await?;
    Ok(Json(json!({ "message": "Defaults seeded successfully" })))
}

pub async fn grant_points(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(body): Json<GrantPointsBody>,
) -> Result<Json<Value>, ApiError> {
    auth.require_admin()?;
    let (user_id, amount) = match (body.user_id, body.amount) {
        (Some(user_id), Some(amount)) => (user_id, amount),
        _ => {
            return Err(ApiError(Error::InvalidInput(
                "user_id and amount required".to_string(),
            )));
        }
    };

    let (balance, transaction) = ctx
        .admin
        .grant_points(user_id, amount, body.reason.as_deref(), auth.user_id)
        .await?;
    Ok(Json(json!({
        "new_balance": balance.points,
        "transaction": transaction,
    })))
}

pub async fn list_config(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<LoyaltyConfigEntry>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.list_config().await?))
}

pub async fn set_config(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(body): Json<SetConfigBody>,
) -> Result<Json<LoyaltyConfigEntry>, ApiError> {
    auth.require_admin()?;
    let entry = ctx
        .admin
        .set_config(&body.key, &body.value, body.description.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(entry))
}

// ── Rewards CRUD ──

pub async fn list_rewards(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<Reward>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.list_rewards().await?))
}

pub async fn create_reward(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(input): Json<RewardInput>,
) -> Result<Json<Reward>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.create_reward(input).await?))
}

pub async fn update_reward(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(reward_id): Path<Uuid>,
    Json(input): Json<RewardInput>,
) -> Result<Json<Reward>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.update_reward(reward_id, input).await?))
}

pub async fn delete_reward(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(reward_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    auth.require_admin()?;
    ctx.admin.delete_reward(reward_id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

// ── Quests CRUD ──

pub async fn list_quests(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<Quest>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.list_quests().await?))
}

pub async fn create_quest(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(input): Json<QuestInput>,
) -> Result<Json<Quest>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.create_quest(input).await?))
}

pub async fn update_quest(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(quest_id): Path<Uuid>,
    Json(input): Json<QuestInput>,
) -> Result<Json<Quest>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.update_quest(quest_id, input).await?))
}

// ── Packs CRUD ──

pub async fn list_packs(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<Pack>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.list_packs().await?))
}

pub async fn create_pack(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(input): Json<PackInput>,
) -> Result<Json<Pack>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.create_pack(input).await?))
}

pub async fn update_pack(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Path(pack_id): Path<Uuid>,
    Json(input): Json<PackInput>,
) -> Result<Json<Pack>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.update_pack(pack_id, input).await?))
}

// ── Memberships ──

pub async fn list_memberships(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
) -> Result<Json<Vec<Membership>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.list_memberships().await?))
}

pub async fn upsert_membership(
    State(ctx): State<Arc<ServerContext>>,
    auth: AuthUser,
    Json(input): Json<MembershipInput>,
) -> Result<Json<Membership>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ctx.admin.upsert_membership(input).await?))
}
