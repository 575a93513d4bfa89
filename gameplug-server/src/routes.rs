// File: gameplug-server/src/routes.rs

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::ServerContext;
use crate::handlers::{admin, loyalty};

pub fn router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        // Points & balance
        .route("/api/loyalty/balance", get(loyalty::get_balance))
        .route("/api/loyalty/history", get(loyalty::get_history))
        .route("/api/loyalty/daily-login", post(loyalty::daily_login))
        .route("/api/loyalty/earn-purchase", post(loyalty::earn_purchase))
        .route("/api/loyalty/signup-bonus", post(loyalty::signup_bonus))
        // Rewards
        .route("/api/loyalty/rewards", get(loyalty::list_rewards))
        .route("/api/loyalty/rewards/{id}/redeem", post(loyalty::redeem_reward))
        .route("/api/loyalty/redemptions", get(loyalty::list_redemptions))
        // Quests
        .route("/api/loyalty/quests", get(loyalty::list_quests))
        .route("/api/loyalty/quests/{id}/complete", post(loyalty::complete_quest))
        // Packs
        .route("/api/loyalty/packs", get(loyalty::list_packs))
        .route("/api/loyalty/packs/history", get(loyalty::pack_history))
        .route("/api/loyalty/packs/{id}/open", post(loyalty::open_pack))
        // Membership
        .route("/api/loyalty/membership", get(loyalty::get_membership))
        .route("/api/loyalty/membership/upgrade", post(loyalty::upgrade_tier))
        // Admin
        .route("/api/loyalty/admin/seed", post(admin::seed_defaults))
        .route("/api/loyalty/admin/grant-points", post(admin::grant_points))
        .route(
            "/api/loyalty/admin/config",
            get(admin::list_config).post(admin::set_config),
        )
        .route(
            "/api/loyalty/admin/rewards",
            get(admin::list_rewards).post(admin::create_reward),
        )
        .route(
            "/api/loyalty/admin/rewards/{id}",
            put(admin::update_reward).delete(admin::delete_reward),
        )
        .route(
            "/api/loyalty/admin/quests",
            get(admin::list_quests).post(admin::create_quest),
        )
        .route("/api/loyalty/admin/quests/{id}", put(admin::update_quest))
        .route(
            "/api/loyalty/admin/packs",
            get(admin::list_packs).post(admin::create_pack),
        )
        .route("/api/loyalty/admin/packs/{id}", put(admin::update_pack))
        .route(
            "/api/loyalty/admin/memberships",
            get(admin::list_memberships).post(admin::upsert_membership),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ctx)
}
