// File: gameplug-server/src/context.rs

use std::sync::Arc;

use gameplug_core::Database;
use gameplug_core::repositories::postgres::{
    PostgresLedgerRepository, PostgresLoyaltyConfigRepository, PostgresMembershipRepository,
    PostgresNotificationSink, PostgresPackRepository, PostgresQuestRepository,
    PostgresRewardRepository,
};
use gameplug_core::services::{
    AdminService, LedgerService, MembershipService, PackService, QuestService, RewardService,
};

/// All services wired against the shared connection pool; one instance per
/// process, handed to the router as axum state.
pub struct ServerContext {
    pub ledger: Arc<LedgerService>,
    pub rewards: Arc<RewardService>,
    pub quests: Arc<QuestService>,
    pub packs: Arc<PackService>,
    pub memberships: Arc<MembershipService>,
    pub admin: Arc<AdminService>,
}

impl ServerContext {
    pub fn new(db: &Database) -> Self {
        let pool = db.pool().clone();

        let ledger_repo = Arc::new(PostgresLedgerRepository::new(pool.clone()));
        let reward_repo = Arc::new(PostgresRewardRepository::new(pool.clone()));
        let quest_repo = Arc::new(PostgresQuestRepository::new(pool.clone()));
        let pack_repo = Arc::new(PostgresPackRepository::new(pool.clone()));
        let membership_repo = Arc::new(PostgresMembershipRepository::new(pool.clone()));
        let config_repo = Arc::new(PostgresLoyaltyConfigRepository::new(pool.clone()));
        let notifier = Arc::new(PostgresNotificationSink::new(pool));

        let ledger = Arc::new(LedgerService::new(
            ledger_repo,
            config_repo.clone(),
            notifier,
        ));
        let rewards = Arc::new(RewardService::new(reward_repo.clone(), ledger.clone()));
        let quests = Arc::new(QuestService::new(quest_repo.clone(), ledger.clone()));
        let packs = Arc::new(PackService::new(pack_repo.clone(), ledger.clone()));
        let memberships = Arc::new(MembershipService::new(
            membership_repo.clone(),
            ledger.clone(),
        ));
        let admin = Arc::new(AdminService::new(
            reward_repo,
            quest_repo,
            pack_repo,
            membership_repo,
            config_repo,
            ledger.clone(),
        ));

        Self {
            ledger,
            rewards,
            quests,
            packs,
            memberships,
            admin,
        }
    }
}
