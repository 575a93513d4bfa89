// File: gameplug-core/src/repositories/postgres/mod.rs

pub mod ledger;
pub mod loyalty_config;
pub mod memberships;
pub mod notifications;
pub mod packs;
pub mod quests;
pub mod rewards;

pub use ledger::PostgresLedgerRepository;
pub use loyalty_config::PostgresLoyaltyConfigRepository;
pub use memberships::PostgresMembershipRepository;
pub use notifications::PostgresNotificationSink;
pub use packs::PostgresPackRepository;
pub use quests::PostgresQuestRepository;
pub use rewards::PostgresRewardRepository;
