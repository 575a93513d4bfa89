// File: gameplug-core/src/repositories/mod.rs

pub mod postgres;

pub use postgres::{
    PostgresLedgerRepository, PostgresLoyaltyConfigRepository, PostgresMembershipRepository,
    PostgresNotificationSink, PostgresPackRepository, PostgresQuestRepository,
    PostgresRewardRepository,
};
