// File: src/services/mod.rs

pub mod admin_service;
pub mod ledger_service;
pub mod membership_service;
pub mod pack_service;
pub mod quest_service;
pub mod reward_service;

pub use admin_service::AdminService;
pub use ledger_service::LedgerService;
pub use membership_service::MembershipService;
pub use pack_service::PackService;
pub use quest_service::QuestService;
pub use reward_service::RewardService;
