// File: gameplug-common/src/models/mod.rs
pub mod loyalty;
pub mod membership;
pub mod notification;
pub mod pack;
pub mod quest;
pub mod reward;

pub use loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TierRequirement, TransactionPage, TransactionSource,
    TransactionType,
};
pub use membership::{LoyaltyConfigEntry, Membership};
pub use notification::NewNotification;
pub use pack::{DropRarity, DropResult, DropType, Pack, PackDrop, PackListing, PackOpening};
pub use quest::{Quest, QuestProgress, QuestWithProgress, UserQuest};
pub use reward::{Redemption, RedemptionStatus, Reward, RewardType};
