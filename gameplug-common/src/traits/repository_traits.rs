use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TransactionSource, TransactionType,
};
use crate::models::membership::{LoyaltyConfigEntry, Membership};
use crate::models::notification::NewNotification;
use crate::models::pack::{Pack, PackOpening};
use crate::models::quest::{Quest, UserQuest};
use crate::models::reward::{Redemption, Reward};

/// The ledger: a user's balance plus its append-only transaction log.
///
/// Every mutating call executes the balance update and the transaction
/// append as one atomic unit, so concurrent mutations of the same user's
/// balance cannot lose updates and every recorded `balance` snapshot is
/// exact at commit time.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Idempotent read-or-initialize; the entry point for everything else.
    async fn get_or_create_balance(&self, user_id: Uuid) -> Result<LoyaltyBalance, Error>;

    /// Applies a signed delta to the balance, clamping at zero (a spend
    /// past zero is floored, not rejected). Positive amounts also raise
    /// `lifetime_points`. The caller passes the final amount; any tier
    /// multiplier has already been applied.
    async fn apply(
        &self,
        user_id: Uuid,
        amount: i64,
        tx_type: TransactionType,
        source: TransactionSource,
        description: &str,
        metadata: serde_json::Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error>;

    /// Conditional spend: succeeds only when `points >= cost`, in a single
    /// conditional update. Failure of the condition IS the
    /// `InsufficientPoints` error; there is no separate pre-check to race
    /// against.
    async fn try_debit(
        &self,
        user_id: Uuid,
        cost: i64,
        source: TransactionSource,
        description: &str,
        metadata: serde_json::Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error>;

    /// Marks today's login claimed and advances or resets the streak in the
    /// same conditional update. `AlreadyClaimed` when today was already
    /// claimed. Returns the refreshed balance with the new streak.
    async fn claim_daily_login(
        &self,
        user_id: Uuid,
        today: &str,
        yesterday: &str,
    ) -> Result<LoyaltyBalance, Error>;

    async fn set_tier(
        &self,
        user_id: Uuid,
        tier: Tier,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<LoyaltyBalance, Error>;

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointsTransaction>, Error>;

    async fn count_transactions(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
pub trait RewardRepository: Send + Sync {
    async fn create_reward(&self, reward: &Reward) -> Result<(), Error>;
    async fn get_reward(&self, reward_id: Uuid) -> Result<Option<Reward>, Error>;
    async fn update_reward(&self, reward: &Reward) -> Result<(), Error>;
    async fn delete_reward(&self, reward_id: Uuid) -> Result<(), Error>;
    /// Enabled rewards sorted by points cost ascending.
    async fn list_enabled(&self) -> Result<Vec<Reward>, Error>;
    async fn list_all(&self) -> Result<Vec<Reward>, Error>;
    async fn count(&self) -> Result<i64, Error>;

    /// Conditional decrement for finite stock: returns false when no unit
    /// was available. Unlimited (-1) stock must not be passed here.
    async fn try_decrement_stock(&self, reward_id: Uuid) -> Result<bool, Error>;
    /// Compensating increment used when a later step of a redemption fails.
    async fn restore_stock(&self, reward_id: Uuid) -> Result<(), Error>;

    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error>;
    async fn list_redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error>;
}

#[async_trait]
pub trait QuestRepository: Send + Sync {
    async fn create_quest(&self, quest: &Quest) -> Result<(), Error>;
    async fn get_quest(&self, quest_id: Uuid) -> Result<Option<Quest>, Error>;
    async fn update_quest(&self, quest: &Quest) -> Result<(), Error>;
    /// Enabled quests sorted by sort order ascending.
    async fn list_enabled(&self) -> Result<Vec<Quest>, Error>;
    async fn list_all(&self) -> Result<Vec<Quest>, Error>;
    async fn count(&self) -> Result<i64, Error>;

    async fn list_user_quests(&self, user_id: Uuid) -> Result<Vec<UserQuest>, Error>;

    /// One-shot completion: flips the unique (user, quest) row to completed
    /// with progress 100. `AlreadyCompleted` when it was already done.
    async fn try_complete(&self, user_id: Uuid, quest_id: Uuid) -> Result<UserQuest, Error>;
}

#[async_trait]
pub trait PackRepository: Send + Sync {
    async fn create_pack(&self, pack: &Pack) -> Result<(), Error>;
    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<Pack>, Error>;
    async fn update_pack(&self, pack: &Pack) -> Result<(), Error>;
    async fn list_enabled(&self) -> Result<Vec<Pack>, Error>;
    async fn list_all(&self) -> Result<Vec<Pack>, Error>;
    async fn count(&self) -> Result<i64, Error>;

    async fn insert_opening(&self, opening: &PackOpening) -> Result<(), Error>;
    async fn list_openings_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PackOpening>, Error>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn get_by_tier(&self, tier: Tier) -> Result<Option<Membership>, Error>;
    async fn list_enabled(&self) -> Result<Vec<Membership>, Error>;
    async fn list_all(&self) -> Result<Vec<Membership>, Error>;
    async fn count(&self) -> Result<i64, Error>;
    async fn upsert(&self, membership: &Membership) -> Result<Membership, Error>;
}

#[async_trait]
pub trait LoyaltyConfigRepository: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, Error>;
    async fn set_value(
        &self,
        key: &str,
        value: &serde_json::Value,
        description: &str,
    ) -> Result<LoyaltyConfigEntry, Error>;
    async fn list_all(&self) -> Result<Vec<LoyaltyConfigEntry>, Error>;
}

/// Fire-and-forget notification delivery. Callers log failures and move on;
/// delivery never gates a ledger result.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &NewNotification) -> Result<(), Error>;
}
