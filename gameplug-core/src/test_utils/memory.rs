// File: gameplug-core/src/test_utils/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TransactionSource, TransactionType,
};
use gameplug_common::models::membership::{LoyaltyConfigEntry, Membership};
use gameplug_common::models::notification::NewNotification;
use gameplug_common::models::pack::{Pack, PackOpening};
use gameplug_common::models::quest::{Quest, UserQuest};
use gameplug_common::models::reward::{Redemption, Reward};
use gameplug_common::traits::repository_traits::{
    LedgerRepository, LoyaltyConfigRepository, MembershipRepository, NotificationSink,
    PackRepository, QuestRepository, RewardRepository,
};

fn fresh_balance(user_id: Uuid) -> LoyaltyBalance {
    let now = Utc::now();
    LoyaltyBalance {
        user_id,
        points: 0,
        lifetime_points: 0,
        tier: Tier::Free,
        tier_expires_at: None,
        daily_login_date: None,
        streak_days: 0,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Uuid, LoyaltyBalance>,
    transactions: Vec<PointsTransaction>,
}

/// Ledger with the same observable behavior as the Postgres version:
/// atomic per-call mutation, zero floor, one-shot signup/purchase guards.
#[derive(Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct tier setup for tests that need a silver/gold user.
    pub async fn seed_tier(&self, user_id: Uuid, tier: Tier) {
        let mut state = self.state.lock().await;
        let balance = state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id));
        balance.tier = tier;
    }

    pub async fn transactions_for(&self, user_id: Uuid) -> Vec<PointsTransaction> {
        let state = self.state.lock().await;
        state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

fn record_transaction(
    state: &mut LedgerState,
    user_id: Uuid,
    tx_type: TransactionType,
    amount: i64,
    balance: i64,
    source: TransactionSource,
    description: &str,
    metadata: serde_json::Value,
) -> PointsTransaction {
    let tx = PointsTransaction {
        transaction_id: Uuid::new_v4(),
        user_id,
        tx_type,
        amount,
        balance,
        source,
        description: description.to_string(),
        metadata,
        expires_at: None,
        created_at: Utc::now(),
    };
    state.transactions.push(tx.clone());
    tx
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn get_or_create_balance(&self, user_id: Uuid) -> Result<LoyaltyBalance, Error> {
        let mut state = self.state.lock().await;
        Ok(state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id))
            .clone())
    }

    async fn apply(
        &self,
        user_id: Uuid,
        amount: i64,
        tx_type: TransactionType,
        source: TransactionSource,
        description: &str,
        metadata: serde_json::Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        let mut state = self.state.lock().await;

        // Mirror of the partial unique indexes on points_transactions.
        match source {
            TransactionSource::Signup => {
                let dup = state
                    .transactions
                    .iter()
                    .any(|t| t.user_id == user_id && t.source == TransactionSource::Signup);
                if dup {
                    return Err(Error::AlreadyClaimed(
                        "signup bonus already claimed".to_string(),
                    ));
                }
            }
            TransactionSource::Purchase => {
                if let Some(order_id) = metadata.get("order_id") {
                    let dup = state.transactions.iter().any(|t| {
                        t.user_id == user_id
                            && t.source == TransactionSource::Purchase
                            && t.metadata.get("order_id") == Some(order_id)
                    });
                    if dup {
                        return Err(Error::AlreadyClaimed(
                            "points already awarded for this order".to_string(),
                        ));
                    }
                }
            }
            _ => {}
        }

        let balance = state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id));
        balance.points = (balance.points + amount).max(0);
        if amount > 0 {
            balance.lifetime_points += amount;
        }
        balance.updated_at = Utc::now();
        let snapshot = balance.clone();

        let tx = record_transaction(
            &mut state,
            user_id,
            tx_type,
            amount,
            snapshot.points,
            source,
            description,
            metadata,
        );
        Ok((snapshot, tx))
    }

    async fn try_debit(
        &self,
        user_id: Uuid,
        cost: i64,
        source: TransactionSource,
        description: &str,
        metadata: serde_json::Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        if cost < 0 {
            return Err(Error::InvalidInput(format!(
                "debit cost must be non-negative, got {cost}"
            )));
        }

        let mut state = self.state.lock().await;
        let balance = state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id));
        if balance.points < cost {
            return Err(Error::InsufficientPoints {
                required: cost,
                current: balance.points,
            });
        }
        balance.points -= cost;
        balance.updated_at = Utc::now();
        let snapshot = balance.clone();

        let tx = record_transaction(
            &mut state,
            user_id,
            TransactionType::Spend,
            -cost,
            snapshot.points,
            source,
            description,
            metadata,
        );
        Ok((snapshot, tx))
    }

    async fn claim_daily_login(
        &self,
        user_id: Uuid,
        today: &str,
        yesterday: &str,
    ) -> Result<LoyaltyBalance, Error> {
        let mut state = self.state.lock().await;
        let balance = state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id));

        if balance.daily_login_date.as_deref() == Some(today) {
            return Err(Error::AlreadyClaimed(
                "daily login reward already claimed today".to_string(),
            ));
        }

        balance.streak_days = if balance.daily_login_date.as_deref() == Some(yesterday) {
            balance.streak_days + 1
        } else {
            1
        };
        balance.daily_login_date = Some(today.to_string());
        balance.updated_at = Utc::now();
        Ok(balance.clone())
    }

    async fn set_tier(
        &self,
        user_id: Uuid,
        tier: Tier,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<LoyaltyBalance, Error> {
        let mut state = self.state.lock().await;
        let balance = state
            .balances
            .entry(user_id)
            .or_insert_with(|| fresh_balance(user_id));
        balance.tier = tier;
        balance.tier_expires_at = expires_at;
        balance.updated_at = Utc::now();
        Ok(balance.clone())
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointsTransaction>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_transactions(&self, user_id: Uuid) -> Result<i64, Error> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryRewardRepository {
    rewards: Mutex<HashMap<Uuid, Reward>>,
    redemptions: Mutex<Vec<Redemption>>,
}

impl InMemoryRewardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardRepository for InMemoryRewardRepository {
    async fn create_reward(&self, reward: &Reward) -> Result<(), Error> {
        self.rewards
            .lock()
            .await
            .insert(reward.reward_id, reward.clone());
        Ok(())
    }

    async fn get_reward(&self, reward_id: Uuid) -> Result<Option<Reward>, Error> {
        Ok(self.rewards.lock().await.get(&reward_id).cloned())
    }

    async fn update_reward(&self, reward: &Reward) -> Result<(), Error> {
        self.rewards
            .lock()
            .await
            .insert(reward.reward_id, reward.clone());
        Ok(())
    }

    async fn delete_reward(&self, reward_id: Uuid) -> Result<(), Error> {
        self.rewards.lock().await.remove(&reward_id);
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Reward>, Error> {
        let mut list: Vec<Reward> = self
            .rewards
            .lock()
            .await
            .values()
            .filter(|r| r.enabled)
            .cloned()
            .collect();
        list.sort_by_key(|r| r.points_cost);
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Reward>, Error> {
        Ok(self.rewards.lock().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.rewards.lock().await.len() as i64)
    }

    async fn try_decrement_stock(&self, reward_id: Uuid) -> Result<bool, Error> {
        let mut rewards = self.rewards.lock().await;
        match rewards.get_mut(&reward_id) {
            Some(r) if r.stock > 0 => {
                r.stock -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore_stock(&self, reward_id: Uuid) -> Result<(), Error> {
        let mut rewards = self.rewards.lock().await;
        if let Some(r) = rewards.get_mut(&reward_id) {
            if r.stock >= 0 {
                r.stock += 1;
            }
        }
        Ok(())
    }

    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error> {
        self.redemptions.lock().await.push(redemption.clone());
        Ok(())
    }

    async fn list_redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        Ok(self
            .redemptions
            .lock()
            .await
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryQuestRepository {
    quests: Mutex<HashMap<Uuid, Quest>>,
    user_quests: Mutex<HashMap<(Uuid, Uuid), UserQuest>>,
}

impl InMemoryQuestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestRepository for InMemoryQuestRepository {
    async fn create_quest(&self, quest: &Quest) -> Result<(), Error> {
        self.quests.lock().await.insert(quest.quest_id, quest.clone());
        Ok(())
    }

    async fn get_quest(&self, quest_id: Uuid) -> Result<Option<Quest>, Error> {
        Ok(self.quests.lock().await.get(&quest_id).cloned())
    }

    async fn update_quest(&self, quest: &Quest) -> Result<(), Error> {
        self.quests.lock().await.insert(quest.quest_id, quest.clone());
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Quest>, Error> {
        let mut list: Vec<Quest> = self
            .quests
            .lock()
            .await
            .values()
            .filter(|q| q.enabled)
            .cloned()
            .collect();
        list.sort_by_key(|q| q.sort_order);
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Quest>, Error> {
        let mut list: Vec<Quest> = self.quests.lock().await.values().cloned().collect();
        list.sort_by_key(|q| q.sort_order);
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.quests.lock().await.len() as i64)
    }

    async fn list_user_quests(&self, user_id: Uuid) -> Result<Vec<UserQuest>, Error> {
        Ok(self
            .user_quests
            .lock()
            .await
            .values()
            .filter(|uq| uq.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn try_complete(&self, user_id: Uuid, quest_id: Uuid) -> Result<UserQuest, Error> {
        let mut user_quests = self.user_quests.lock().await;
        let key = (user_id, quest_id);
        if let Some(existing) = user_quests.get(&key) {
            if existing.completed {
                return Err(Error::AlreadyCompleted("quest already completed".to_string()));
            }
        }

        let now = Utc::now();
        let entry = user_quests.entry(key).or_insert_with(|| UserQuest {
            user_quest_id: Uuid::new_v4(),
            user_id,
            quest_id,
            completed: false,
            completed_at: None,
            progress: 0,
            created_at: now,
            updated_at: now,
        });
        entry.completed = true;
        entry.completed_at = Some(now);
        entry.progress = 100;
        entry.updated_at = now;
        Ok(entry.clone())
    }
}

#[derive(Default)]
pub struct InMemoryPackRepository {
    packs: Mutex<HashMap<Uuid, Pack>>,
    openings: Mutex<Vec<PackOpening>>,
}

impl InMemoryPackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PackRepository for InMemoryPackRepository {
    async fn create_pack(&self, pack: &Pack) -> Result<(), Error> {
        self.packs.lock().await.insert(pack.pack_id, pack.clone());
        Ok(())
    }

    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<Pack>, Error> {
        Ok(self.packs.lock().await.get(&pack_id).cloned())
    }

    async fn update_pack(&self, pack: &Pack) -> Result<(), Error> {
        self.packs.lock().await.insert(pack.pack_id, pack.clone());
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Pack>, Error> {
        let mut list: Vec<Pack> = self
            .packs
            .lock()
            .await
            .values()
            .filter(|p| p.enabled)
            .cloned()
            .collect();
        list.sort_by_key(|p| p.points_cost);
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Pack>, Error> {
        Ok(self.packs.lock().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.packs.lock().await.len() as i64)
    }

    async fn insert_opening(&self, opening: &PackOpening) -> Result<(), Error> {
        self.openings.lock().await.push(opening.clone());
        Ok(())
    }

    async fn list_openings_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PackOpening>, Error> {
        Ok(self
            .openings
            .lock()
            .await
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryMembershipRepository {
    memberships: Mutex<Vec<Membership>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn get_by_tier(&self, tier: Tier) -> Result<Option<Membership>, Error> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .find(|m| m.tier == tier)
            .cloned())
    }

    async fn list_enabled(&self) -> Result<Vec<Membership>, Error> {
        let mut list: Vec<Membership> = self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|m| m.enabled)
            .cloned()
            .collect();
        list.sort_by_key(|m| m.price);
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Membership>, Error> {
        Ok(self.memberships.lock().await.clone())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.memberships.lock().await.len() as i64)
    }

    async fn upsert(&self, membership: &Membership) -> Result<Membership, Error> {
        let mut memberships = self.memberships.lock().await;
        match memberships.iter_mut().find(|m| m.tier == membership.tier) {
            Some(existing) => *existing = membership.clone(),
            None => memberships.push(membership.clone()),
        }
        Ok(membership.clone())
    }
}

#[derive(Default)]
pub struct InMemoryLoyaltyConfigRepository {
    entries: Mutex<HashMap<String, LoyaltyConfigEntry>>,
}

impl InMemoryLoyaltyConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoyaltyConfigRepository for InMemoryLoyaltyConfigRepository {
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, Error> {
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .map(|e| e.config_value.clone()))
    }

    async fn set_value(
        &self,
        key: &str,
        value: &serde_json::Value,
        description: &str,
    ) -> Result<LoyaltyConfigEntry, Error> {
        let entry = LoyaltyConfigEntry {
            config_key: key.to_string(),
            config_value: value.clone(),
            description: description.to_string(),
            updated_at: Utc::now(),
        };
        self.entries
            .lock()
            .await
            .insert(key.to_string(), entry.clone());
        Ok(entry)
    }

    async fn list_all(&self) -> Result<Vec<LoyaltyConfigEntry>, Error> {
        let mut list: Vec<LoyaltyConfigEntry> =
            self.entries.lock().await.values().cloned().collect();
        list.sort_by(|a, b| a.config_key.cmp(&b.config_key));
        Ok(list)
    }
}

/// Sink that drops everything; for tests that don't care about delivery.
#[derive(Default)]
pub struct NullNotificationSink;

#[async_trait]
impl NotificationSink for NullNotificationSink {
    async fn deliver(&self, _notification: &NewNotification) -> Result<(), Error> {
        Ok(())
    }
}

/// Sink that records deliveries for assertions.
#[derive(Default)]
pub struct RecordingNotificationSink {
    pub delivered: Mutex<Vec<NewNotification>>,
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, notification: &NewNotification) -> Result<(), Error> {
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}
