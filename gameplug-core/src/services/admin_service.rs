use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use gameplug_common::models::loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TierRequirement,
};
use gameplug_common::models::membership::{LoyaltyConfigEntry, Membership};
use gameplug_common::models::pack::{DropRarity, DropType, Pack, PackDrop};
use gameplug_common::models::quest::Quest;
use gameplug_common::models::reward::{Reward, RewardType};
use gameplug_common::traits::repository_traits::{
    LoyaltyConfigRepository, MembershipRepository, PackRepository, QuestRepository,
    RewardRepository,
};

use crate::Error;
use crate::services::ledger_service::LedgerService;

/// Partial reward payload for admin create/update; absent fields keep the
/// existing value (update) or fall back to defaults (create).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub reward_type: Option<RewardType>,
    pub points_cost: Option<i64>,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<i32>,
    pub product_id: Option<Uuid>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub enabled: Option<bool>,
    pub tier_required: Option<TierRequirement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quest_type: Option<String>,
    pub reward_points: Option<i64>,
    pub icon: Option<String>,
    pub enabled: Option<bool>,
    pub sort_order: Option<i32>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub points_cost: Option<i64>,
    pub enabled: Option<bool>,
    pub tier_required: Option<TierRequirement>,
    pub drops: Option<Vec<PackDrop>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipInput {
    pub tier: Tier,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub yearly_price: Option<i64>,
    pub points_multiplier: Option<f64>,
    pub perks: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

/// Admin-only catalog management plus the idempotent default seeding.
pub struct AdminService {
    reward_repo: Arc<dyn RewardRepository + Send + Sync>,
    quest_repo: Arc<dyn QuestRepository + Send + Sync>,
    pack_repo: Arc<dyn PackRepository + Send + Sync>,
    membership_repo: Arc<dyn MembershipRepository + Send + Sync>,
    config_repo: Arc<dyn LoyaltyConfigRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
}

impl AdminService {
    pub fn new(
        reward_repo: Arc<dyn RewardRepository + Send + Sync>,
        quest_repo: Arc<dyn QuestRepository + Send + Sync>,
        pack_repo: Arc<dyn PackRepository + Send + Sync>,
        membership_repo: Arc<dyn MembershipRepository + Send + Sync>,
        config_repo: Arc<dyn LoyaltyConfigRepository + Send + Sync>,
        ledger: Arc<LedgerService>,
    ) -> Self {
        Self {
            reward_repo,
            quest_repo,
            pack_repo,
            membership_repo,
            config_repo,
            ledger,
        }
    }

    // ------------------------------------------------------------------
    // Rewards CRUD
    // ------------------------------------------------------------------

    pub async fn list_rewards(&self) -> Result<Vec<Reward>, Error> {
        self.reward_repo.list_all().await
    }

    pub async fn create_reward(&self, input: RewardInput) -> Result<Reward, Error> {
        let name = input
            .name
            .ok_or_else(|| Error::InvalidInput("name required".to_string()))?;
        let reward_type = input
            .reward_type
            .ok_or_else(|| Error::InvalidInput("reward_type required".to_string()))?;
        let points_cost = input
            .points_cost
            .ok_or_else(|| Error::InvalidInput("points_cost required".to_string()))?;

        let now = Utc::now();
        let reward = Reward {
            reward_id: Uuid::new_v4(),
            name,
            description: input.description.unwrap_or_default(),
            reward_type,
            points_cost,
            discount_percent: input.discount_percent.unwrap_or(0),
            discount_amount: input.discount_amount.unwrap_or(0),
            product_id: input.product_id,
            image: input.image.unwrap_or_default(),
            stock: input.stock.unwrap_or(-1),
            enabled: input.enabled.unwrap_or(true),
            tier_required: input.tier_required.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.reward_repo.create_reward(&reward).await?;
        Ok(reward)
    }

    pub async fn update_reward(&self, reward_id: Uuid, input: RewardInput) -> Result<Reward, Error> {
        let mut reward = self
            .reward_repo
            .get_reward(reward_id)
            .await?
            .ok_or_else(|| Error::NotFound("Reward not found".to_string()))?;

        if let Some(name) = input.name {
            reward.name = name;
        }
        if let Some(description) = input.description {
            reward.description = description;
        }
        if let Some(reward_type) = input.reward_type {
            reward.reward_type = reward_type;
        }
        if let Some(points_cost) = input.points_cost {
            reward.points_cost = points_cost;
        }
        if let Some(discount_percent) = input.discount_percent {
            reward.discount_percent = discount_percent;
        }
        if let Some(discount_amount) = input.discount_amount {
            reward.discount_amount = discount_amount;
        }
        if let Some(product_id) = input.product_id {
            reward.product_id = Some(product_id);
        }
        if let Some(image) = input.image {
            reward.image = image;
        }
        if let Some(stock) = input.stock {
            reward.stock = stock;
        }
        if let Some(enabled) = input.enabled {
            reward.enabled = enabled;
        }
        if let Some(tier_required) = input.tier_required {
            reward.tier_required = tier_required;
        }
        reward.updated_at = Utc::now();

        self.reward_repo.update_reward(&reward).await?;
        Ok(reward)
    }

    pub async fn delete_reward(&self, reward_id: Uuid) -> Result<(), Error> {
        self.reward_repo.delete_reward(reward_id).await
    }

    // ------------------------------------------------------------------
    // Quests CRUD
    // ------------------------------------------------------------------

    pub async fn list_quests(&self) -> Result<Vec<Quest>, Error> {
        self.quest_repo.list_all().await
    }

    pub async fn create_quest(&self, input: QuestInput) -> Result<Quest, Error> {
        let title = input
            .title
            .ok_or_else(|| Error::InvalidInput("title required".to_string()))?;
        let quest_type = input
            .quest_type
            .ok_or_else(|| Error::InvalidInput("quest_type required".to_string()))?;
        let reward_points = input
            .reward_points
            .ok_or_else(|| Error::InvalidInput("reward_points required".to_string()))?;

        let now = Utc::now();
        let quest = Quest {
            quest_id: Uuid::new_v4(),
            title,
            description: input.description.unwrap_or_default(),
            quest_type,
            reward_points,
            icon: input.icon.unwrap_or_default(),
            enabled: input.enabled.unwrap_or(true),
            sort_order: input.sort_order.unwrap_or(0),
            metadata: input.metadata.unwrap_or_else(|| json!({})),
            created_at: now,
            updated_at: now,
        };
        self.quest_repo.create_quest(&quest).await?;
        Ok(quest)
    }

    pub async fn update_quest(&self, quest_id: Uuid, input: QuestInput) -> Result<Quest, Error> {
        let mut quest = self
            .quest_repo
            .get_quest(quest_id)
            .await?
            .ok_or_else(|| Error::NotFound("Quest not found".to_string()))?;

        if let Some(title) = input.title {
            quest.title = title;
        }
        if let Some(description) = input.description {
            quest.description = description;
        }
        if let Some(quest_type) = input.quest_type {
            quest.quest_type = quest_type;
        }
        if let Some(reward_points) = input.reward_points {
            quest.reward_points = reward_points;
        }
        if let Some(icon) = input.icon {
            quest.icon = icon;
        }
        if let Some(enabled) = input.enabled {
            quest.enabled = enabled;
        }
        if let Some(sort_order) = input.sort_order {
            quest.sort_order = sort_order;
        }
        if let Some(metadata) = input.metadata {
            quest.metadata = metadata;
        }
        quest.updated_at = Utc::now();

        self.quest_repo.update_quest(&quest).await?;
        Ok(quest)
    }

    // ------------------------------------------------------------------
    // Packs CRUD
    // ------------------------------------------------------------------

    pub async fn list_packs(&self) -> Result<Vec<Pack>, Error> {
        self.pack_repo.list_all().await
    }

    pub async fn create_pack(&self, input: PackInput) -> Result<Pack, Error> {
        let name = input
            .name
            .ok_or_else(|| Error::InvalidInput("name required".to_string()))?;
        let points_cost = input
            .points_cost
            .ok_or_else(|| Error::InvalidInput("points_cost required".to_string()))?;

        let now = Utc::now();
        let pack = Pack {
            pack_id: Uuid::new_v4(),
            name,
            description: input.description.unwrap_or_default(),
            image: input.image.unwrap_or_default(),
            points_cost,
            enabled: input.enabled.unwrap_or(true),
            tier_required: input.tier_required.unwrap_or_default(),
            drops: input.drops.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.pack_repo.create_pack(&pack).await?;
        Ok(pack)
    }

    pub async fn update_pack(&self, pack_id: Uuid, input: PackInput) -> Result<Pack, Error> {
        let mut pack = self
            .pack_repo
            .get_pack(pack_id)
            .await?
            .ok_or_else(|| Error::NotFound("Pack not found".to_string()))?;

        if let Some(name) = input.name {
            pack.name = name;
        }
        if let Some(description) = input.description {
            pack.description = description;
        }
        if let Some(image) = input.image {
            pack.image = image;
        }
        if let Some(points_cost) = input.points_cost {
            pack.points_cost = points_cost;
        }
        if let Some(enabled) = input.enabled {
            pack.enabled = enabled;
        }
        if let Some(tier_required) = input.tier_required {
            pack.tier_required = tier_required;
        }
        if let Some(drops) = input.drops {
            pack.drops = drops;
        }
        pack.updated_at = Utc::now();

        self.pack_repo.update_pack(&pack).await?;
        Ok(pack)
    }

    // ------------------------------------------------------------------
    // Memberships, config, grants
    // ------------------------------------------------------------------

    pub async fn list_memberships(&self) -> Result<Vec<Membership>, Error> {
        self.membership_repo.list_all().await
    }

    pub async fn upsert_membership(&self, input: MembershipInput) -> Result<Membership, Error> {
        if input.tier == Tier::Free {
            return Err(Error::InvalidInput(
                "free is not a purchasable tier".to_string(),
            ));
        }

        let existing = self.membership_repo.get_by_tier(input.tier).await?;
        let now = Utc::now();
        let membership = match existing {
            Some(mut m) => {
                if let Some(name) = input.name {
                    m.name = name;
                }
                if let Some(price) = input.price {
                    m.price = price;
                }
                if let Some(yearly_price) = input.yearly_price {
                    m.yearly_price = yearly_price;
                }
                if let Some(points_multiplier) = input.points_multiplier {
                    m.points_multiplier = points_multiplier;
                }
                if let Some(perks) = input.perks {
                    m.perks = perks;
                }
                if let Some(enabled) = input.enabled {
                    m.enabled = enabled;
                }
                m.updated_at = now;
                m
            }
            None => {
                let name = input
                    .name
                    .ok_or_else(|| Error::InvalidInput("name required".to_string()))?;
                let price = input
                    .price
                    .ok_or_else(|| Error::InvalidInput("price required".to_string()))?;
                Membership {
                    tier: input.tier,
                    name,
                    price,
                    yearly_price: input.yearly_price.unwrap_or(0),
                    points_multiplier: input.points_multiplier.unwrap_or(1.0),
                    perks: input.perks.unwrap_or_default(),
                    enabled: input.enabled.unwrap_or(true),
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        self.membership_repo.upsert(&membership).await
    }

    pub async fn list_config(&self) -> Result<Vec<LoyaltyConfigEntry>, Error> {
        self.config_repo.list_all().await
    }

    pub async fn set_config(
        &self,
        key: &str,
        value: &Value,
        description: &str,
    ) -> Result<LoyaltyConfigEntry, Error> {
        if key.is_empty() {
            return Err(Error::InvalidInput("key required".to_string()));
        }
        self.config_repo.set_value(key, value, description).await
    }

    pub async fn grant_points(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: Option<&str>,
        admin_id: Uuid,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        self.ledger.grant_points(user_id, amount, reason, admin_id).await
    }

    // ------------------------------------------------------------------
    // Default catalog seeding
    // ------------------------------------------------------------------

    /// Idempotent bootstrap: config keys are upserted every call, while
    /// quests/rewards/packs/memberships are only inserted into an empty
    /// table.
    pub async fn seed_defaults(&self) -> Result<(), Error> {
        for (key, value, description) in default_config() {
            self.config_repo.set_value(key, &value, description).await?;
        }

        if self.quest_repo.count().await? == 0 {
            info!("seeding default quests");
            for quest in default_quests() {
                self.quest_repo.create_quest(&quest).await?;
            }
        }

        if self.reward_repo.count().await? == 0 {
            info!("seeding default rewards");
            for reward in default_rewards() {
                self.reward_repo.create_reward(&reward).await?;
            }
        }

        if self.pack_repo.count().await? == 0 {
            info!("seeding default packs");
            for pack in default_packs() {
                self.pack_repo.create_pack(&pack).await?;
            }
        }

        if self.membership_repo.count().await? == 0 {
            info!("seeding default memberships");
            for membership in default_memberships() {
                self.membership_repo.upsert(&membership).await?;
            }
        }

        Ok(())
    }
}

fn default_config() -> Vec<(&'static str, Value, &'static str)> {
    vec![
        ("points_per_euro", json!(10), "Points earned per €1 spent"),
        ("signup_bonus_points", json!(100), "Points awarded on registration"),
        ("daily_login_points", json!(10), "Base points for daily login"),
    ]
}

fn quest(
    title: &str,
    description: &str,
    quest_type: &str,
    reward_points: i64,
    icon: &str,
    sort_order: i32,
    metadata: Value,
) -> Quest {
    let now = Utc::now();
    Quest {
        quest_id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        quest_type: quest_type.to_string(),
        reward_points,
        icon: icon.to_string(),
        enabled: true,
        sort_order,
        metadata,
        created_at: now,
        updated_at: now,
    }
}

fn default_quests() -> Vec<Quest> {
    vec![
        quest(
            "Complete Your Profile",
            "Fill in all profile fields",
            "complete_profile",
            50,
            "👤",
            1,
            json!({}),
        ),
        quest(
            "Make Your First Purchase",
            "Buy any product from the store",
            "first_purchase",
            100,
            "🛒",
            2,
            json!({}),
        ),
        quest(
            "7-Day Login Streak",
            "Log in for 7 consecutive days",
            "streak_login",
            200,
            "🔥",
            3,
            json!({ "required_days": 7 }),
        ),
        quest(
            "Write a Review",
            "Leave a review on any product",
            "write_review",
            75,
            "⭐",
            4,
            json!({}),
        ),
        quest(
            "Share a Product",
            "Share any product link on social media",
            "share_product",
            50,
            "📤",
            5,
            json!({}),
        ),
        quest(
            "Follow Us on Twitter",
            "Follow the store on Twitter",
            "social_follow",
            30,
            "🐦",
            6,
            json!({ "url": "https://twitter.com/gameplug" }),
        ),
    ]
}

fn reward(
    name: &str,
    description: &str,
    reward_type: RewardType,
    points_cost: i64,
    discount_percent: i32,
    discount_amount: i32,
    image: &str,
    stock: i32,
) -> Reward {
    let now = Utc::now();
    Reward {
        reward_id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        reward_type,
        points_cost,
        discount_percent,
        discount_amount,
        product_id: None,
        image: image.to_string(),
        stock,
        enabled: true,
        tier_required: TierRequirement::None,
        created_at: now,
        updated_at: now,
    }
}

fn default_rewards() -> Vec<Reward> {
    vec![
        reward(
            "5% Discount Coupon",
            "5% off your next purchase",
            RewardType::Coupon,
            200,
            5,
            0,
            "🏷️",
            -1,
        ),
        reward(
            "10% Discount Coupon",
            "10% off your next purchase",
            RewardType::Coupon,
            400,
            10,
            0,
            "🎫",
            -1,
        ),
        reward(
            "€5 Gift Card",
            "€5 credit for the store",
            RewardType::GiftCard,
            500,
            0,
            5,
            "💳",
            -1,
        ),
        reward(
            "€10 Gift Card",
            "€10 credit for the store",
            RewardType::GiftCard,
            900,
            0,
            10,
            "💎",
            -1,
        ),
        reward(
            "Mystery Game Key",
            "A random game key from our collection",
            RewardType::Product,
            1500,
            0,
            0,
            "🎮",
            50,
        ),
    ]
}

fn points_drop(rarity: DropRarity, weight: i32, amount: i64, label: &str) -> PackDrop {
    PackDrop {
        drop_type: DropType::Points,
        rarity,
        weight,
        points_amount: amount,
        discount_percent: 0,
        discount_amount: 0,
        product_id: None,
        label: label.to_string(),
    }
}

fn coupon_drop(rarity: DropRarity, weight: i32, discount_percent: i32, label: &str) -> PackDrop {
    PackDrop {
        drop_type: DropType::Coupon,
        rarity,
        weight,
        points_amount: 0,
        discount_percent,
        discount_amount: 0,
        product_id: None,
        label: label.to_string(),
    }
}

fn gift_card_drop(rarity: DropRarity, weight: i32, discount_amount: i32, label: &str) -> PackDrop {
    PackDrop {
        drop_type: DropType::Coupon,
        rarity,
        weight,
        points_amount: 0,
        discount_percent: 0,
        discount_amount,
        product_id: None,
        label: label.to_string(),
    }
}

fn pack(
    name: &str,
    description: &str,
    image: &str,
    points_cost: i64,
    tier_required: TierRequirement,
    drops: Vec<PackDrop>,
) -> Pack {
    let now = Utc::now();
    Pack {
        pack_id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        image: image.to_string(),
        points_cost,
        enabled: true,
        tier_required,
        drops,
        created_at: now,
        updated_at: now,
    }
}

fn default_packs() -> Vec<Pack> {
    vec![
        pack(
            "Starter Pack",
            "A basic pack with common rewards",
            "📦",
            100,
            TierRequirement::None,
            vec![
                points_drop(DropRarity::Common, 50, 20, "20 Points"),
                points_drop(DropRarity::Common, 30, 50, "50 Points"),
                coupon_drop(DropRarity::Rare, 15, 5, "5% Coupon"),
                coupon_drop(DropRarity::Epic, 4, 15, "15% Coupon"),
                PackDrop {
                    drop_type: DropType::Nothing,
                    rarity: DropRarity::Common,
                    weight: 1,
                    points_amount: 0,
                    discount_percent: 0,
                    discount_amount: 0,
                    product_id: None,
                    label: "Empty...".to_string(),
                },
            ],
        ),
        pack(
            "Premium Pack",
            "Higher chances for rare rewards",
            "🎁",
            300,
            TierRequirement::None,
            vec![
                points_drop(DropRarity::Common, 30, 50, "50 Points"),
                points_drop(DropRarity::Rare, 25, 150, "150 Points"),
                coupon_drop(DropRarity::Rare, 20, 10, "10% Coupon"),
                coupon_drop(DropRarity::Epic, 15, 25, "25% Coupon"),
                gift_card_drop(DropRarity::Epic, 8, 5, "€5 Gift Card"),
                gift_card_drop(DropRarity::Legendary, 2, 20, "€20 Gift Card"),
            ],
        ),
        pack(
            "Legendary Pack",
            "The ultimate pack with legendary drops",
            "👑",
            750,
            TierRequirement::Silver,
            vec![
                points_drop(DropRarity::Rare, 25, 200, "200 Points"),
                points_drop(DropRarity::Epic, 20, 500, "500 Points"),
                coupon_drop(DropRarity::Epic, 20, 30, "30% Coupon"),
                gift_card_drop(DropRarity::Epic, 15, 10, "€10 Gift Card"),
                gift_card_drop(DropRarity::Legendary, 10, 50, "€50 Gift Card"),
                PackDrop {
                    drop_type: DropType::Product,
                    rarity: DropRarity::Legendary,
                    weight: 5,
                    points_amount: 0,
                    discount_percent: 0,
                    discount_amount: 0,
                    product_id: None,
                    label: "Mystery Game Key".to_string(),
                },
                points_drop(DropRarity::Legendary, 5, 2000, "JACKPOT 2000 Points!"),
            ],
        ),
    ]
}

fn default_memberships() -> Vec<Membership> {
    let now = Utc::now();
    vec![
        Membership {
            tier: Tier::Silver,
            name: "GamePlus Silver".to_string(),
            price: 500,
            yearly_price: 5000,
            points_multiplier: 1.5,
            perks: vec![
                "1.5x points on purchases".to_string(),
                "Access to Premium Packs".to_string(),
                "Monthly bonus points".to_string(),
            ],
            enabled: true,
            created_at: now,
            updated_at: now,
        },
        Membership {
            tier: Tier::Gold,
            name: "GamePlus Gold".to_string(),
            price: 1200,
            yearly_price: 12000,
            points_multiplier: 2.0,
            perks: vec![
                "2x points on purchases".to_string(),
                "Access to Legendary Packs".to_string(),
                "Exclusive rewards".to_string(),
                "Priority support".to_string(),
                "Monthly mega bonus".to_string(),
            ],
            enabled: true,
            created_at: now,
            updated_at: now,
        },
    ]
}
