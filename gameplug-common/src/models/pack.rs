// File: gameplug-common/src/models/pack.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::loyalty::TierRequirement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropType {
    Points,
    Coupon,
    Product,
    Nothing,
}

/// Cosmetic only; selection probability comes from `weight` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DropRarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

/// One entry in a pack's drop table. Probability mass is
/// `weight / total_weight` over the whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackDrop {
    pub drop_type: DropType,
    #[serde(default)]
    pub rarity: DropRarity,
    pub weight: i32,
    #[serde(default)]
    pub points_amount: i64,
    #[serde(default)]
    pub discount_percent: i32,
    #[serde(default)]
    pub discount_amount: i32,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub label: String,
}

/// Admin-curated loot pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub pack_id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub points_cost: i64,
    pub enabled: bool,
    pub tier_required: TierRequirement,
    pub drops: Vec<PackDrop>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pack {
    /// Sum of all drop weights; the draw range is `[0, total_weight)`.
    pub fn total_weight(&self) -> i64 {
        self.drops.iter().map(|d| i64::from(d.weight.max(0))).sum()
    }
}

/// Drop as exposed to users in pack listings: weights stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct DropPreview {
    pub drop_type: DropType,
    pub rarity: DropRarity,
    pub label: String,
}

/// User-facing pack listing with the drop weights stripped.
#[derive(Debug, Clone, Serialize)]
pub struct PackListing {
    pub pack_id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub points_cost: i64,
    pub tier_required: TierRequirement,
    pub drops: Vec<DropPreview>,
}

impl From<Pack> for PackListing {
    fn from(pack: Pack) -> Self {
        let drops = pack
            .drops
            .into_iter()
            .map(|d| DropPreview {
                drop_type: d.drop_type,
                rarity: d.rarity,
                label: d.label,
            })
            .collect();
        Self {
            pack_id: pack.pack_id,
            name: pack.name,
            description: pack.description,
            image: pack.image,
            points_cost: pack.points_cost,
            tier_required: pack.tier_required,
            drops,
        }
    }
}

/// What a pack opening actually granted, frozen at open time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropResult {
    pub drop_type: DropType,
    pub rarity: DropRarity,
    pub label: String,
    pub value: serde_json::Value,
}

/// One row per pack-open call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackOpening {
    pub opening_id: Uuid,
    pub user_id: Uuid,
    pub pack_id: Uuid,
    pub points_spent: i64,
    pub result: DropResult,
    pub created_at: DateTime<Utc>,
}
