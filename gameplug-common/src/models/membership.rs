// File: gameplug-common/src/models/membership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::loyalty::Tier;

/// Paid tier descriptor. `price` doubles as the points cost of an upgrade
/// in the current design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub tier: Tier,
    pub name: String,
    pub price: i64,
    pub yearly_price: i64,
    pub points_multiplier: f64,
    pub perks: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat key -> value store for tunable loyalty constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyConfigEntry {
    pub config_key: String,
    pub config_value: serde_json::Value,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}
