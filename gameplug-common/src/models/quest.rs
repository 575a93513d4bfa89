// File: gameplug-common/src/models/quest.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin-curated side quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub quest_id: Uuid,
    pub title: String,
    pub description: String,
    pub quest_type: String,
    pub reward_points: i64,
    pub icon: String,
    pub enabled: bool,
    pub sort_order: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user progress row, unique per (user, quest). `completed` only ever
/// flips false -> true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuest {
    pub user_quest_id: Uuid,
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestProgress {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: i32,
}

impl Default for QuestProgress {
    fn default() -> Self {
        Self {
            completed: false,
            completed_at: None,
            progress: 0,
        }
    }
}

/// Quest merged with the calling user's progress, for listing.
#[derive(Debug, Clone, Serialize)]
pub struct QuestWithProgress {
    #[serde(flatten)]
    pub quest: Quest,
    pub user_progress: QuestProgress,
}
