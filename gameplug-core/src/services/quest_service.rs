use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::{TransactionSource, TransactionType};
use gameplug_common::models::quest::{QuestProgress, QuestWithProgress};
use gameplug_common::traits::repository_traits::QuestRepository;

use crate::Error;
use crate::services::ledger_service::LedgerService;

#[derive(Debug, Clone, Serialize)]
pub struct QuestCompletionResult {
    pub earned: i64,
    pub new_balance: i64,
    pub message: String,
}

pub struct QuestService {
    quest_repo: Arc<dyn QuestRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
}

impl QuestService {
    pub fn new(quest_repo: Arc<dyn QuestRepository + Send + Sync>, ledger: Arc<LedgerService>) -> Self {
        Self { quest_repo, ledger }
    }

    /// Enabled quests merged with the caller's progress rows; quests the
    /// user never touched report not-completed / 0%.
    pub async fn list_with_progress(&self, user_id: Uuid) -> Result<Vec<QuestWithProgress>, Error> {
        let quests = self.quest_repo.list_enabled().await?;
        let user_quests = self.quest_repo.list_user_quests(user_id).await?;

        let mut progress_map: HashMap<Uuid, QuestProgress> = HashMap::new();
        for uq in user_quests {
            progress_map.insert(
                uq.quest_id,
                QuestProgress {
                    completed: uq.completed,
                    completed_at: uq.completed_at,
                    progress: uq.progress,
                },
            );
        }

        Ok(quests
            .into_iter()
            .map(|quest| {
                let user_progress = progress_map
                    .remove(&quest.quest_id)
                    .unwrap_or_default();
                QuestWithProgress {
                    quest,
                    user_progress,
                }
            })
            .collect())
    }

    /// One-shot completion per (user, quest); the unique progress row
    /// enforces it, and a repeat attempt fails with `AlreadyCompleted`.
    pub async fn complete_quest(
        &self,
        user_id: Uuid,
        quest_id: Uuid,
    ) -> Result<QuestCompletionResult, Error> {
        let quest = self
            .quest_repo
            .get_quest(quest_id)
            .await?
            .filter(|q| q.enabled)
            .ok_or_else(|| Error::NotFound("Quest not found".to_string()))?;

        self.quest_repo.try_complete(user_id, quest_id).await?;

        let (balance, tx) = self
            .ledger
            .add_points(
                user_id,
                quest.reward_points,
                TransactionType::Earn,
                TransactionSource::Quest,
                &format!("Quest completed: {}", quest.title),
                json!({ "quest_id": quest.quest_id }),
            )
            .await?;

        Ok(QuestCompletionResult {
            earned: tx.amount,
            new_balance: balance.points,
            message: format!("Quest completed! +{} points", tx.amount),
        })
    }
}
