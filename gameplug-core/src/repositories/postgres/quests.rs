// File: gameplug-core/src/repositories/postgres/quests.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::quest::{Quest, UserQuest};
use gameplug_common::traits::repository_traits::QuestRepository;

pub struct PostgresQuestRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresQuestRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_quest(r: &PgRow) -> Result<Quest, Error> {
    Ok(Quest {
        quest_id: r.try_get("quest_id")?,
        title: r.try_get("title")?,
        description: r.try_get("description")?,
        quest_type: r.try_get("quest_type")?,
        reward_points: r.try_get("reward_points")?,
        icon: r.try_get("icon")?,
        enabled: r.try_get("enabled")?,
        sort_order: r.try_get("sort_order")?,
        metadata: r.try_get("metadata")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn row_to_user_quest(r: &PgRow) -> Result<UserQuest, Error> {
    Ok(UserQuest {
        user_quest_id: r.try_get("user_quest_id")?,
        user_id: r.try_get("user_id")?,
        quest_id: r.try_get("quest_id")?,
        completed: r.try_get("completed")?,
        completed_at: r.try_get("completed_at")?,
        progress: r.try_get("progress")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

const QUEST_COLS: &str = "quest_id, title, description, quest_type, reward_points, icon, \
     enabled, sort_order, metadata, created_at, updated_at";

#[async_trait]
impl QuestRepository for PostgresQuestRepository {
    async fn create_quest(&self, quest: &Quest) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO quests (
                quest_id,
                title,
                description,
                quest_type,
                reward_points,
                icon,
                enabled,
                sort_order,
                metadata,
                created_at,
                updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
            .bind(quest.quest_id)
            .bind(&quest.title)
            .bind(&quest.description)
            .bind(&quest.quest_type)
            .bind(quest.reward_points)
            .bind(&quest.icon)
            .bind(quest.enabled)
            .bind(quest.sort_order)
            .bind(&quest.metadata)
            .bind(quest.created_at)
            .bind(quest.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_quest(&self, quest_id: Uuid) -> Result<Option<Quest>, Error> {
        let row_opt = sqlx::query(&format!(
            "SELECT {QUEST_COLS} FROM quests WHERE quest_id = $1"
        ))
            .bind(quest_id)
            .fetch_optional(&self.pool)
            .await?;

        row_opt.map(|r| row_to_quest(&r)).transpose()
    }

    async fn update_quest(&self, quest: &Quest) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE quests
            SET
              title = $1,
              description = $2,
              quest_type = $3,
              reward_points = $4,
              icon = $5,
              enabled = $6,
              sort_order = $7,
              metadata = $8,
              updated_at = now()
            WHERE quest_id = $9
            "#,
        )
            .bind(&quest.title)
            .bind(&quest.description)
            .bind(&quest.quest_type)
            .bind(quest.reward_points)
            .bind(&quest.icon)
            .bind(quest.enabled)
            .bind(quest.sort_order)
            .bind(&quest.metadata)
            .bind(quest.quest_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Quest>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {QUEST_COLS} FROM quests WHERE enabled = TRUE ORDER BY sort_order ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_quest(&r)?);
        }
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Quest>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {QUEST_COLS} FROM quests ORDER BY sort_order ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_quest(&r)?);
        }
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM quests")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn list_user_quests(&self, user_id: Uuid) -> Result<Vec<UserQuest>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_quest_id, user_id, quest_id, completed, completed_at,
                   progress, created_at, updated_at
            FROM user_quests
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_user_quest(&r)?);
        }
        Ok(list)
    }

    async fn try_complete(&self, user_id: Uuid, quest_id: Uuid) -> Result<UserQuest, Error> {
        // Upsert against the unique (user_id, quest_id) row; the WHERE
        // clause refuses to touch an already-completed row, which surfaces
        // as "no row returned".
        let row_opt = sqlx::query(
            r#"
            INSERT INTO user_quests
                (user_quest_id, user_id, quest_id, completed, completed_at, progress)
            VALUES ($1, $2, $3, TRUE, $4, 100)
            ON CONFLICT (user_id, quest_id) DO UPDATE
            SET completed = TRUE,
                completed_at = EXCLUDED.completed_at,
                progress = 100,
                updated_at = now()
            WHERE user_quests.completed = FALSE
            RETURNING user_quest_id, user_id, quest_id, completed, completed_at,
                      progress, created_at, updated_at
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(quest_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        let row = row_opt
            .ok_or_else(|| Error::AlreadyCompleted("quest already completed".to_string()))?;
        row_to_user_quest(&row)
    }
}
