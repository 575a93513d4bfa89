// File: gameplug-core/src/repositories/postgres/loyalty_config.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use gameplug_common::error::Error;
use gameplug_common::models::membership::LoyaltyConfigEntry;
use gameplug_common::traits::repository_traits::LoyaltyConfigRepository;

pub struct PostgresLoyaltyConfigRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresLoyaltyConfigRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_entry(r: &PgRow) -> Result<LoyaltyConfigEntry, Error> {
    Ok(LoyaltyConfigEntry {
        config_key: r.try_get("config_key")?,
        config_value: r.try_get("config_value")?,
        description: r.try_get("description")?,
        updated_at: r.try_get("updated_at")?,
    })
}

#[async_trait]
impl LoyaltyConfigRepository for PostgresLoyaltyConfigRepository {
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, Error> {
        let row_opt = sqlx::query("SELECT config_value FROM loyalty_config WHERE config_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(r.try_get("config_value")?)),
            None => Ok(None),
        }
    }

    async fn set_value(
        &self,
        key: &str,
        value: &serde_json::Value,
        description: &str,
    ) -> Result<LoyaltyConfigEntry, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO loyalty_config (config_key, config_value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (config_key) DO UPDATE
            SET config_value = EXCLUDED.config_value,
                description = EXCLUDED.description,
                updated_at = now()
            RETURNING config_key, config_value, description, updated_at
            "#,
        )
            .bind(key)
            .bind(value)
            .bind(description)
            .fetch_one(&self.pool)
            .await?;

        row_to_entry(&row)
    }

    async fn list_all(&self) -> Result<Vec<LoyaltyConfigEntry>, Error> {
        let rows = sqlx::query(
            "SELECT config_key, config_value, description, updated_at \
             FROM loyalty_config ORDER BY config_key ASC",
        )
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_entry(&r)?);
        }
        Ok(list)
    }
}
