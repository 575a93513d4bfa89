// File: gameplug-core/src/repositories/postgres/rewards.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::loyalty::TierRequirement;
use gameplug_common::models::reward::{Redemption, RedemptionStatus, Reward, RewardType};
use gameplug_common::traits::repository_traits::RewardRepository;

pub struct PostgresRewardRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresRewardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_reward(r: &PgRow) -> Result<Reward, Error> {
    Ok(Reward {
        reward_id: r.try_get("reward_id")?,
        name: r.try_get("name")?,
        description: r.try_get("description")?,
        reward_type: RewardType::parse(r.try_get::<String, _>("reward_type")?.as_str())?,
        points_cost: r.try_get("points_cost")?,
        discount_percent: r.try_get("discount_percent")?,
        discount_amount: r.try_get("discount_amount")?,
        product_id: r.try_get("product_id")?,
        image: r.try_get("image")?,
        stock: r.try_get("stock")?,
        enabled: r.try_get("enabled")?,
        tier_required: TierRequirement::parse(r.try_get::<String, _>("tier_required")?.as_str()),
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn row_to_redemption(r: &PgRow) -> Result<Redemption, Error> {
    Ok(Redemption {
        redemption_id: r.try_get("redemption_id")?,
        user_id: r.try_get("user_id")?,
        reward_id: r.try_get("reward_id")?,
        points_spent: r.try_get("points_spent")?,
        status: RedemptionStatus::parse(r.try_get::<String, _>("status")?.as_str())?,
        coupon_code: r.try_get("coupon_code")?,
        metadata: r.try_get("metadata")?,
        created_at: r.try_get("created_at")?,
    })
}

const REWARD_COLS: &str = "reward_id, name, description, reward_type, points_cost, \
     discount_percent, discount_amount, product_id, image, stock, enabled, tier_required, \
     created_at, updated_at";

#[async_trait]
impl RewardRepository for PostgresRewardRepository {
    async fn create_reward(&self, reward: &Reward) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO rewards (
                reward_id,
                name,
                description,
                reward_type,
                points_cost,
                discount_percent,
                discount_amount,
                product_id,
                image,
                stock,
                enabled,
                tier_required,
                created_at,
                updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
            "#,
        )
            .bind(reward.reward_id)
            .bind(&reward.name)
            .bind(&reward.description)
            .bind(reward.reward_type.as_str())
            .bind(reward.points_cost)
            .bind(reward.discount_percent)
            .bind(reward.discount_amount)
            .bind(reward.product_id)
            .bind(&reward.image)
            .bind(reward.stock)
            .bind(reward.enabled)
            .bind(reward.tier_required.as_str())
            .bind(reward.created_at)
            .bind(reward.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_reward(&self, reward_id: Uuid) -> Result<Option<Reward>, Error> {
        let row_opt = sqlx::query(&format!(
            "SELECT {REWARD_COLS} FROM rewards WHERE reward_id = $1"
        ))
            .bind(reward_id)
            .fetch_optional(&self.pool)
            .await?;

        row_opt.map(|r| row_to_reward(&r)).transpose()
    }

    async fn update_reward(&self, reward: &Reward) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE rewards
            SET
              name = $1,
              description = $2,
              reward_type = $3,
              points_cost = $4,
              discount_percent = $5,
              discount_amount = $6,
              product_id = $7,
              image = $8,
              stock = $9,
              enabled = $10,
              tier_required = $11,
              updated_at = now()
            WHERE reward_id = $12
            "#,
        )
            .bind(&reward.name)
            .bind(&reward.description)
            .bind(reward.reward_type.as_str())
            .bind(reward.points_cost)
            .bind(reward.discount_percent)
            .bind(reward.discount_amount)
            .bind(reward.product_id)
            .bind(&reward.image)
            .bind(reward.stock)
            .bind(reward.enabled)
            .bind(reward.tier_required.as_str())
            .bind(reward.reward_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_reward(&self, reward_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM rewards WHERE reward_id = $1")
            .bind(reward_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Reward>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {REWARD_COLS} FROM rewards WHERE enabled = TRUE ORDER BY points_cost ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_reward(&r)?);
        }
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Reward>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {REWARD_COLS} FROM rewards ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_reward(&r)?);
        }
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM rewards")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn try_decrement_stock(&self, reward_id: Uuid) -> Result<bool, Error> {
        // Conditional decrement; zero rows means the last unit is gone.
        let result = sqlx::query(
            "UPDATE rewards SET stock = stock - 1, updated_at = now() \
             WHERE reward_id = $1 AND stock > 0",
        )
            .bind(reward_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn restore_stock(&self, reward_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            "UPDATE rewards SET stock = stock + 1, updated_at = now() \
             WHERE reward_id = $1 AND stock >= 0",
        )
            .bind(reward_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO redemptions (
                redemption_id,
                user_id,
                reward_id,
                points_spent,
                status,
                coupon_code,
                metadata,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
            .bind(redemption.redemption_id)
            .bind(redemption.user_id)
            .bind(redemption.reward_id)
            .bind(redemption.points_spent)
            .bind(redemption.status.as_str())
            .bind(&redemption.coupon_code)
            .bind(&redemption.metadata)
            .bind(redemption.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT redemption_id, user_id, reward_id, points_spent, status,
                   coupon_code, metadata, created_at
            FROM redemptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_redemption(&r)?);
        }
        Ok(list)
    }
}
