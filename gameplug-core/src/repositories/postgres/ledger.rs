// File: gameplug-core/src/repositories/postgres/ledger.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TransactionSource, TransactionType,
};
use gameplug_common::traits::repository_traits::LedgerRepository;

/// Postgres-backed ledger. Balance updates are single conditional
/// statements and the transaction append rides in the same database
/// transaction, so two concurrent mutations against one user cannot lose
/// an update and every `balance` snapshot is exact at commit time.
pub struct PostgresLedgerRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresLedgerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_balance(r: &PgRow) -> Result<LoyaltyBalance, Error> {
    Ok(LoyaltyBalance {
        user_id: r.try_get("user_id")?,
        points: r.try_get("points")?,
        lifetime_points: r.try_get("lifetime_points")?,
        tier: Tier::parse(r.try_get::<String, _>("tier")?.as_str()),
        tier_expires_at: r.try_get("tier_expires_at")?,
        daily_login_date: r.try_get("daily_login_date")?,
        streak_days: r.try_get("streak_days")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn row_to_transaction(r: &PgRow) -> Result<PointsTransaction, Error> {
    Ok(PointsTransaction {
        transaction_id: r.try_get("transaction_id")?,
        user_id: r.try_get("user_id")?,
        tx_type: TransactionType::parse(r.try_get::<String, _>("tx_type")?.as_str())?,
        amount: r.try_get("amount")?,
        balance: r.try_get("balance")?,
        source: TransactionSource::parse(r.try_get::<String, _>("source")?.as_str())?,
        description: r.try_get("description")?,
        metadata: r.try_get("metadata")?,
        expires_at: r.try_get("expires_at")?,
        created_at: r.try_get("created_at")?,
    })
}

/// The one-shot guards (signup bonus, per-order purchase award) live as
/// partial unique indexes on the transaction log; a violation surfaces as
/// the idempotency error, and the balance update in the same database
/// transaction rolls back with it.
fn map_tx_insert_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        match db.constraint() {
            Some("ux_points_tx_signup_once") => {
                return Error::AlreadyClaimed("signup bonus already claimed".to_string());
            }
            Some("ux_points_tx_purchase_order") => {
                return Error::AlreadyClaimed("points already awarded for this order".to_string());
            }
            _ => {}
        }
    }
    Error::Database(e)
}

async fn ensure_balance_row(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), Error> {
    sqlx::query("INSERT INTO loyalty_balances (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    tx_type: TransactionType,
    amount: i64,
    balance: i64,
    source: TransactionSource,
    description: &str,
    metadata: &serde_json::Value,
) -> Result<PointsTransaction, Error> {
    let transaction_id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        INSERT INTO points_transactions
            (transaction_id, user_id, tx_type, amount, balance, source, description, metadata)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING created_at
        "#,
    )
        .bind(transaction_id)
        .bind(user_id)
        .bind(tx_type.as_str())
        .bind(amount)
        .bind(balance)
        .bind(source.as_str())
        .bind(description)
        .bind(metadata)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_tx_insert_err)?;

    Ok(PointsTransaction {
        transaction_id,
        user_id,
        tx_type,
        amount,
        balance,
        source,
        description: description.to_string(),
        metadata: metadata.clone(),
        expires_at: None,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn get_or_create_balance(&self, user_id: Uuid) -> Result<LoyaltyBalance, Error> {
        sqlx::query(
            "INSERT INTO loyalty_balances (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT user_id, points, lifetime_points, tier, tier_expires_at,
                   daily_login_date, streak_days, created_at, updated_at
            FROM loyalty_balances
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        row_to_balance(&row)
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
        let mut tx = self.pool.begin().await?;
        ensure_balance_row(&mut tx, user_id).await?;

        let row = sqlx::query(
            r#"
            UPDATE loyalty_balances
            SET points = GREATEST(points + $2, 0),
                lifetime_points = lifetime_points + GREATEST($2, 0),
                updated_at = now()
            WHERE user_id = $1
            RETURNING user_id, points, lifetime_points, tier, tier_expires_at,
                      daily_login_date, streak_days, created_at, updated_at
            "#,
        )
            .bind(user_id)
            .bind(amount)
            .fetch_one(&mut *tx)
            .await?;
        let balance = row_to_balance(&row)?;

        let transaction = insert_transaction(
            &mut tx,
            user_id,
            tx_type,
            amount,
            balance.points,
            source,
            description,
            &metadata,
        )
        .await?;

        tx.commit().await?;
        Ok((balance, transaction))
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

        let mut tx = self.pool.begin().await?;
        ensure_balance_row(&mut tx, user_id).await?;

        let row_opt = sqlx::query(
            r#"
            UPDATE loyalty_balances
            SET points = points - $2,
                updated_at = now()
            WHERE user_id = $1 AND points >= $2
            RETURNING user_id, points, lifetime_points, tier, tier_expires_at,
                      daily_login_date, streak_days, created_at, updated_at
            "#,
        )
            .bind(user_id)
            .bind(cost)
            .fetch_optional(&mut *tx)
            .await?;

        let row = match row_opt {
            Some(r) => r,
            None => {
                let current = sqlx::query("SELECT points FROM loyalty_balances WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?
                    .try_get::<i64, _>("points")?;
                return Err(Error::InsufficientPoints {
                    required: cost,
                    current,
                });
            }
        };
        let balance = row_to_balance(&row)?;

        let transaction = insert_transaction(
            &mut tx,
            user_id,
            TransactionType::Spend,
            -cost,
            balance.points,
            source,
            description,
            &metadata,
        )
        .await?;

        tx.commit().await?;
        Ok((balance, transaction))
    }

    async fn claim_daily_login(
        &self,
        user_id: Uuid,
        today: &str,
        yesterday: &str,
    ) -> Result<LoyaltyBalance, Error> {
        let mut tx = self.pool.begin().await?;
        ensure_balance_row(&mut tx, user_id).await?;

        // Streak arithmetic happens inside the conditional update: exact
        // calendar adjacency extends the streak, any gap resets it to 1.
        let row_opt = sqlx::query(
            r#"
            UPDATE loyalty_balances
            SET streak_days = CASE WHEN daily_login_date = $3 THEN streak_days + 1 ELSE 1 END,
                daily_login_date = $2,
                updated_at = now()
            WHERE user_id = $1
              AND (daily_login_date IS NULL OR daily_login_date <> $2)
            RETURNING user_id, points, lifetime_points, tier, tier_expires_at,
                      daily_login_date, streak_days, created_at, updated_at
            "#,
        )
            .bind(user_id)
            .bind(today)
            .bind(yesterday)
            .fetch_optional(&mut *tx)
            .await?;

        let row = row_opt.ok_or_else(|| {
            Error::AlreadyClaimed("daily login reward already claimed today".to_string())
        })?;
        let balance = row_to_balance(&row)?;

        tx.commit().await?;
        Ok(balance)
    }

    async fn set_tier(
        &self,
        user_id: Uuid,
        tier: Tier,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<LoyaltyBalance, Error> {
        let mut tx = self.pool.begin().await?;
        ensure_balance_row(&mut tx, user_id).await?;

        let row = sqlx::query(
            r#"
            UPDATE loyalty_balances
            SET tier = $2,
                tier_expires_at = $3,
                updated_at = now()
            WHERE user_id = $1
            RETURNING user_id, points, lifetime_points, tier, tier_expires_at,
                      daily_login_date, streak_days, created_at, updated_at
            "#,
        )
            .bind(user_id)
            .bind(tier.as_str())
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;
        let balance = row_to_balance(&row)?;

        tx.commit().await?;
        Ok(balance)
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointsTransaction>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, user_id, tx_type, amount, balance, source,
                   description, metadata, expires_at, created_at
            FROM points_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_transaction(&r)?);
        }
        Ok(list)
    }

    async fn count_transactions(&self, user_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM points_transactions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}
