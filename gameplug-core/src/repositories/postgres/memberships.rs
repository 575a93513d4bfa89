// File: gameplug-core/src/repositories/postgres/memberships.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use gameplug_common::error::Error;
use gameplug_common::models::loyalty::Tier;
use gameplug_common::models::membership::Membership;
use gameplug_common::traits::repository_traits::MembershipRepository;

pub struct PostgresMembershipRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresMembershipRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_membership(r: &PgRow) -> Result<Membership, Error> {
    Ok(Membership {
        tier: Tier::parse(r.try_get::<String, _>("tier")?.as_str()),
        name: r.try_get("name")?,
        price: r.try_get("price")?,
        yearly_price: r.try_get("yearly_price")?,
        points_multiplier: r.try_get("points_multiplier")?,
        perks: r.try_get("perks")?,
        enabled: r.try_get("enabled")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

const MEMBERSHIP_COLS: &str =
    "tier, name, price, yearly_price, points_multiplier, perks, enabled, created_at, updated_at";

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn get_by_tier(&self, tier: Tier) -> Result<Option<Membership>, Error> {
        let row_opt = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLS} FROM memberships WHERE tier = $1"
        ))
            .bind(tier.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row_opt.map(|r| row_to_membership(&r)).transpose()
    }

    async fn list_enabled(&self) -> Result<Vec<Membership>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLS} FROM memberships WHERE enabled = TRUE ORDER BY price ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_membership(&r)?);
        }
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Membership>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLS} FROM memberships ORDER BY price ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_membership(&r)?);
        }
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM memberships")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn upsert(&self, membership: &Membership) -> Result<Membership, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO memberships
                (tier, name, price, yearly_price, points_multiplier, perks, enabled)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            ON CONFLICT (tier) DO UPDATE
            SET name = EXCLUDED.name,
                price = EXCLUDED.price,
                yearly_price = EXCLUDED.yearly_price,
                points_multiplier = EXCLUDED.points_multiplier,
                perks = EXCLUDED.perks,
                enabled = EXCLUDED.enabled,
                updated_at = now()
            RETURNING tier, name, price, yearly_price, points_multiplier, perks,
                      enabled, created_at, updated_at
            "#,
        )
            .bind(membership.tier.as_str())
            .bind(&membership.name)
            .bind(membership.price)
            .bind(membership.yearly_price)
            .bind(membership.points_multiplier)
            .bind(&membership.perks)
            .bind(membership.enabled)
            .fetch_one(&self.pool)
            .await?;

        row_to_membership(&row)
    }
}
