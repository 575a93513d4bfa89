// File: gameplug-core/src/repositories/postgres/packs.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::loyalty::TierRequirement;
use gameplug_common::models::pack::{DropResult, Pack, PackDrop, PackOpening};
use gameplug_common::traits::repository_traits::PackRepository;

pub struct PostgresPackRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresPackRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_pack(r: &PgRow) -> Result<Pack, Error> {
    let drops_value: serde_json::Value = r.try_get("drops")?;
    let drops: Vec<PackDrop> = serde_json::from_value(drops_value)?;
    Ok(Pack {
        pack_id: r.try_get("pack_id")?,
        name: r.try_get("name")?,
        description: r.try_get("description")?,
        image: r.try_get("image")?,
        points_cost: r.try_get("points_cost")?,
        enabled: r.try_get("enabled")?,
        tier_required: TierRequirement::parse(r.try_get::<String, _>("tier_required")?.as_str()),
        drops,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn row_to_opening(r: &PgRow) -> Result<PackOpening, Error> {
    let result_value: serde_json::Value = r.try_get("result")?;
    let result: DropResult = serde_json::from_value(result_value)?;
    Ok(PackOpening {
        opening_id: r.try_get("opening_id")?,
        user_id: r.try_get("user_id")?,
        pack_id: r.try_get("pack_id")?,
        points_spent: r.try_get("points_spent")?,
        result,
        created_at: r.try_get("created_at")?,
    })
}

const PACK_COLS: &str =
    "pack_id, name, description, image, points_cost, enabled, tier_required, drops, \
     created_at, updated_at";

#[async_trait]
impl PackRepository for PostgresPackRepository {
    async fn create_pack(&self, pack: &Pack) -> Result<(), Error> {
        let drops = serde_json::to_value(&pack.drops)?;
        sqlx::query(
            r#"
            INSERT INTO packs (
                pack_id,
                name,
                description,
                image,
                points_cost,
                enabled,
                tier_required,
                drops,
                created_at,
                updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            "#,
        )
            .bind(pack.pack_id)
            .bind(&pack.name)
            .bind(&pack.description)
            .bind(&pack.image)
            .bind(pack.points_cost)
            .bind(pack.enabled)
            .bind(pack.tier_required.as_str())
            .bind(drops)
            .bind(pack.created_at)
            .bind(pack.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<Pack>, Error> {
        let row_opt = sqlx::query(&format!("SELECT {PACK_COLS} FROM packs WHERE pack_id = $1"))
            .bind(pack_id)
            .fetch_optional(&self.pool)
            .await?;

        row_opt.map(|r| row_to_pack(&r)).transpose()
    }

    async fn update_pack(&self, pack: &Pack) -> Result<(), Error> {
        let drops = serde_json::to_value(&pack.drops)?;
        sqlx::query(
            r#"
            UPDATE packs
            SET
              name = $1,
              description = $2,
              image = $3,
              points_cost = $4,
              enabled = $5,
              tier_required = $6,
              drops = $7,
              updated_at = now()
            WHERE pack_id = $8
            "#,
        )
            .bind(&pack.name)
            .bind(&pack.description)
            .bind(&pack.image)
            .bind(pack.points_cost)
            .bind(pack.enabled)
            .bind(pack.tier_required.as_str())
            .bind(drops)
            .bind(pack.pack_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_enabled(&self) -> Result<Vec<Pack>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {PACK_COLS} FROM packs WHERE enabled = TRUE ORDER BY points_cost ASC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_pack(&r)?);
        }
        Ok(list)
    }

    async fn list_all(&self) -> Result<Vec<Pack>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {PACK_COLS} FROM packs ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_pack(&r)?);
        }
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM packs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn insert_opening(&self, opening: &PackOpening) -> Result<(), Error> {
        let result = serde_json::to_value(&opening.result)?;
        sqlx::query(
            r#"
            INSERT INTO pack_openings (
                opening_id,
                user_id,
                pack_id,
                points_spent,
                result,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6)
            "#,
        )
            .bind(opening.opening_id)
            .bind(opening.user_id)
            .bind(opening.pack_id)
            .bind(opening.points_spent)
            .bind(result)
            .bind(opening.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_openings_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PackOpening>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT opening_id, user_id, pack_id, points_spent, result, created_at
            FROM pack_openings
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(row_to_opening(&r)?);
        }
        Ok(list)
    }
}
