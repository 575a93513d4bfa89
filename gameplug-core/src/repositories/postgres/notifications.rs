// File: gameplug-core/src/repositories/postgres/notifications.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use gameplug_common::error::Error;
use gameplug_common::models::notification::NewNotification;
use gameplug_common::traits::repository_traits::NotificationSink;

/// Writes notifications into the `notifications` table. Callers treat this
/// as best-effort; a failed insert is logged and swallowed upstream.
pub struct PostgresNotificationSink {
    pub pool: Pool<Postgres>,
}

impl PostgresNotificationSink {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PostgresNotificationSink {
    async fn deliver(&self, notification: &NewNotification) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (notification_id, user_id, kind, title, message, data)
            VALUES ($1,$2,$3,$4,$5,$6)
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(notification.user_id)
            .bind(&notification.kind)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
