// File: gameplug-common/src/models/notification.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outbound user notification. Delivery is best-effort and never on the
/// critical path of a ledger operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}
