use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message_type: String,
    pub message_text: String,
    pub raw_data: JsonValue,
    pub created_at: DateTime<Utc>,
}
