use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::message_log::MessageLog;

#[derive(Clone)]
pub struct MessageLogService {
    pool: PgPool,
}

#[derive(Debug, Default)]
pub struct MessageLogFilter {
    pub user_id: Option<Uuid>,
    pub message_type: Option<String>,
    pub date: Option<NaiveDate>,
}

impl MessageLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pure append; the raw event payload is stored unmodified for audit.
    pub async fn record(
        &self,
        user_id: Uuid,
        message_type: &str,
        message_text: &str,
        raw_data: &JsonValue,
    ) -> Result<MessageLog> {
        let entry = sqlx::query_as::<_, MessageLog>(
            r#"
            INSERT INTO message_logs (user_id, message_type, message_text, raw_data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(message_type)
        .bind(message_text)
        .bind(raw_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn list(&self, filter: MessageLogFilter, limit: i64) -> Result<Vec<MessageLog>> {
        let entries = sqlx::query_as::<_, MessageLog>(
            r#"
            SELECT * FROM message_logs
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR message_type = $2)
              AND ($3::date IS NULL OR created_at::date = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.message_type)
        .bind(filter.date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
