use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::line_user::LineUser;
use crate::services::line_client::LineClient;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, line_user_id: &str) -> Result<Option<LineUser>> {
        let user = sqlx::query_as::<_, LineUser>(
            r#"
            SELECT * FROM line_users
            WHERE line_user_id = $1
            "#,
        )
        .bind(line_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks up the user, creating the row on first contact. New users start
    /// with `is_active = false`; profile fields come from the LINE API, with
    /// a synthesized display name when the lookup fails. A unique-constraint
    /// race on `line_user_id` is resolved by re-fetching the winner's row.
    pub async fn get_or_create(
        &self,
        line: &LineClient,
        line_user_id: &str,
    ) -> Result<(LineUser, bool)> {
        if let Some(user) = self.find(line_user_id).await? {
            return Ok((user, false));
        }

        let (display_name, picture_url, status_message) =
            match line.get_profile(line_user_id).await {
                Ok(profile) => (profile.display_name, profile.picture_url, profile.status_message),
                Err(e) => {
                    warn!("Failed to get LINE profile for {}: {}", line_user_id, e);
                    let short: String = line_user_id.chars().take(8).collect();
                    (format!("User_{}", short), None, None)
                }
            };

        let inserted = sqlx::query_as::<_, LineUser>(
            r#"
            INSERT INTO line_users (line_user_id, display_name, picture_url, status_message, is_active)
            VALUES ($1, $2, $3, $4, FALSE)
            ON CONFLICT (line_user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(line_user_id)
        .bind(&display_name)
        .bind(&picture_url)
        .bind(&status_message)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(user) => {
                info!("Created new LINE user: {}", user.display_name);
                Ok((user, true))
            }
            None => {
                // Concurrent request created it first
                let user = self.find(line_user_id).await?.ok_or_else(|| {
                    Error::Internal(format!(
                        "line_users insert conflicted but no row found for {}",
                        line_user_id
                    ))
                })?;
                Ok((user, false))
            }
        }
    }

    /// Flips the registration flag. Returns false when no row matched, which
    /// the registration flow treats as "record vanished, start over".
    pub async fn set_active(&self, line_user_id: &str, value: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE line_users
            SET is_active = $1, updated_at = NOW()
            WHERE line_user_id = $2
            "#,
        )
        .bind(value)
        .bind(line_user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<LineUser>> {
        let users = match search {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, LineUser>(
                    r#"
                    SELECT * FROM line_users
                    WHERE line_user_id ILIKE $1 OR display_name ILIKE $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LineUser>(
                    r#"
                    SELECT * FROM line_users
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users)
    }
}
