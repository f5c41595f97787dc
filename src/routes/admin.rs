use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::{
    config::get_config,
    error::{Error, Result},
    models::{line_user::LineUser, message_log::MessageLog},
    services::message_log_service::MessageLogFilter,
    AppState,
};

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub line_user_id: Option<String>,
    pub message_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<LineUser>>> {
    verify_admin_token(&headers)?;
    let users = state.user_service.list(query.q.as_deref()).await?;
    Ok(Json(users))
}

pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<MessageLog>>> {
    verify_admin_token(&headers)?;

    let user_id = match query.line_user_id.as_deref() {
        Some(line_user_id) => match state.user_service.find(line_user_id).await? {
            Some(user) => Some(user.id),
            // Unknown user matches nothing
            None => return Ok(Json(Vec::new())),
        },
        None => None,
    };

    let filter = MessageLogFilter {
        user_id,
        message_type: query.message_type,
        date: query.date,
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    let entries = state.message_log_service.list(filter, limit).await?;
    Ok(Json(entries))
}

fn verify_admin_token(headers: &HeaderMap) -> Result<()> {
    let Some(token_hdr) = headers.get("x-admin-token") else {
        return Err(Error::Unauthorized("missing_admin_token".into()));
    };
    let provided = token_hdr
        .to_str()
        .map_err(|_| Error::Unauthorized("invalid_admin_token_header".into()))?;
    let expected = &get_config().admin_token;
    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_admin_token".into()))
    }
}
