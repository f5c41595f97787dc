use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{debug, error, warn};

use crate::{
    config::get_config,
    dto::line_events::{WebhookBody, WebhookEvent},
    utils::line_signature,
    AppState,
};

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// `POST <prefix>/webhook/`. Responds with a bare 400 when the signature
/// does not match (nothing is processed) and a bare 200 otherwise. Handler
/// failures are logged but never change the response; the platform only
/// needs to know the delivery was accepted.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let config = get_config();
    if !line_signature::verify_signature(&config.line_channel_secret, &body, signature) {
        error!("Invalid LINE webhook signature");
        return StatusCode::BAD_REQUEST;
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Undecodable LINE webhook body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    for raw in &payload.events {
        let event = match WebhookEvent::from_raw(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping undecodable event: {}", e);
                continue;
            }
        };

        match state.dispatcher.dispatch(&state, raw, &event).await {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                error!("Handler failed for {} event: {}", event.event_type, e);
            }
            None => {
                debug!(
                    "No handler for event type {} (message type {:?}), ignoring",
                    event.event_type,
                    event.message.as_ref().map(|m| m.message_type.as_str())
                );
            }
        }
    }

    StatusCode::OK
}
