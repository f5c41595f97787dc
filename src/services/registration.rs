use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::dto::line_events::WebhookEvent;
use crate::error::Result;
use crate::AppState;

pub const REGISTER_PHRASE: &str = "登録します";
pub const DETAILS_PHRASE: &str = "詳細を教えてください";

pub const REGISTERED_REPLY: &str = "登録が完了しました！これでサービスをご利用いただけます。";
pub const DETAILS_REPLY: &str =
    "このサービスでは、AIを活用した自動応答機能をご提供しています。\n\n登録後は、様々な質問にお答えいたします。";
pub const RETRY_REPLY: &str = "ユーザー情報を取得中です。もう一度お試しください。";

/// What to do with one inbound text message, given the sender's current
/// registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward to the n8n workflow and reply with its answer.
    Relay,
    /// Flip the registration flag and confirm.
    CompleteRegistration,
    /// Reply with the service description, state unchanged.
    ServiceDetails,
    /// Reply with the registration buttons prompt, state unchanged.
    Onboarding,
}

pub fn classify(is_active: bool, text: &str) -> Action {
    if is_active {
        return Action::Relay;
    }
    match text {
        REGISTER_PHRASE => Action::CompleteRegistration,
        DETAILS_PHRASE => Action::ServiceDetails,
        _ => Action::Onboarding,
    }
}

/// Handles one text-message event end to end: load-or-create the sender,
/// append the audit log, then act on [`classify`]. Reply delivery failures
/// are logged here and never bubble up to the webhook response.
pub async fn handle_text_message(
    state: &AppState,
    raw: &JsonValue,
    event: &WebhookEvent,
) -> Result<()> {
    let Some(line_user_id) = event
        .source
        .as_ref()
        .and_then(|s| s.user_id.as_deref())
    else {
        warn!("Text message event without a user source, skipping");
        return Ok(());
    };
    let Some(reply_token) = event.reply_token.as_deref() else {
        warn!("Text message event without a reply token, skipping");
        return Ok(());
    };
    let Some(message) = event.message.as_ref() else {
        return Ok(());
    };
    let text = message.text.as_deref().unwrap_or_default();

    info!("Received message from {}: {}", line_user_id, text);

    let (user, _created) = state
        .user_service
        .get_or_create(&state.line_client, line_user_id)
        .await?;

    state
        .message_log_service
        .record(user.id, &message.message_type, text, raw)
        .await?;

    let send = match classify(user.is_active, text) {
        Action::Relay => {
            let reply = state.relay_service.forward(line_user_id, text).await;
            state.line_client.reply_text(reply_token, &reply).await
        }
        Action::CompleteRegistration => {
            if state.user_service.set_active(line_user_id, true).await? {
                state.line_client.reply_text(reply_token, REGISTERED_REPLY).await
            } else {
                // Row vanished between lookup and update; recreate and ask
                // the user to try again.
                state
                    .user_service
                    .get_or_create(&state.line_client, line_user_id)
                    .await?;
                state.line_client.reply_text(reply_token, RETRY_REPLY).await
            }
        }
        Action::ServiceDetails => {
            state.line_client.reply_text(reply_token, DETAILS_REPLY).await
        }
        Action::Onboarding => send_onboarding_prompt(state, reply_token).await,
    };

    if let Err(e) = send {
        warn!("Failed to send LINE reply to {}: {}", line_user_id, e);
    }

    Ok(())
}

async fn send_onboarding_prompt(state: &AppState, reply_token: &str) -> Result<()> {
    let actions = json!([
        { "type": "message", "label": "登録する", "text": REGISTER_PHRASE },
        { "type": "message", "label": "詳細を見る", "text": DETAILS_PHRASE },
    ]);
    state
        .line_client
        .reply_buttons(
            reply_token,
            "登録について",
            "アカウント登録",
            "このサービスを利用するには登録が必要です。",
            actions,
        )
        .await
}
