use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Top-level LINE webhook request body. Events are kept as raw JSON so the
/// message log can store each one unmodified; typed views are decoded on
/// demand with [`WebhookEvent::from_raw`].
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

impl WebhookEvent {
    pub fn from_raw(raw: &JsonValue) -> serde_json::Result<Self> {
        serde_json::from_value(raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_text_message_event() {
        let raw = json!({
            "type": "message",
            "replyToken": "0f3779fba3b349968c5d07db31eab56f",
            "source": { "type": "user", "userId": "U4af4980629" },
            "timestamp": 1462629479859i64,
            "message": { "id": "325708", "type": "text", "text": "Hello, world" }
        });

        let event = WebhookEvent::from_raw(&raw).expect("decode");
        assert_eq!(event.event_type, "message");
        assert_eq!(event.reply_token.as_deref(), Some("0f3779fba3b349968c5d07db31eab56f"));
        assert_eq!(
            event.source.as_ref().and_then(|s| s.user_id.as_deref()),
            Some("U4af4980629")
        );
        let message = event.message.expect("message");
        assert_eq!(message.message_type, "text");
        assert_eq!(message.text.as_deref(), Some("Hello, world"));
    }

    #[test]
    fn decodes_non_text_message_without_text_field() {
        let raw = json!({
            "type": "message",
            "replyToken": "abc",
            "source": { "type": "user", "userId": "U123" },
            "message": { "id": "1", "type": "sticker" }
        });

        let event = WebhookEvent::from_raw(&raw).expect("decode");
        assert_eq!(event.message.unwrap().text, None);
    }

    #[test]
    fn body_defaults_to_empty_events() {
        let body: WebhookBody = serde_json::from_str(r#"{"destination":"xxx"}"#).expect("decode");
        assert!(body.events.is_empty());
    }
}
