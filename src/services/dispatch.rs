use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value as JsonValue;

use crate::dto::line_events::WebhookEvent;
use crate::error::{Error, Result};
use crate::services::registration;
use crate::AppState;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
pub type EventHandler =
    for<'a> fn(&'a AppState, &'a JsonValue, &'a WebhookEvent) -> HandlerFuture<'a>;

/// (event type, message type) routing key. Non-message events carry no
/// message type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub event_type: String,
    pub message_type: Option<String>,
}

impl EventKey {
    pub fn message(message_type: &str) -> Self {
        Self {
            event_type: "message".to_string(),
            message_type: Some(message_type.to_string()),
        }
    }

    pub fn of(event: &WebhookEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            message_type: event.message.as_ref().map(|m| m.message_type.clone()),
        }
    }
}

/// Routing table with exactly one handler per key; registering the same key
/// twice is rejected so a pattern can never fan out to multiple handlers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: HashMap<EventKey, EventHandler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: EventKey, handler: EventHandler) -> Result<()> {
        if self.handlers.contains_key(&key) {
            return Err(Error::Internal(format!(
                "Duplicate event handler registration for {:?}",
                key
            )));
        }
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Runs the handler for the event, if one is registered. Returns `None`
    /// for event patterns this service does not handle.
    pub async fn dispatch(
        &self,
        state: &AppState,
        raw: &JsonValue,
        event: &WebhookEvent,
    ) -> Option<Result<()>> {
        let handler = self.handlers.get(&EventKey::of(event))?;
        Some(handler(state, raw, event).await)
    }
}

fn handle_text<'a>(
    state: &'a AppState,
    raw: &'a JsonValue,
    event: &'a WebhookEvent,
) -> HandlerFuture<'a> {
    Box::pin(registration::handle_text_message(state, raw, event))
}

pub fn default_dispatcher() -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher
        .register(EventKey::message("text"), handle_text)
        .expect("text message handler registered once");
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop<'a>(
        _state: &'a AppState,
        _raw: &'a JsonValue,
        _event: &'a WebhookEvent,
    ) -> HandlerFuture<'a> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher
            .register(EventKey::message("text"), noop)
            .expect("first registration");
        assert!(dispatcher
            .register(EventKey::message("text"), noop)
            .is_err());
    }

    #[test]
    fn distinct_message_types_are_distinct_keys() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher
            .register(EventKey::message("text"), noop)
            .expect("text");
        dispatcher
            .register(EventKey::message("sticker"), noop)
            .expect("sticker");
    }

    #[test]
    fn default_table_only_routes_text_messages() {
        let dispatcher = default_dispatcher();
        let text_key = EventKey::message("text");
        assert!(dispatcher.handlers.contains_key(&text_key));
        assert!(!dispatcher.handlers.contains_key(&EventKey::message("sticker")));
        assert!(!dispatcher.handlers.contains_key(&EventKey {
            event_type: "follow".to_string(),
            message_type: None,
        }));
    }

    #[test]
    fn key_of_reads_event_and_message_type() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "message",
            "message": { "id": "1", "type": "text", "text": "hi" }
        }))
        .expect("decode");
        assert_eq!(EventKey::of(&event), EventKey::message("text"));

        let follow: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "follow"
        }))
        .expect("decode");
        assert_eq!(
            EventKey::of(&follow),
            EventKey { event_type: "follow".to_string(), message_type: None }
        );
    }
}
