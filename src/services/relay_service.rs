use reqwest::Client;
use serde_json::json;
use tracing::error;

/// Returned by n8n when its reply body carries no `response` field.
const DEFAULT_REPLY: &str = "処理が完了しました。";
/// Shown when the endpoint answered with a non-200 status.
const SERVER_ERROR_REPLY: &str = "申し訳ございません。処理中にエラーが発生しました。";
/// Shown when the endpoint could not be reached at all.
const CONNECT_ERROR_REPLY: &str = "申し訳ございません。システムに接続できませんでした。";

/// Forwards registered users' messages to the n8n workflow endpoint and
/// maps every failure to a static user-facing string. Single attempt, no
/// retry.
#[derive(Clone)]
pub struct RelayService {
    client: Client,
    webhook_url: String,
}

impl RelayService {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for n8n relay");

        Self {
            client,
            webhook_url,
        }
    }

    pub async fn forward(&self, line_user_id: &str, message_text: &str) -> String {
        let payload = json!({
            "user_id": line_user_id,
            "message": message_text,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let response = match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("n8n webhook request failed: {}", e);
                return CONNECT_ERROR_REPLY.to_string();
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("n8n webhook error: {}", status);
            return SERVER_ERROR_REPLY.to_string();
        }

        // A 200 with an unreadable body counts as a failed request
        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("response")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_REPLY)
                .to_string(),
            Err(e) => {
                error!("n8n webhook returned unreadable body: {}", e);
                CONNECT_ERROR_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn passes_through_response_field_verbatim() {
        let app = Router::new().route(
            "/hook",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["user_id"].as_str(), Some("U123"));
                assert_eq!(body["message"].as_str(), Some("hello"));
                assert!(body["timestamp"].is_string());
                Json(serde_json::json!({ "response": "answer from workflow" }))
            }),
        );
        let base = spawn_server(app).await;

        let relay = RelayService::new(format!("{}/hook", base));
        let reply = relay.forward("U123", "hello").await;
        assert_eq!(reply, "answer from workflow");
    }

    #[tokio::test]
    async fn falls_back_to_default_when_field_missing() {
        let app = Router::new().route(
            "/hook",
            post(|| async { Json(serde_json::json!({ "ok": true })) }),
        );
        let base = spawn_server(app).await;

        let relay = RelayService::new(format!("{}/hook", base));
        assert_eq!(relay.forward("U123", "hello").await, DEFAULT_REPLY);
    }

    #[tokio::test]
    async fn maps_non_200_to_server_error_reply() {
        let app = Router::new().route(
            "/hook",
            post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_server(app).await;

        let relay = RelayService::new(format!("{}/hook", base));
        assert_eq!(relay.forward("U123", "hello").await, SERVER_ERROR_REPLY);
    }

    #[tokio::test]
    async fn treats_unreadable_200_body_as_connect_failure() {
        let app = Router::new().route(
            "/hook",
            post(|| async { (axum::http::StatusCode::OK, "this is not json") }),
        );
        let base = spawn_server(app).await;

        let relay = RelayService::new(format!("{}/hook", base));
        assert_eq!(relay.forward("U123", "hello").await, CONNECT_ERROR_REPLY);
    }

    #[tokio::test]
    async fn maps_connection_failure_to_connect_error_reply() {
        // Bind then drop the listener so the port is known-dead.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let relay = RelayService::new(format!("http://{}/hook", addr));
        assert_eq!(relay.forward("U123", "hello").await, CONNECT_ERROR_REPLY);
    }
}
