use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineProfile {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "pictureUrl")]
    pub picture_url: Option<String>,
    #[serde(rename = "statusMessage")]
    pub status_message: Option<String>,
}

/// Thin client for the LINE Messaging API. Constructed once at startup and
/// injected through `AppState`; `api_base` is overridable so tests can point
/// it at a local server.
#[derive(Clone)]
pub struct LineClient {
    client: Client,
    access_token: String,
    api_base: String,
}

impl LineClient {
    pub fn new(access_token: String, api_base: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for LINE API");

        Self {
            client,
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_profile(&self, line_user_id: &str) -> Result<LineProfile> {
        let url = format!("{}/v2/bot/profile/{}", self.api_base, line_user_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "LINE profile lookup failed with status {}: {}",
                status, body
            )));
        }

        Ok(response.json::<LineProfile>().await?)
    }

    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        self.reply(reply_token, json!([{ "type": "text", "text": text }]))
            .await
    }

    /// Sends a buttons template message. `actions` follow the LINE template
    /// action schema (message actions here).
    pub async fn reply_buttons(
        &self,
        reply_token: &str,
        alt_text: &str,
        title: &str,
        text: &str,
        actions: JsonValue,
    ) -> Result<()> {
        let message = json!([{
            "type": "template",
            "altText": alt_text,
            "template": {
                "type": "buttons",
                "title": title,
                "text": text,
                "actions": actions,
            }
        }]);
        self.reply(reply_token, message).await
    }

    async fn reply(&self, reply_token: &str, messages: JsonValue) -> Result<()> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = json!({
            "replyToken": reply_token,
            "messages": messages,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "LINE reply failed with status {}: {}",
                status, detail
            )));
        }

        info!("Sent LINE reply for token {}", reply_token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, routing::get, Json, Router};

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
    async fn get_profile_decodes_line_response() {
        let app = Router::new().route(
            "/v2/bot/profile/:id",
            get(|Path(id): Path<String>| async move {
                Json(serde_json::json!({
                    "displayName": "Alice",
                    "pictureUrl": "https://example.com/a.jpg",
                    "statusMessage": null,
                    "userId": id,
                }))
            }),
        );
        let base = spawn_server(app).await;

        let client = LineClient::new("token".to_string(), base);
        let profile = client.get_profile("U123").await.expect("profile");
        assert_eq!(profile.display_name, "Alice");
        assert_eq!(profile.picture_url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(profile.status_message, None);
    }

    #[tokio::test]
    async fn get_profile_surfaces_non_200() {
        let app = Router::new().route(
            "/v2/bot/profile/:id",
            get(|_: Path<String>| async {
                (axum::http::StatusCode::NOT_FOUND, "{\"message\":\"Not found\"}")
            }),
        );
        let base = spawn_server(app).await;

        let client = LineClient::new("token".to_string(), base);
        assert!(client.get_profile("U404").await.is_err());
    }
}
