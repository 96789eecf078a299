pub mod handler;
pub mod types;


use crate::error::TransportError;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds.
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Telegram channel speaking the Bot API over HTTPS.
pub struct TelegramChannel {
    bot_token: String,
    api_base: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            client: reqwest::Client::new(),
        }
    }

    /// Point at another Bot API server (self-hosted, or a mock in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }

    /// POST a JSON body; anything but 2xx is a rejection.
    ///
    /// Request URLs carry the bot token, so they are stripped from errors.
    async fn call(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, TransportError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                channel: "telegram".into(),
                message: format!("{method}: {}", e.without_url()),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(TransportError::Rejected {
                channel: "telegram".into(),
                method: method.to_string(),
                status,
                body,
            });
        }

        Ok(resp)
    }

    /// One `getUpdates` round starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<types::Update>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"]
        });
        let resp = self.call("getUpdates", &body).await?;
        let parsed: types::ApiResponse<Vec<types::Update>> =
            resp.json().await.map_err(|e| TransportError::Request {
                channel: "telegram".into(),
                message: format!("getUpdates: {}", e.without_url()),
            })?;

        if !parsed.ok {
            return Err(TransportError::Request {
                channel: "telegram".into(),
                message: parsed
                    .description
                    .unwrap_or_else(|| "getUpdates returned ok=false".into()),
            });
        }
        Ok(parsed.result.unwrap_or_default())
    }
}
