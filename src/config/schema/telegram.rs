use crate::transport::telegram::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather
    #[serde(default)]
    pub bot_token: String,
    /// Bot API server (default: https://api.telegram.org)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// `getUpdates` long-poll timeout in seconds, for `storybot poll`
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}
