use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8080)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Path Telegram posts updates to (default: /bot)
    #[serde(default = "default_bot_path")]
    pub bot_path: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`, if set on the webhook
    #[serde(default)]
    pub secret_token: Option<String>,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_bot_path() -> String {
    "/bot".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            bot_path: default_bot_path(),
            secret_token: None,
        }
    }
}
