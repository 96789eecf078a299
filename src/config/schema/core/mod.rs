mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;

use super::{DeliveryConfig, GatewayConfig, ObservabilityConfig, StoryConfig, TelegramConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub story: StoryConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Reject settings the bot cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "telegram.bot_token is empty (set it or STORYBOT_BOT_TOKEN)".into(),
            ));
        }
        self.validate_story()?;
        if !self.gateway.bot_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "gateway.bot_path must start with '/', got {:?}",
                self.gateway.bot_path
            )));
        }
        if self.delivery.max_attempts == Some(0) {
            return Err(ConfigError::Validation(
                "delivery.max_attempts must be at least 1".into(),
            ));
        }
        if self
            .observability
            .level
            .trim()
            .parse::<tracing::Level>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "observability.level {:?} is not a log level",
                self.observability.level
            )));
        }
        Ok(())
    }

    /// The subset `storybot check` needs: a story to load.
    pub fn validate_story(&self) -> Result<(), ConfigError> {
        if self.story.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "story.path is empty (set it or STORYBOT_STORY_PATH)".into(),
            ));
        }
        Ok(())
    }
}
