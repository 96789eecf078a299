use super::Config;
use std::path::PathBuf;

/// First non-empty value among `keys`.
fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = env_first(&["STORYBOT_BOT_TOKEN", "BOT_TOKEN"]) {
            self.telegram.bot_token = token;
        }

        if let Some(path) = env_first(&["STORYBOT_STORY_PATH", "STORY_PATH"]) {
            self.story.path = PathBuf::from(path);
        }

        if let Some(path) = env_first(&["STORYBOT_I18N_PATH", "I18N_PATH"]) {
            self.story.i18n_path = Some(PathBuf::from(path));
        }

        if let Some(port_str) = env_first(&["STORYBOT_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(host) = env_first(&["STORYBOT_HOST"]) {
            self.gateway.host = host;
        }

        if let Some(bot_path) = env_first(&["STORYBOT_BOT_PATH"]) {
            self.gateway.bot_path = bot_path;
        }

        if let Some(path) = env_first(&["STORYBOT_LOG_PATH", "LOG_PATH"]) {
            self.observability.log_file = Some(PathBuf::from(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::EnvScope;
    use super::*;

    #[test]
    fn prefixed_variables_win_over_plain_ones() {
        let mut env = EnvScope::new();
        env.set("STORYBOT_BOT_TOKEN", "prefixed").set("BOT_TOKEN", "plain");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.telegram.bot_token, "prefixed");
    }

    #[test]
    fn plain_variables_are_fallbacks() {
        let mut env = EnvScope::new();
        env.unset("STORYBOT_STORY_PATH")
            .set("STORY_PATH", "/data/story.json")
            .unset("STORYBOT_I18N_PATH")
            .set("I18N_PATH", "/data/i18n.json")
            .unset("STORYBOT_LOG_PATH")
            .set("LOG_PATH", "/data/bot.log");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.story.path, PathBuf::from("/data/story.json"));
        assert_eq!(config.story.i18n_path, Some(PathBuf::from("/data/i18n.json")));
        assert_eq!(config.observability.log_file, Some(PathBuf::from("/data/bot.log")));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut env = EnvScope::new();
        env.set("STORYBOT_BOT_TOKEN", "")
            .unset("BOT_TOKEN")
            .set("STORYBOT_HOST", "");

        let mut config = Config::default();
        config.telegram.bot_token = "from-file".into();
        config.apply_env_overrides();
        assert_eq!(config.telegram.bot_token, "from-file");
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn invalid_port_is_ignored() {
        let mut env = EnvScope::new();
        env.set("STORYBOT_PORT", "not-a-port").unset("PORT");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn gateway_overrides() {
        let mut env = EnvScope::new();
        env.unset("STORYBOT_PORT")
            .set("PORT", "9443")
            .set("STORYBOT_HOST", "0.0.0.0")
            .set("STORYBOT_BOT_PATH", "/tg");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.gateway.port, 9443);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.bot_path, "/tg");
    }
}
