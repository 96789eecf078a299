use crate::delivery::DEFAULT_RESET_COMMAND;
use crate::story::StorySource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConfig {
    /// Story definition (JSON array of steps)
    #[serde(default = "default_story_path")]
    pub path: PathBuf,
    /// Translation table (JSON: language -> original -> translated)
    #[serde(default)]
    pub i18n_path: Option<PathBuf>,
    /// Message that restarts a chat's story; empty disables it
    #[serde(default = "default_reset_command")]
    pub reset_command: String,
}

fn default_story_path() -> PathBuf {
    PathBuf::from("story.json")
}

fn default_reset_command() -> String {
    DEFAULT_RESET_COMMAND.into()
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            path: default_story_path(),
            i18n_path: None,
            reset_command: default_reset_command(),
        }
    }
}

impl StoryConfig {
    pub fn source(&self) -> StorySource {
        StorySource {
            story_path: self.path.clone(),
            i18n_path: self.i18n_path.clone(),
        }
    }

    pub fn reset_command(&self) -> Option<String> {
        let command = self.reset_command.trim();
        (!command.is_empty()).then(|| command.to_string())
    }
}
