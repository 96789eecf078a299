use crate::config::StoryConfig;
use crate::error::StoryError;
use crate::story::Story;
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

/// What `storybot check` reports about a loaded story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySummary {
    pub path: PathBuf,
    pub steps: usize,
    pub commands: Vec<String>,
    pub unordered: Vec<String>,
    pub languages: Vec<String>,
}

impl StorySummary {
    pub fn of(path: PathBuf, story: &Story) -> Self {
        Self {
            path,
            steps: story.len(),
            commands: story.command_names().into_iter().map(str::to_string).collect(),
            unordered: story.unordered_keys().into_iter().map(str::to_string).collect(),
            languages: story.i18n().languages().into_iter().map(str::to_string).collect(),
        }
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".into()
    } else {
        items.join(", ")
    }
}

impl fmt::Display for StorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Story:      {}", self.path.display())?;
        writeln!(f, "Steps:      {}", self.steps)?;
        writeln!(f, "Commands:   {}", list(&self.commands))?;
        writeln!(f, "Unordered:  {}", list(&self.unordered))?;
        write!(f, "Languages:  en (default), {}", list(&self.languages))
    }
}

/// Load the configured story and translations and validate them.
pub fn check_story(config: &StoryConfig) -> Result<StorySummary> {
    let source = config.source();
    let story = source
        .load()
        .with_context(|| format!("Failed to load story {}", source.story_path.display()))?;
    anyhow::ensure!(!story.is_empty(), StoryError::EmptyStory);
    story.validate().context("Story is not usable")?;
    Ok(StorySummary::of(source.story_path, &story))
}
