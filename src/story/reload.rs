use super::engine::Story;
use super::loader::load_story_with_i18n;
use crate::error::StoryError;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a reloadable story comes from.
#[derive(Debug, Clone)]
pub struct StorySource {
    pub story_path: PathBuf,
    pub i18n_path: Option<PathBuf>,
}

impl StorySource {
    pub fn load(&self) -> Result<Story, StoryError> {
        load_story_with_i18n(&self.story_path, self.i18n_path.as_deref())
    }
}

/// Live-swappable story shared by every in-flight request.
///
/// Readers take a snapshot and keep it for the whole message, so a reload
/// never changes the story under a half-handled request.
#[derive(Clone)]
pub struct StoryHandle {
    inner: Arc<ArcSwap<Story>>,
    source: Option<StorySource>,
}

impl StoryHandle {
    pub fn new(story: Story) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(story)),
            source: None,
        }
    }

    /// Load from disk and remember the paths for [`reload`](Self::reload).
    pub fn from_source(source: StorySource) -> Result<Self, StoryError> {
        let story = source.load()?;
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(story)),
            source: Some(source),
        })
    }

    pub fn load_full(&self) -> Arc<Story> {
        self.inner.load_full()
    }

    pub fn store(&self, story: Story) {
        self.inner.store(Arc::new(story));
    }

    pub fn source(&self) -> Option<&StorySource> {
        self.source.as_ref()
    }

    /// Re-read story and translations, swapping them in together.
    ///
    /// On error, including a story without ordered steps, the current story
    /// stays active. A handle built from an in-memory story has nothing to
    /// reload and returns `Ok(false)`.
    pub fn reload(&self) -> Result<bool, StoryError> {
        let Some(source) = &self.source else {
            return Ok(false);
        };
        let story = source.load()?;
        if story.is_empty() {
            return Err(StoryError::EmptyStory);
        }
        story.validate()?;
        let steps = story.len();
        self.inner.store(Arc::new(story));
        tracing::info!(path = %source.story_path.display(), steps, "story hot-reloaded");
        Ok(true)
    }
}

impl From<Story> for StoryHandle {
    fn from(story: Story) -> Self {
        Self::new(story)
    }
}
