use super::scheduler::DeliveryScheduler;
use crate::error::BotError;
use crate::sessions::{InMemorySessionStore, SessionStore};
use crate::story::{Story, StoryHandle};
use crate::transport::{Channel, IncomingMessage, RetryPolicy};
use std::sync::Arc;

/// Command that restarts a chat's story from the first step.
pub const DEFAULT_RESET_COMMAND: &str = "/start";

/// What [`StoryHandler::handle`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A delayed response was pending; it went out now and the message
    /// itself was not resolved.
    FiredPending,
    Delivered {
        sent: usize,
        scheduled: usize,
        advanced: bool,
        retranslated: bool,
    },
}

/// Per-message driver: session lookup, story resolution and delivery.
#[derive(Clone)]
pub struct StoryHandler {
    story: StoryHandle,
    sessions: Arc<dyn SessionStore>,
    scheduler: Arc<DeliveryScheduler>,
    reset_command: Option<String>,
}

impl StoryHandler {
    pub fn new(
        story: StoryHandle,
        sessions: Arc<dyn SessionStore>,
        scheduler: Arc<DeliveryScheduler>,
    ) -> Self {
        Self {
            story,
            sessions,
            scheduler,
            reset_command: Some(DEFAULT_RESET_COMMAND.to_string()),
        }
    }

    /// In-memory sessions and the default retry policy over `channel`.
    pub fn with_channel(story: impl Into<StoryHandle>, channel: Arc<dyn Channel>) -> Self {
        Self::new(
            story.into(),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(DeliveryScheduler::new(channel, RetryPolicy::default())),
        )
    }

    /// `None` disables resetting.
    pub fn with_reset_command(mut self, command: Option<String>) -> Self {
        self.reset_command = command.filter(|command| !command.is_empty());
        self
    }

    pub fn story(&self) -> &StoryHandle {
        &self.story
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn scheduler(&self) -> &Arc<DeliveryScheduler> {
        &self.scheduler
    }

    /// Handle one incoming message for its chat.
    ///
    /// Messages of the same chat are handled one at a time. Transport errors
    /// are logged per response and do not fail the call; only story
    /// configuration errors do.
    pub async fn handle(&self, message: IncomingMessage) -> Result<HandleOutcome, BotError> {
        let chat = message.chat;
        let shared = self.sessions.session(chat);
        let mut session = shared.lock().await;

        session.seed_language(message.language_hint.as_deref());
        if self
            .reset_command
            .as_deref()
            .is_some_and(|command| message.text == command)
        {
            tracing::debug!(chat_id = %chat, "story reset");
            session.reset_position();
        }

        if self.scheduler.fire_next(chat).await {
            return Ok(HandleOutcome::FiredPending);
        }

        let input = message.story_input();
        tracing::info!(chat_id = %chat, position = session.position, text = %input, "incoming message");

        let story: Arc<Story> = self.story.load_full();
        let resolution = story
            .resolve(session.position, &session.language, &input)
            .inspect_err(|error| {
                tracing::error!(chat_id = %chat, %error, "story cannot resolve message");
            })?;

        let retranslated = session.needs_retranslation(&resolution.language);
        let batch = if retranslated {
            story
                .i18n()
                .translate_all(&session.last_responses, &resolution.language)
        } else {
            resolution.responses.clone()
        };

        let mut sent = 0;
        let mut scheduled = 0;
        for response in &batch {
            if let Some(delay) = response.delay() {
                self.scheduler.schedule(chat, response.clone(), delay);
                scheduled += 1;
            } else {
                match self.scheduler.send_now(chat, response).await {
                    Ok(_) => sent += 1,
                    Err(error) => {
                        tracing::error!(chat_id = %chat, %error, "response dropped");
                    }
                }
            }
        }

        let position = session.position;
        session.apply(&resolution, batch, !retranslated);
        let advanced = session.position != position;
        tracing::debug!(
            chat_id = %chat,
            position = session.position,
            language = %session.language,
            advanced,
            retranslated,
            "turn recorded"
        );

        Ok(HandleOutcome::Delivered {
            sent,
            scheduled,
            advanced,
            retranslated,
        })
    }
}
