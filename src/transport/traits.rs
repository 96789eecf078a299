use super::outbound::{ChatAction, Outbound};
use crate::error::TransportError;
use crate::sessions::ChatId;
use crate::story::GeoPoint;
use std::future::Future;
use std::pin::Pin;

pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// A message received from a chat, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat: ChatId,
    pub text: String,
    pub location: Option<GeoPoint>,
    /// The sender's client language, used for chats without a language yet.
    pub language_hint: Option<String>,
}

impl IncomingMessage {
    pub fn text(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
            location: None,
            language_hint: None,
        }
    }

    pub fn location(chat: ChatId, lat: f64, lon: f64) -> Self {
        Self {
            chat,
            text: String::new(),
            location: Some(GeoPoint::new(lat, lon)),
            language_hint: None,
        }
    }

    pub fn with_language_hint(mut self, language: impl Into<String>) -> Self {
        self.language_hint = Some(language.into());
        self
    }

    /// What the story matches against: the text, or `"<lat>,<lon>"` with six
    /// decimals when a location is attached.
    pub fn story_input(&self) -> String {
        match self.location {
            Some(point) => format!("{:.6},{:.6}", point.lat, point.lon),
            None => self.text.clone(),
        }
    }
}

/// A chat transport: sends story output and produces incoming messages.
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one message. A non-accepted request is an error.
    fn send<'a>(&'a self, outbound: &'a Outbound) -> ChannelFuture<'a, ()>;

    /// Show a transient status in the chat.
    fn send_chat_action<'a>(&'a self, _chat: ChatId, _action: ChatAction) -> ChannelFuture<'a, ()> {
        Box::pin(async move { Ok(()) })
    }

    /// Feed incoming messages into `tx` until the receiver is dropped.
    fn listen<'a>(
        &'a self,
        _tx: tokio::sync::mpsc::Sender<IncomingMessage>,
    ) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            Err(TransportError::Request {
                channel: self.name().to_string(),
                message: "listening not supported by this channel".into(),
            })
        })
    }
}
