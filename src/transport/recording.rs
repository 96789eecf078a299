use super::outbound::{ChatAction, Outbound};
use super::traits::{Channel, ChannelFuture};
use crate::error::TransportError;
use crate::sessions::ChatId;
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// In-memory channel that records everything sent through it.
///
/// Can be told to reject a number of upcoming sends.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(Outbound, Instant)>>,
    actions: Mutex<Vec<(ChatId, ChatAction)>>,
    failures: Mutex<u32>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` sends.
    pub fn fail_next(&self, count: u32) {
        *self.failures.lock().unwrap_or_else(PoisonError::into_inner) = count;
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(outbound, _)| outbound.clone())
            .collect()
    }

    /// Sent messages with the (tokio) instant each was accepted.
    pub fn sent_at(&self) -> Vec<(Outbound, Instant)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text payloads delivered to `chat`, in order. Media yields its URL.
    pub fn texts(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|outbound| outbound.chat() == chat)
            .map(|outbound| match outbound {
                Outbound::Text { text, .. } => text,
                Outbound::Audio { url, .. } | Outbound::Photo { url, .. } => url,
            })
            .collect()
    }

    pub fn actions(&self) -> Vec<(ChatId, ChatAction)> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(&'a self, outbound: &'a Outbound) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            {
                let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
                if *failures > 0 {
                    *failures -= 1;
                    return Err(TransportError::Rejected {
                        channel: self.name().to_string(),
                        method: outbound.endpoint().to_string(),
                        status: 502,
                        body: "injected failure".into(),
                    });
                }
            }
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((outbound.clone(), Instant::now()));
            Ok(())
        })
    }

    fn send_chat_action<'a>(&'a self, chat: ChatId, action: ChatAction) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            self.actions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((chat, action));
            Ok(())
        })
    }
}
