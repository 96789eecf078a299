use super::outbound::Outbound;
use super::traits::Channel;
use crate::error::TransportError;
use std::time::Duration;

/// How hard to push a message through a flaky transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub delay: Duration,
    /// `None` keeps trying until the transport accepts.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }
}

/// Send `outbound`, announcing media with a chat action first.
///
/// The chat action is best effort. The message itself is retried per
/// `policy`; only the first failure of a message is logged.
pub async fn deliver(
    channel: &dyn Channel,
    outbound: &Outbound,
    policy: RetryPolicy,
) -> Result<u32, TransportError> {
    let chat = outbound.chat();

    if let Some(action) = outbound.chat_action()
        && let Err(error) = channel.send_chat_action(chat, action).await
    {
        tracing::debug!(chat_id = %chat, %action, %error, "chat action failed");
    }

    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        match channel.send(outbound).await {
            Ok(()) => {
                if attempts > 1 {
                    tracing::info!(
                        chat_id = %chat,
                        channel = channel.name(),
                        method = outbound.endpoint(),
                        attempts,
                        "delivery recovered"
                    );
                }
                return Ok(attempts);
            }
            Err(error) => {
                if attempts == 1 {
                    tracing::warn!(
                        chat_id = %chat,
                        channel = channel.name(),
                        method = outbound.endpoint(),
                        %error,
                        "delivery failed, retrying"
                    );
                }
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(TransportError::GaveUp {
                        attempts,
                        last: error.to_string(),
                    });
                }
            }
        }
        tokio::time::sleep(policy.delay).await;
    }
}
