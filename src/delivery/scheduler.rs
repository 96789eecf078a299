use crate::error::TransportError;
use crate::sessions::ChatId;
use crate::story::Response;
use crate::transport::{Channel, Outbound, RetryPolicy, deliver};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct PendingDelivery {
    id: u64,
    response: Response,
    fire_after: Instant,
    handle: Option<JoinHandle<()>>,
}

/// Snapshot of one queued delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSnapshot {
    pub id: u64,
    pub text: String,
    pub fire_after: Instant,
}

/// Per-chat FIFO of responses waiting for their delay to elapse.
///
/// Each entry owns a timer task. A timer that fires removes its entry before
/// sending; [`fire_next`](Self::fire_next) takes the oldest entry, aborts its
/// timer and sends it right away, so every entry is delivered exactly once.
///
/// A due timer holds its chat's send lock until the transport accepts the
/// message. `fire_next` takes the same lock first, so a turn never starts
/// while a delayed reply of that chat is still being retried.
pub struct DeliveryScheduler {
    channel: Arc<dyn Channel>,
    retry: RetryPolicy,
    queues: Mutex<HashMap<ChatId, VecDeque<PendingDelivery>>>,
    send_locks: Mutex<HashMap<ChatId, Arc<tokio::sync::Mutex<()>>>>,
    next_id: AtomicU64,
}

impl DeliveryScheduler {
    pub fn new(channel: Arc<dyn Channel>, retry: RetryPolicy) -> Self {
        Self {
            channel,
            retry,
            queues: Mutex::new(HashMap::new()),
            send_locks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    /// Queue `response` for `chat`, to be sent once `delay` has elapsed.
    pub fn schedule(self: &Arc<Self>, chat: ChatId, response: Response, delay: Duration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fire_after = Instant::now() + delay;

        {
            let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
            queues.entry(chat).or_default().push_back(PendingDelivery {
                id,
                response,
                fire_after,
                handle: None,
            });
        }
        tracing::debug!(chat_id = %chat, id, delay_ms = delay.as_millis(), "delivery scheduled");

        let scheduler = Arc::clone(self);
        let task_handle = tokio::spawn(async move {
            tokio::time::sleep_until(fire_after).await;
            let lock = scheduler.send_lock(chat);
            let _sending = lock.lock().await;
            if let Some(response) = scheduler.take(chat, id) {
                tracing::debug!(chat_id = %chat, id, "delayed delivery due");
                scheduler.send_logged(chat, &response).await;
            }
        });

        {
            let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = queues
                .get_mut(&chat)
                .and_then(|queue| queue.iter_mut().find(|entry| entry.id == id))
            {
                entry.handle = Some(task_handle);
            }
        }

        id
    }

    /// Send the oldest pending delivery of `chat` now. Returns whether there
    /// was one; younger entries keep their own timers.
    ///
    /// Waits for a delayed reply of `chat` that is already being sent.
    pub async fn fire_next(&self, chat: ChatId) -> bool {
        let lock = self.send_lock(chat);
        let _sending = lock.lock().await;
        let next = {
            let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
            let next = queues.get_mut(&chat).and_then(VecDeque::pop_front);
            if queues.get(&chat).is_some_and(VecDeque::is_empty) {
                queues.remove(&chat);
            }
            next
        };

        let Some(entry) = next else {
            return false;
        };
        if let Some(handle) = entry.handle {
            handle.abort();
        }
        tracing::debug!(chat_id = %chat, id = entry.id, "pending delivery fired early");
        self.send_logged(chat, &entry.response).await;
        true
    }

    /// Send immediately through the retrying transport.
    pub async fn send_now(&self, chat: ChatId, response: &Response) -> Result<u32, TransportError> {
        let outbound = Outbound::from_response(chat, response.text());
        deliver(self.channel.as_ref(), &outbound, self.retry).await
    }

    pub fn pending(&self, chat: ChatId) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat)
            .map_or(0, VecDeque::len)
    }

    pub fn pending_snapshot(&self, chat: ChatId) -> Vec<PendingSnapshot> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat)
            .map(|queue| {
                queue
                    .iter()
                    .map(|entry| PendingSnapshot {
                        id: entry.id,
                        text: entry.response.text().to_string(),
                        fire_after: entry.fire_after,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Abort every timer. Pending responses are dropped.
    pub fn shutdown(&self) -> usize {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dropped = 0;
        for (_, queue) in queues.drain() {
            for entry in queue {
                if let Some(handle) = entry.handle {
                    handle.abort();
                }
                dropped += 1;
            }
        }
        dropped
    }

    fn send_lock(&self, chat: ChatId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.send_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(chat).or_default())
    }

    fn take(&self, chat: ChatId, id: u64) -> Option<Response> {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = queues.get_mut(&chat)?;
        let index = queue.iter().position(|entry| entry.id == id)?;
        let entry = queue.remove(index)?;
        if queue.is_empty() {
            queues.remove(&chat);
        }
        Some(entry.response)
    }

    async fn send_logged(&self, chat: ChatId, response: &Response) {
        if let Err(error) = self.send_now(chat, response).await {
            tracing::error!(chat_id = %chat, %error, "delivery dropped");
        }
    }
}

impl Drop for DeliveryScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
