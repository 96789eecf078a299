use crate::transport::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Pause between send attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Give up after this many attempts; unset retries forever
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: None,
        }
    }
}

impl DeliveryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.max_attempts {
            Some(max) => RetryPolicy::bounded(delay, max),
            None => RetryPolicy::unbounded(delay),
        }
    }
}
