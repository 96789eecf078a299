//! Axum webhook gateway receiving Telegram updates, with body limits and
//! request timeouts.

mod handlers;
mod server;


pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::delivery::StoryHandler;
use std::sync::Arc;

/// Maximum request body size (64KB) -- prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) -- prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Header Telegram fills with the `secret_token` given to `setWebhook`.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub handler: StoryHandler,
    pub secret_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(handler: StoryHandler) -> Self {
        Self {
            handler,
            secret_token: None,
        }
    }

    pub fn with_secret_token(mut self, secret: Option<&str>) -> Self {
        self.secret_token = secret
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(Arc::from);
        self
    }
}
