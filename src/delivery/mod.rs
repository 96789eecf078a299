//! Session delivery: per-message handling and delayed responses.

pub mod handler;
pub mod scheduler;

pub use handler::{DEFAULT_RESET_COMMAND, HandleOutcome, StoryHandler};
pub use scheduler::{DeliveryScheduler, PendingSnapshot};
