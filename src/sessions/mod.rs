pub mod store;
pub mod types;

pub use store::{InMemorySessionStore, SessionStore, SharedSession};
pub use types::{ChatId, Session};
