mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Persists free-form text a story step asks the user for.
///
/// Called synchronously while a message is resolved. Each successful call
/// writes a new record; calling twice with the same text stores it twice.
pub trait SaveStore: Send + Sync {
    fn save(&self, text: &str) -> Result<(), StoreError>;

    /// Human-readable destination, used in logs.
    fn target(&self) -> String;
}
