use super::SaveStore;
use crate::error::StoreError;
use std::sync::Mutex;

/// Keeps saved texts in memory. Useful for tests and dry runs; it can be
/// switched to reject every save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Reject all further saves with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self
            .failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(reason.into());
    }
}

impl SaveStore for MemoryStore {
    fn save(&self, text: &str) -> Result<(), StoreError> {
        if let Some(reason) = self
            .failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
        {
            return Err(StoreError::Rejected(reason));
        }
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }

    fn target(&self) -> String {
        "memory".into()
    }
}
