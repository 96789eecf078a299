use super::SaveStore;
use crate::error::StoreError;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes every saved text to its own file inside `dir`.
///
/// File names are `review-<UTC timestamp>-<uuid>.txt`; the directory must
/// already exist.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
        self.dir
            .join(format!("review-{stamp}-{}.txt", Uuid::new_v4().simple()))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            target: self.dir.display().to_string(),
            source,
        }
    }
}

impl SaveStore for FileStore {
    fn save(&self, text: &str) -> Result<(), StoreError> {
        let path = self.next_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "saved message");
        Ok(())
    }

    fn target(&self) -> String {
        self.dir.display().to_string()
    }
}
