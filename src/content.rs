//! File-backed store of canned replies.
//!
//! One UTF-8 text file per topic (plus `welcome.txt`), read on every call so
//! edits show up without a restart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::error::ContentError;

/// Well-known content file names.
pub mod files {
    pub const WELCOME: &str = "welcome.txt";
}

/// Directory of canned replies.
#[derive(Debug, Clone)]
pub struct ContentStore {
    base_path: PathBuf,
}

impl ContentStore {
    /// Create a store rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a content file name to an absolute path.
    pub fn resolve_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Read a content file, trimmed. Markup is left as written.
    pub async fn read(&self, name: &str) -> Result<String, ContentError> {
        let full_path = self.resolve_path(name);
        match fs::read_to_string(&full_path).await {
            Ok(raw) => Ok(raw.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ContentError::NotFound(name.to_string()))
            }
            Err(e) => Err(ContentError::Io(e)),
        }
    }

    /// Like [`read`](Self::read), but a failure becomes a visible error string.
    pub async fn load(&self, name: &str) -> String {
        match self.read(name).await {
            Ok(content) => content,
            Err(ContentError::NotFound(_)) => {
                warn!(file = %name, dir = %self.base_path.display(), "Message file not found");
                format!("Error: Message file '{name}' not found.")
            }
            Err(e) => {
                warn!(file = %name, error = %e, "Message file could not be read");
                format!("Error: Message file '{name}' could not be read.")
            }
        }
    }

    /// Which of `names` are missing from the store.
    pub async fn missing(&self, names: &[&str]) -> Vec<String> {
        let mut missing = Vec::new();
        for name in names {
            if fs::metadata(self.resolve_path(name)).await.is_err() {
                missing.push((*name).to_string());
            }
        }
        missing
    }
}
