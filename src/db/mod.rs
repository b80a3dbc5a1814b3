use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub mod file;
pub mod memory;
pub use file::FileBackend;
pub use memory::MemoryBackend;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A cookie as the jar keeps it: its value and when it stops being sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl StoredCookie {
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Persistence medium behind the token store. Writing a key replaces its value.
pub trait SessionBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<StoredCookie>, StoreError>;
    fn set(&self, key: &str, cookie: StoredCookie) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
