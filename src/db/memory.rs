use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{SessionBackend, StoreError, StoredCookie};

/// Process-local cookie jar. Clones share the same jar.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    cookies: Arc<RwLock<HashMap<String, StoredCookie>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<StoredCookie>, StoreError> {
        Ok(self.cookies.read().get(key).cloned())
    }

    #[instrument(skip(self, cookie))]
    fn set(&self, key: &str, cookie: StoredCookie) -> Result<(), StoreError> {
        self.cookies.write().insert(key.to_string(), cookie);
        debug!("cookie stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.cookies.write().remove(key).is_some() {
            debug!("cookie removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(value: &str) -> StoredCookie {
        StoredCookie {
            value: value.to_string(),
            expires_at: None,
        }
    }

    #[test]
    fn clones_share_the_jar_and_writes_replace() {
        let jar = MemoryBackend::new();
        let other = jar.clone();

        jar.set("access_token", cookie("one")).unwrap();
        other.set("access_token", cookie("two")).unwrap();

        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("access_token").unwrap(), Some(cookie("two")));
    }

    #[test]
    fn delete_is_idempotent() {
        let jar = MemoryBackend::new();
        jar.delete("refresh_token").unwrap();
        jar.set("refresh_token", cookie("r")).unwrap();
        jar.delete("refresh_token").unwrap();
        jar.delete("refresh_token").unwrap();
        assert!(jar.is_empty());
    }
}
