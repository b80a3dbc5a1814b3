use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

use super::{SessionBackend, StoreError, StoredCookie};

type Jar = BTreeMap<String, StoredCookie>;

/// Cookie jar kept as a JSON file so a session outlives the process.
///
/// Every mutation rewrites the whole file; concurrent writers from different
/// processes race and the last one wins.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Using file-backed session storage");
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Jar, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Jar::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                error!(error = %e, path = %self.path.display(), "Failed to parse session file");
                StoreError::from(e)
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Jar::new()),
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "Failed to read session file");
                Err(e.into())
            }
        }
    }

    fn save(&self, jar: &Jar) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(jar)?;
        if let Err(e) = fs::write(&self.path, bytes) {
            error!(error = %e, path = %self.path.display(), "Failed to write session file");
            return Err(e.into());
        }
        Ok(())
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<StoredCookie>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    #[instrument(skip(self, cookie))]
    fn set(&self, key: &str, cookie: StoredCookie) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut jar = self.load()?;
        jar.insert(key.to_string(), cookie);
        self.save(&jar)?;
        debug!("cookie persisted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut jar = self.load()?;
        if jar.remove(key).is_some() {
            self.save(&jar)?;
            debug!("cookie removed from session file");
        }
        Ok(())
    }
}
