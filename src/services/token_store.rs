use cookie::Cookie;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::{SessionBackend, StoreError, StoredCookie};
use crate::models::jwt::TokenKind;
use crate::services::cookie_service::CookieService;
use crate::utils::clock::Clock;

/// Reads and writes the two session token cookies.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn SessionBackend>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn SessionBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Stored token of `kind`. A cookie past its max-age reads as absent.
    pub fn get(&self, kind: TokenKind) -> Result<Option<String>, StoreError> {
        let Some(cookie) = self.backend.get(CookieService::cookie_name(kind))? else {
            return Ok(None);
        };
        if !cookie.is_live(self.clock.now()) {
            debug!(%kind, "token cookie past max-age");
            return Ok(None);
        }
        Ok(Some(cookie.value).filter(|v| !v.is_empty()))
    }

    /// Writes `token`, replacing any previous value, and returns the cookie
    /// as it would be sent to the browser.
    #[instrument(skip(self, token))]
    pub fn set(&self, kind: TokenKind, token: &str) -> Result<Cookie<'static>, StoreError> {
        let cookie = CookieService::auth_cookie(kind, token);
        let expires_at = cookie.max_age().map(|age| self.clock.now() + age);
        self.backend.set(
            cookie.name(),
            StoredCookie {
                value: cookie.value().to_string(),
                expires_at,
            },
        )?;
        debug!("token cookie written");
        Ok(cookie)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, kind: TokenKind) -> Result<(), StoreError> {
        self.backend.delete(CookieService::cookie_name(kind))
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        for kind in TokenKind::ALL {
            self.delete(kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use crate::utils::clock::ManualClock;
    use time::{Duration, OffsetDateTime};

    fn store() -> (TokenStore, MemoryBackend, Arc<ManualClock>) {
        let backend = MemoryBackend::new();
        let clock = Arc::new(ManualClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let store = TokenStore::new(Arc::new(backend.clone()), clock.clone());
        (store, backend, clock)
    }

    #[test]
    fn kinds_are_stored_independently() {
        let (store, _, _) = store();
        store.set(TokenKind::Access, "acc").unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("acc"));
        assert_eq!(store.get(TokenKind::Refresh).unwrap(), None);

        store.set(TokenKind::Access, "acc2").unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("acc2"));
    }

    #[test]
    fn cookie_max_age_is_honoured() {
        let (store, _, clock) = store();
        store.set(TokenKind::Access, "acc").unwrap();
        store.set(TokenKind::Refresh, "ref").unwrap();

        clock.advance(Duration::days(1));
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
        assert_eq!(store.get(TokenKind::Refresh).unwrap().as_deref(), Some("ref"));

        clock.advance(Duration::days(6));
        assert_eq!(store.get(TokenKind::Refresh).unwrap(), None);
    }

    #[test]
    fn clear_all_empties_the_jar() {
        let (store, backend, _) = store();
        store.clear_all().unwrap();
        store.set(TokenKind::Access, "acc").unwrap();
        store.set(TokenKind::Refresh, "ref").unwrap();
        store.clear_all().unwrap();
        assert!(backend.is_empty());
    }
}
