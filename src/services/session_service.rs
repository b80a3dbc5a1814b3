use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::db::{SessionBackend, StoreError};
use crate::models::jwt::{RoleClaim, SessionState, Subject, TokenKind, TokenPair, TokenPayload};
use crate::services::token_inspector::TokenInspector;
use crate::services::token_store::TokenStore;
use crate::utils::clock::Clock;

/// Answers session questions from the stored tokens.
///
/// Nothing is cached: every call reads the jar and decodes the access token
/// again, so an expired token turns the session anonymous without a logout.
#[derive(Clone)]
pub struct SessionService {
    store: TokenStore,
    inspector: TokenInspector,
}

impl SessionService {
    pub fn new(backend: Arc<dyn SessionBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: TokenStore::new(backend, clock.clone()),
            inspector: TokenInspector::new(clock),
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn inspector(&self) -> &TokenInspector {
        &self.inspector
    }

    /// Stored token of `kind`. Storage failures read as "no token".
    pub fn token(&self, kind: TokenKind) -> Option<String> {
        match self.store.get(kind) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, %kind, "Failed to read token; treating session as anonymous");
                None
            }
        }
    }

    pub fn current_payload(&self, kind: TokenKind) -> Option<TokenPayload> {
        TokenInspector::payload(self.token(kind).as_deref())
    }

    fn live_access_payload(&self) -> Option<TokenPayload> {
        self.current_payload(TokenKind::Access)
            .filter(|payload| !self.inspector.is_payload_expired(payload))
    }

    /// Access token present and unexpired. The refresh token plays no part.
    pub fn is_logged_in(&self) -> bool {
        self.live_access_payload().is_some()
    }

    pub fn subject(&self) -> Option<Subject> {
        self.live_access_payload()?.subject()
    }

    pub fn role(&self) -> Option<RoleClaim> {
        self.live_access_payload()?.role()
    }

    pub fn state(&self) -> SessionState {
        match self.live_access_payload() {
            Some(payload) => SessionState {
                logged_in: true,
                subject: payload.subject(),
                role: payload.role(),
            },
            None => SessionState::anonymous(),
        }
    }

    /// `base` plus a single `Authorization: Bearer` entry when an access token
    /// is stored; `base` untouched otherwise.
    ///
    /// The token is attached even when it is expired or undecodable. Whether it
    /// is still good is for the service to decide, and a rejection forces a
    /// logout. Only after `logout()` is the header left out.
    pub fn build_auth_headers(&self, mut base: HeaderMap) -> HeaderMap {
        let Some(token) = self.token(TokenKind::Access) else {
            return base;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                base.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored access token is not a valid header value; sending without it"),
        }
        base
    }

    #[instrument(skip(self, pair))]
    pub fn store_tokens(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.store.set(TokenKind::Access, &pair.access_token)?;
        self.store.set(TokenKind::Refresh, &pair.refresh_token)?;
        info!("session tokens stored");
        Ok(())
    }

    /// Clears both tokens. Safe to call when already logged out.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear_all()?;
        info!("session cleared");
        Ok(())
    }
}
