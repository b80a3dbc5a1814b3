//! Client-side session handling for the SyncLab API: the access/refresh
//! token cookies, decode-only inspection of their claims, and the login,
//! logout and profile calls that keep them current.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;
#[cfg(test)]
mod tests;

pub use config::ClientConfig;
pub use db::{FileBackend, MemoryBackend, SessionBackend, StoreError, StoredCookie};
pub use models::auth::{LoginForm, ValidationError};
pub use models::jwt::{RoleClaim, SessionState, Subject, TokenKind, TokenPair, TokenPayload};
pub use services::auth_service::{AuthError, AuthService};
pub use services::session_service::SessionService;
pub use services::token_inspector::{DecodeError, TokenInspector};
pub use services::token_store::TokenStore;
pub use utils::clock::{Clock, ManualClock, SystemClock};
