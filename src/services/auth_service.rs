use http::{HeaderMap, StatusCode};
use reqwest::{Client, ClientBuilder, Response};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::ClientConfig;
use crate::db::StoreError;
use crate::models::auth::{ErrorBody, LoginForm, LoginRequest, LoginResponse, ValidationError};
use crate::models::jwt::{SessionState, Subject, TokenKind, TokenPair};
use crate::models::person::{Person, ProfileSummary};
use crate::services::cookie_service::CookieService;
use crate::services::session_service::SessionService;

const USER_AGENT: &str = concat!("synclab-session/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unexpected response body: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("login response carried no usable tokens")]
    MissingTokens,
    #[error("not logged in")]
    NotAuthenticated,
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::InvalidCredentials(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// The service refused the credentials the session presented.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_) | Self::Forbidden(_))
    }
}

/// Login, logout and profile calls against the SyncLab API, keeping the
/// local session in step.
#[derive(Clone)]
pub struct AuthService {
    client: Client,
    base_url: String,
    session: SessionService,
}

impl AuthService {
    pub fn new(config: &ClientConfig, session: SessionService) -> Result<Self, AuthError> {
        let base_url = config.api_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AuthError::Configuration("API_URL is empty".into()));
        }

        let mut builder = ClientBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Passes 2xx responses through; turns anything else into an error
    /// carrying the service's `erro`/`message` text.
    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP failure: {}", status.as_u16()));
        Err(AuthError::from_status(status, message))
    }

    fn token_pair(body: LoginResponse, headers: &HeaderMap) -> Option<TokenPair> {
        let raw = body.token.unwrap_or_default();
        let pick = |field: Option<String>, kind: TokenKind| {
            field
                .as_deref()
                .and_then(CookieService::extract_token_value)
                .or_else(|| CookieService::extract_from_set_cookie(headers, kind))
        };
        Some(TokenPair {
            access_token: pick(raw.access_token, TokenKind::Access)?,
            refresh_token: pick(raw.refresh_token, TokenKind::Refresh)?,
        })
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<SessionState, AuthError> {
        form.validate()?;

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest::from(form))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let headers = response.headers().clone();
        let text = response.text().await?;
        let body: LoginResponse = if text.trim().is_empty() {
            LoginResponse::default()
        } else {
            serde_json::from_str(&text)?
        };

        let pair = Self::token_pair(body, &headers).ok_or(AuthError::MissingTokens)?;
        self.session.store_tokens(&pair)?;

        let state = self.session.state();
        if !state.logged_in {
            warn!("auth service issued an access token that is already expired or unreadable");
        }
        info!(subject = ?state.subject, "login succeeded");
        Ok(state)
    }

    /// Local tokens are cleared once the service acknowledged the logout, or
    /// rejected the session outright. Transport and server failures keep them.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .headers(self.session.build_auth_headers(HeaderMap::new()))
            .send()
            .await?;

        match Self::check(response).await {
            Ok(_) => {}
            Err(e) if e.is_rejection() => {
                warn!(error = %e, "auth service rejected the session; clearing it locally");
            }
            Err(e) => return Err(e),
        }
        self.session.logout()?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_person(&self, id: &Subject) -> Result<Person, AuthError> {
        let path = format!("/api/person/{}", urlencoding::encode(&id.to_string()));
        let response = self
            .client
            .get(self.url(&path))
            .headers(self.session.build_auth_headers(HeaderMap::new()))
            .send()
            .await?;

        match Self::check(response).await {
            Ok(response) => Ok(response.json::<Person>().await?),
            Err(e) if e.is_rejection() => {
                warn!(error = %e, "profile service rejected the session; logging out");
                self.session.logout()?;
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn current_person(&self) -> Result<Person, AuthError> {
        let subject = self.session.subject().ok_or(AuthError::NotAuthenticated)?;
        self.fetch_person(&subject).await
    }

    pub async fn current_profile(&self) -> Result<ProfileSummary, AuthError> {
        let person = self.current_person().await?;
        Ok(ProfileSummary::from(&person))
    }
}
