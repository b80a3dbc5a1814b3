use cookie::{Cookie, SameSite};
use http::{HeaderMap, header::SET_COOKIE};
use time::Duration;

use crate::models::jwt::TokenKind;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
const SECURE: bool = true;
const SAME_SITE: SameSite = SameSite::None;
const ACCESS_MAX_AGE: Duration = Duration::days(1);
const REFRESH_MAX_AGE: Duration = Duration::days(7);

pub struct CookieService;

impl CookieService {
    pub fn cookie_name(kind: TokenKind) -> &'static str {
        match kind {
            TokenKind::Access => ACCESS_TOKEN_COOKIE,
            TokenKind::Refresh => REFRESH_TOKEN_COOKIE,
        }
    }

    pub fn max_age(kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => ACCESS_MAX_AGE,
            TokenKind::Refresh => REFRESH_MAX_AGE,
        }
    }

    /// The session cookie for `kind`, with the attributes the jar persists.
    pub fn auth_cookie(kind: TokenKind, token: &str) -> Cookie<'static> {
        Cookie::build((Self::cookie_name(kind), token.to_string()))
            .path("/")
            .max_age(Self::max_age(kind))
            .secure(SECURE)
            .same_site(SAME_SITE)
            .build()
    }

    /// Value of a cookie-style token field: the text after the first `=` and
    /// before the first `;`. A field without `=` is the bare token.
    pub fn extract_token_value(raw: &str) -> Option<String> {
        let pair = raw.split(';').next()?.trim();
        let value = match pair.split_once('=') {
            Some(_) => Cookie::parse(pair).ok()?.value().to_string(),
            None => pair.to_string(),
        };
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }

    /// Token for `kind` from the `Set-Cookie` headers of a response.
    pub fn extract_from_set_cookie(headers: &HeaderMap, kind: TokenKind) -> Option<String> {
        let name = Self::cookie_name(kind);
        headers
            .get_all(SET_COOKIE)
            .iter()
            .find_map(|header| {
                let raw = header.to_str().ok()?;
                Cookie::parse(raw)
                    .ok()
                    .filter(|c| c.name() == name && !c.value().is_empty())
                    .map(|c| c.value().to_string())
            })
    }
}
