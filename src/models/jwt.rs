// src/models/jwt.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Which of the two session tokens is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(format!("unknown token kind `{other}` (expected access or refresh)")),
        }
    }
}

/// Token values handed out by the auth service on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Subject identifier carried in `sub` or `id`; the auth service emits both
/// numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Number(i64),
    Text(String),
}

impl Subject {
    fn from_claim(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Subject::Text(s.clone())),
            Value::Number(n) => Some(
                n.as_i64()
                    .map(Subject::Number)
                    .unwrap_or_else(|| Subject::Text(n.to_string())),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Number(n) => write!(f, "{n}"),
            Subject::Text(s) => f.write_str(s),
        }
    }
}

/// Role information as found in the token: a single `role` string or a list
/// taken from `role`, `roles` or `authorities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RoleClaim {
    Single(String),
    Many(Vec<String>),
}

impl RoleClaim {
    fn from_claim(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(RoleClaim::Single(s.clone())),
            Value::Array(items) => {
                let roles: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                (!roles.is_empty()).then_some(RoleClaim::Many(roles))
            }
            _ => None,
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        match self {
            RoleClaim::Single(r) => r.eq_ignore_ascii_case(role),
            RoleClaim::Many(rs) => rs.iter().any(|r| r.eq_ignore_ascii_case(role)),
        }
    }
}

impl fmt::Display for RoleClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleClaim::Single(r) => f.write_str(r),
            RoleClaim::Many(rs) => f.write_str(&rs.join(",")),
        }
    }
}

/// Decoded (never verified) claims of a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

impl TokenPayload {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Expiry in Unix seconds. Only JSON numbers count.
    pub fn exp(&self) -> Option<f64> {
        self.claims.get("exp").and_then(Value::as_f64)
    }

    /// `sub` wins over `id` when both are usable.
    pub fn subject(&self) -> Option<Subject> {
        ["sub", "id"]
            .iter()
            .find_map(|name| self.claims.get(*name).and_then(Subject::from_claim))
    }

    /// First usable of `role`, `roles`, `authorities`.
    pub fn role(&self) -> Option<RoleClaim> {
        ["role", "roles", "authorities"]
            .iter()
            .find_map(|name| self.claims.get(*name).and_then(RoleClaim::from_claim))
    }
}

/// Snapshot derived from the current access token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub subject: Option<Subject>,
    pub role: Option<RoleClaim>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            subject: None,
            role: None,
        }
    }
}
