use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::{AUTHORIZATION, SET_COOKIE}},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::sync::{Arc, Once};
use time::OffsetDateTime;
use tracing::{Level, info};
use tracing_subscriber::fmt::format::FmtSpan;

use crate::db::MemoryBackend;
use crate::models::jwt::TokenPair;
use crate::services::session_service::SessionService;
use crate::utils::clock::{ManualClock, SystemClock};

static INIT: Once = Once::new();

pub const NOW: i64 = 1_700_000_000;

/// Initialize logging exactly once
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_target(false)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::ERROR)
            .with_span_events(FmtSpan::NONE)
            .init();
    });
}

/// Signs `claims` the way the auth service would. The secret is irrelevant
/// to the client, which never verifies.
pub fn mint_token(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token encodes")
}

pub fn pair(access_token: impl Into<String>, refresh_token: impl Into<String>) -> TokenPair {
    TokenPair {
        access_token: access_token.into(),
        refresh_token: refresh_token.into(),
    }
}

/// Session over a fresh jar with a clock frozen at [`NOW`].
pub fn manual_session() -> (SessionService, MemoryBackend, Arc<ManualClock>) {
    init_tracing();
    let backend = MemoryBackend::new();
    let clock = Arc::new(ManualClock::new(
        OffsetDateTime::from_unix_timestamp(NOW).unwrap(),
    ));
    let session = SessionService::new(Arc::new(backend.clone()), clock.clone());
    (session, backend, clock)
}

pub fn system_session() -> SessionService {
    init_tracing();
    SessionService::new(Arc::new(MemoryBackend::new()), Arc::new(SystemClock))
}

pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// In-process stand-in for the SyncLab auth and profile endpoints.
#[derive(Clone)]
pub struct FakeAuthService {
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
    pub set_cookie_only: bool,
    pub logout_fails: bool,
    pub logout_rejects: bool,
}

impl FakeAuthService {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            email: "ana@pucminas.br".into(),
            password: "segredo123".into(),
            access_token,
            refresh_token,
            set_cookie_only: false,
            logout_fails: false,
            logout_rejects: false,
        }
    }
}

async fn login(State(service): State<FakeAuthService>, Json(body): Json<Value>) -> Response {
    let credential = &body["credential"];
    if credential["email"] != service.email.as_str()
        || credential["password"] != service.password.as_str()
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "erro": "Email ou senha incorreta" })),
        )
            .into_response();
    }

    let access = format!("access_token={}; Path=/; Max-Age=900; HttpOnly", service.access_token);
    let refresh = format!("refresh_token={}; Path=/; Max-Age=604800; HttpOnly", service.refresh_token);

    if service.set_cookie_only {
        return (
            StatusCode::OK,
            AppendHeaders([(SET_COOKIE, access), (SET_COOKIE, refresh)]),
        )
            .into_response();
    }

    Json(json!({ "token": { "access_token": access, "refresh_token": refresh } })).into_response()
}

async fn logout(State(service): State<FakeAuthService>) -> Response {
    if service.logout_rejects {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "erro": "Token inválido" })),
        )
            .into_response();
    }
    if service.logout_fails {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "logout unavailable" })),
        )
            .into_response();
    }
    Json(json!({})).into_response()
}

async fn person(
    State(service): State<FakeAuthService>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let expected = format!("Bearer {}", service.access_token);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "erro": "Token inválido" })),
        )
            .into_response();
    }

    Json(json!({
        "id": id,
        "name": "Ana Souza",
        "phoneNumber": "31999999999",
        "cpf": "000.000.000-00",
        "birthDate": "2001-04-02",
        "profileUrl": "https://cdn.synclab.app/ana.png",
        "description": "",
        "personCode": "P-42",
        "role": "STUDENT"
    }))
    .into_response()
}

/// Serves `service` on an ephemeral port and returns its base URL.
pub async fn spawn_fake_service(service: FakeAuthService) -> String {
    init_tracing();
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/api/person/:id", get(person))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    info!(%addr, "fake auth service listening");
    format!("http://{addr}")
}

/// Base URL nothing is listening on.
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
