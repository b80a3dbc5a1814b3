use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use synclab_session::{
    AuthError, AuthService, ClientConfig, FileBackend, LoginForm, SessionService, SystemClock,
    TokenInspector, TokenKind,
};

#[derive(Parser)]
#[command(name = "synclab", version, about = "Sign in to SyncLab and inspect the stored session")]
struct Cli {
    /// Base URL of the SyncLab API (overrides API_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Where the session cookies are kept (overrides SESSION_FILE)
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out on the server and clear the stored tokens
    Logout,
    /// Print whether the stored session is logged in, and as whom
    Status,
    /// Fetch the profile of the logged-in person
    Whoami,
    /// Print the decoded claims of a stored token
    Token {
        #[arg(default_value = "access")]
        kind: TokenKind,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "synclab_session=info,synclab=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false);
    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    init_tracing();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }

    let backend = Arc::new(FileBackend::new(config.session_file.clone()));
    let session = SessionService::new(backend, Arc::new(SystemClock));

    match cli.command {
        Command::Login { email, password } => {
            let auth = AuthService::new(&config, session)?;
            let state = auth
                .login(&LoginForm::new(email, password))
                .await
                .context("login failed")?;
            println!("Logged in");
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Logout => {
            let auth = AuthService::new(&config, session)?;
            auth.logout().await.context("logout failed, try again")?;
            println!("Logged out");
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&session.state())?);
        }
        Command::Whoami => {
            let auth = AuthService::new(&config, session)?;
            match auth.current_profile().await {
                Ok(profile) => {
                    println!("{}", profile.name);
                    println!("{}", profile.email);
                    println!("{}", profile.image);
                }
                Err(e @ (AuthError::SessionExpired | AuthError::NotAuthenticated)) => {
                    anyhow::bail!("{e}; run `synclab login` first");
                }
                Err(e) => return Err(e).context("failed to load user"),
            }
        }
        Command::Token { kind } => {
            let payload = session
                .current_payload(kind)
                .with_context(|| format!("no readable {kind} token stored"))?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            let expired = session.inspector().is_payload_expired(&payload);
            match TokenInspector::expires_at(&payload) {
                Some(at) => println!("expires at {at} ({})", if expired { "expired" } else { "valid" }),
                None => println!("no usable exp claim (treated as expired)"),
            }
        }
    }

    Ok(())
}
