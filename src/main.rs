use clap::{Parser, Subcommand};
use linkvault::{ApiError, AuthClient, ClientConfig, ConfigError, Gateway, Route, Session};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not signed in; run `linkvault login` or set LINKVAULT_SESSION_TOKEN")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "linkvault", about = "LinkVault API session client")]
struct Cli {
    /// Overrides `LINKVAULT_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `LINKVAULT_SESSION_TOKEN`.
    #[arg(long)]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check backend health.
    Health,
    /// Show the signed-in user.
    Me,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LINKVAULT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LINKVAULT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // A missing .env is fine; flags and the process env still apply.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?.with_overrides(cli.api_url.as_deref(), cli.session_token)?;
    let auth = AuthClient::new(Gateway::new(&config)?);

    match cli.command {
        Command::Health => print_json(&auth.health().await?),
        Command::Me => run_me(auth).await,
        Command::Login { email, password } => {
            let session = resolved_session(auth).await;
            let user = session.login(&email, &password).await?;
            print_json(&user)?;
            print_session_token(&session);
            Ok(())
        }
        Command::Register { email, password, name } => {
            let session = resolved_session(auth).await;
            let user = session.register(&email, &password, name.as_deref()).await?;
            print_json(&user)?;
            print_session_token(&session);
            Ok(())
        }
        Command::Logout => {
            let session = resolved_session(auth).await;
            session.logout().await?;
            println!("ok");
            Ok(())
        }
    }
}

fn log_navigation(route: Route) {
    tracing::info!(%route, "navigate");
}

async fn resolved_session(auth: AuthClient) -> Session {
    let session = Session::start(auth, log_navigation);
    session.ready().await;
    session
}

async fn run_me(auth: AuthClient) -> Result<(), CliError> {
    let state = resolved_session(auth).await.state();
    match (state.user, state.check_error) {
        (Some(user), _) => print_json(&user),
        (None, Some(err)) => Err(err.into()),
        (None, None) => Err(CliError::NotSignedIn),
    }
}

fn print_session_token(session: &Session) {
    if let Some(user) = session.user() {
        eprintln!("signed in as {}", user.display_name());
    }
    if let Some(token) = session.auth().gateway().session_token() {
        eprintln!("LINKVAULT_SESSION_TOKEN={token}");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
