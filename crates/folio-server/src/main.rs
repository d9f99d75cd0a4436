//! `folio-server`: serves the contact API until Ctrl-C or SIGTERM.
//!
//! Settings come from `.env`, then `folio.toml` (override with `--config`),
//! then `FOLIO_*` variables. To produce a value for `admin_password_hash`:
//!
//! ```text
//! echo 'correct horse' | folio-server --hash-password
//! ```

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context as _, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, password_hash::SaltString};
use axum::http::HeaderValue;
use clap::Parser;
use folio_api::ApiState;
use folio_server::ServerConfig;
use folio_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(author, version, about = "Portfolio contact-form API server")]
struct Cli {
  /// TOML settings file; a missing file is not an error.
  #[arg(short, long, default_value = "folio.toml")]
  config: PathBuf,

  /// Read a password from stdin, print its argon2 hash and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();

  let cli = Cli::parse();
  if cli.hash_password {
    return print_password_hash();
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("cannot load settings from {}", cli.config.display()))?;
  serve(cfg).await
}

fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let client_origin = HeaderValue::from_str(&cfg.client_url)
    .with_context(|| format!("client_url {:?} is not a valid origin", cfg.client_url))?;

  let auth = cfg.admin_credential();
  if let Some(auth) = &auth {
    PasswordHash::new(&auth.password_hash)
      .map_err(|e| anyhow!("admin_password_hash is not a PHC string: {e}"))?;
  } else {
    tracing::warn!("admin credential not configured, admin routes will answer 401");
  }

  let db_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("cannot open contact store {}", db_path.display()))?;
  tracing::info!(path = %db_path.display(), "contact store opened");

  let state = ApiState {
    store:         Arc::new(store.clone()),
    auth:          auth.map(Arc::new),
    max_page_size: cfg.max_page_size,
  };
  let app = folio_server::router(state, client_origin)
    .into_make_service_with_connect_info::<SocketAddr>();

  let bind = (cfg.host.as_str(), cfg.port);
  let listener = tokio::net::TcpListener::bind(bind)
    .await
    .with_context(|| format!("cannot listen on {}:{}", cfg.host, cfg.port))?;
  let local = listener.local_addr()?;
  tracing::info!(addr = %local, environment = %cfg.environment, "folio-server listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server failed")?;

  store.close().await.context("cannot close contact store")?;
  tracing::info!("contact store closed");
  Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
  let interrupt = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::warn!(error = %e, "cannot listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::warn!(error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = interrupt => {}
    () = terminate => {}
  }
  tracing::info!("shutting down");
}

fn print_password_hash() -> anyhow::Result<()> {
  let mut input = String::new();
  std::io::stdin()
    .read_line(&mut input)
    .context("cannot read password from stdin")?;
  let password = input.trim_end_matches(['\r', '\n']);
  if password.is_empty() {
    return Err(anyhow!("empty password"));
  }

  let salt = SaltString::generate(&mut OsRng);
  let phc = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow!("cannot hash password: {e}"))?;
  println!("{phc}");
  Ok(())
}
