//! goalkeepr server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), then `GOALKEEPR_*`
//! environment variables, then command-line overrides; opens the SQLite store
//! and serves the site over HTTP.

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use goalkeepr_store_sqlite::SqliteStore;
use goalkeepr_web::{AppState, Env, ServerConfig, auth};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser)]
#[command(author, version, about = "Goalkeepr goal tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Deployment environment.
  #[arg(long, value_enum)]
  env: Option<Env>,

  /// Port to listen on.
  #[arg(short, long)]
  port: Option<u16>,

  /// Database driver; only `sqlite` is supported.
  #[arg(long)]
  database_driver: Option<String>,

  /// Database location, e.g. `~/goalkeepr.db` or `:memory:`.
  #[arg(long)]
  database_dsn: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let config = load_config(&cli)?;
  init_tracing(config.env);

  // Pay for the decoy hash now rather than on the first unknown sign-in.
  auth::dummy_password()
    .await
    .context("failed to prepare password hashing")?;

  let store = open_store(&config.database_dsn).await?;
  let address = config.address();
  let env = config.env;

  let state = AppState::new(store, config).context("invalid configuration")?;
  let app = goalkeepr_web::router(state);

  tracing::info!(env = env.as_str(), "listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("GOALKEEPR"))
    .set_override_option("env", cli.env.map(|e| e.as_str()))?
    .set_override_option("port", cli.port.map(i64::from))?
    .set_override_option("database_driver", cli.database_driver.clone())?
    .set_override_option("database_dsn", cli.database_dsn.clone())?
    .build()
    .context("failed to read configuration")?;

  let config: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  config.validate().context("invalid configuration")?;
  Ok(config)
}

/// Human-readable logs in development, JSON lines everywhere else.
/// `RUST_LOG` overrides the default level.
fn init_tracing(env: Env) {
  let default_level = match env {
    Env::Dev => LevelFilter::DEBUG,
    Env::Stage | Env::Prod => LevelFilter::INFO,
  };
  let filter = EnvFilter::builder()
    .with_default_directive(default_level.into())
    .from_env_lossy();

  let registry = tracing_subscriber::registry().with(filter);
  match env {
    Env::Dev => registry.with(tracing_subscriber::fmt::layer()).init(),
    Env::Stage | Env::Prod => registry
      .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
      .init(),
  }
}

async fn open_store(dsn: &str) -> anyhow::Result<SqliteStore> {
  if dsn == ":memory:" {
    tracing::warn!("using an in-memory database; data is lost on exit");
    return SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store");
  }

  let path = expand_tilde(Path::new(dsn));
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
  }
  tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/db/goalkeepr.db")), PathBuf::from(home).join("db/goalkeepr.db"));
    assert_eq!(expand_tilde(Path::new("/var/goalkeepr.db")), PathBuf::from("/var/goalkeepr.db"));
  }

  #[test]
  fn cli_overrides_win() {
    let cli = Cli::parse_from([
      "goalkeepr",
      "--config",
      "/nonexistent/goalkeepr.toml",
      "--env",
      "dev",
      "--port",
      "8080",
      "--database-dsn",
      ":memory:",
    ]);
    let config = load_config(&cli).unwrap();
    assert_eq!(config.env, Env::Dev);
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_dsn, ":memory:");
    assert_eq!(config.rate_limit_burst, 5);
  }

  #[test]
  fn unknown_driver_is_rejected() {
    let cli = Cli::parse_from(["goalkeepr", "--config", "/nonexistent/goalkeepr.toml", "--database-driver", "postgres"]);
    assert!(load_config(&cli).is_err());
  }
}
