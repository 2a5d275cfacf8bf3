//! sitewatch server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `SITEWATCH_*` environment variables, opens an in-process SQLite store, and
//! serves the trigger endpoint and JSON API over HTTP. When
//! `schedule_interval_secs` is set, probe cycles also run on a timer.
//!
//! # Token hash generation
//!
//! To generate the argon2 PHC string for `SITEWATCH_TRIGGER_TOKEN_HASH`:
//!
//! ```
//! cargo run -p sitewatch-server -- --hash-token
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use sitewatch_probe::HttpProber;
use sitewatch_server::{AppState, ServerConfig, auth::TOKEN_HASH_VAR, scheduler};
use sitewatch_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "sitewatch health-check server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a token entered on stdin and exit.
  #[arg(long)]
  hash_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a token and exit.
  if cli.hash_token {
    let token = read_token()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(token.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SITEWATCH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.auth_config().is_none() {
    tracing::warn!("{TOKEN_HASH_VAR} is not set; /run-checks and /api will answer 500");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let prober = HttpProber::with_timeout(server_cfg.probe_timeout())
    .context("failed to build HTTP client")?;
  tracing::info!(
    timeout_ms = u64::try_from(prober.timeout().as_millis()).unwrap_or(u64::MAX),
    concurrency = server_cfg.probe_concurrency,
    "prober ready"
  );

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let schedule = server_cfg.schedule_interval();
  let state = AppState::new(Arc::new(store), Arc::new(prober), server_cfg);

  if let Some(every) = schedule {
    scheduler::spawn(state.clone(), every);
  }

  let app = sitewatch_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a token from stdin.
fn read_token() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Token: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let token = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!token.is_empty(), "token must not be empty");
  Ok(token)
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
