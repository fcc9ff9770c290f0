//! Secret Santa server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `SANTA_*`
//! environment variables, opens the SQLite store, and serves the JSON API.
//!
//! # Admin password hashes
//!
//! Each tenant is unlocked by its own administrator password. Generate the
//! argon2 PHC string to list under `admin_password_hashes` with:
//!
//! ```
//! cargo run -p santa-server --bin server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use santa_server::{AppState, ServerConfig};
use santa_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Secret Santa coordinator")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password read from stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  if cli.hash_password {
    let password = read_password()?;
    if password.is_empty() {
      anyhow::bail!("refusing to hash an empty password");
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let config = load_config(cli.config)?;
  if config.admin_password_hashes.is_empty() {
    tracing::warn!("no admin_password_hashes configured; admin endpoints will reject everyone");
  }

  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let address = format!("{}:{}", config.host, config.port);
  tracing::info!(
    tenants = config.admin_password_hashes.len(),
    max_attempts = config.draw.max_attempts,
    store = %store_path.display(),
    "starting"
  );

  let app = santa_server::router(AppState::new(store, config));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Layer defaults, the optional config file and `SANTA_*` variables.
///
/// Nested keys use a double underscore (`SANTA_DRAW__MAX_ATTEMPTS`).
/// `SANTA_ADMIN_PASSWORD_HASHES` takes several hashes separated by spaces.
fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 3000)?
    .set_default("store_path", "santa.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("SANTA")
        .separator("__")
        .list_separator(" ")
        .with_list_parse_key("admin_password_hashes")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
