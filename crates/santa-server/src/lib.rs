//! JSON HTTP API for the Secret Santa coordinator.
//!
//! Exposes an axum [`Router`] backed by any [`GroupStore`]. Participant and
//! tenant administrator credentials are resolved by the extractors in
//! [`auth`]; every group mutation goes through [`coordinator::apply`].
//!
//! | Tier | Prefix | Credential |
//! |------|--------|------------|
//! | public | `/api/config` | none |
//! | participant | `/api/auth`, `/api/users`, `/api/groups` | `Bearer <recovery code>` |
//! | tenant admin | `/api/admin` | Basic `admin:<password>` |

pub mod auth;
pub mod coordinator;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use santa_core::{draw::DrawConfig, store::GroupStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use coordinator::GroupLocks;
use handlers::{admin, groups, public, users};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_title() -> String { "Secret Santa".to_string() }

/// Runtime server configuration, deserialised from `config.toml` and
/// `SANTA_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Shown on the front page; served publicly from `/api/config`.
  #[serde(default = "default_title")]
  pub title:                 String,
  /// Argon2 PHC strings, one per tenant administrator password.
  #[serde(default)]
  pub admin_password_hashes: Vec<String>,
  #[serde(default)]
  pub draw:                  DrawConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: GroupStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub locks:  GroupLocks,
}

impl<S: GroupStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:  Arc::new(store),
      config: Arc::new(config),
      locks:  GroupLocks::new(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the whole API, mounted under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = Router::new()
    // Public
    .route("/config", get(public::config::<S>))
    // Participants
    .route("/auth/login", post(users::login::<S>))
    .route("/auth/me", get(users::me::<S>))
    .route("/users/me", put(users::update_me::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route("/groups/{id}", get(groups::get_one::<S>))
    .route("/groups/{id}/join", post(groups::join::<S>))
    .route("/groups/{id}/exclusions", put(groups::set_exclusions::<S>))
    .route("/groups/{id}/draw", post(groups::draw::<S>))
    .route("/groups/{id}/reset", post(groups::reset::<S>))
    .route("/groups/{id}/participants/me", put(groups::rename_me::<S>))
    .route("/groups/{id}/assignment", get(groups::my_assignment::<S>))
    // Tenant administrators
    .route("/admin/data", get(admin::data::<S>))
    .route("/admin/config", get(admin::config::<S>))
    .route("/admin/groups", post(admin::create_group::<S>))
    .route(
      "/admin/groups/{id}",
      put(admin::update_group::<S>).delete(admin::delete_group::<S>),
    )
    .route("/admin/groups/{id}/participants", post(admin::add_participant::<S>))
    .route("/admin/groups/{id}/exclusions", put(admin::set_exclusions::<S>))
    .route("/admin/groups/{id}/draw", post(admin::draw::<S>))
    .route("/admin/groups/{id}/reset", post(admin::reset::<S>))
    .route("/admin/groups/{id}/results", put(admin::edit_results::<S>))
    .route("/admin/users/{id}", put(admin::update_user::<S>));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
