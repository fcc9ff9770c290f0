//! Unauthenticated endpoints.

use axum::{Json, extract::State};
use santa_core::store::GroupStore;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PublicConfig {
  pub title: String,
}

/// `GET /api/config`: front-page settings.
pub async fn config<S>(State(state): State<AppState<S>>) -> Json<PublicConfig>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(PublicConfig {
    title: state.config.title.clone(),
  })
}
