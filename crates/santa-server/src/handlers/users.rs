//! Handlers for participant sign-in and profiles.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"recovery_code":"ABC234"}` |
//! | `GET`  | `/auth/me` | The caller's own profile |
//! | `PUT`  | `/users/me` | Body: any of `display_name`, `wishlist`, `dislikes` |
//! | `GET`  | `/users/{id}` | Public profile; 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
};
use santa_core::{
  participant::{ParticipantId, Profile, ProfileUpdate, PublicProfile, RecoveryCode},
  store::GroupStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Session, error::ApiError};

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub recovery_code: String,
}

/// `POST /auth/login`
///
/// Resolves a recovery code to its profile. The client then sends the same
/// code as a Bearer token on every request.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let code = RecoveryCode::parse(&body.recovery_code);
  if code.as_str().is_empty() {
    return Err(santa_core::Error::validation("recovery code is required").into());
  }

  let (tenant, profile) = state
    .store
    .find_by_recovery_code(&code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("recovery code not found".into()))?;

  tracing::info!(%tenant, participant = %profile.participant_id, "participant signed in");
  Ok(Json(profile))
}

// ─── Own profile ──────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(session: Session) -> Json<Profile>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(session.profile)
}

/// `PUT /users/me`
pub async fn update_me<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Session { tenant, mut profile } = session;
  update.apply(&mut profile);
  state
    .store
    .save_profile(&tenant, &profile)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile))
}

// ─── Other participants ───────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<ParticipantId>,
) -> Result<Json<PublicProfile>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .get_profile(&session.tenant, &id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(profile.public()))
}
