//! Handlers for `/admin` endpoints, on behalf of a tenant administrator.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/data` | Every profile and group of the tenant |
//! | `GET`    | `/admin/config` | |
//! | `POST`   | `/admin/groups` | Body: `{"name":"Office","budget":"€10"}` |
//! | `PUT`    | `/admin/groups/{id}` | Body: any of `name`, `budget` |
//! | `DELETE` | `/admin/groups/{id}` | 404 if not found |
//! | `POST`   | `/admin/groups/{id}/participants` | Body: `{"name":"Carol"}` |
//! | `PUT`    | `/admin/groups/{id}/exclusions` | Body: `{"exclusions":{..}}` |
//! | `POST`   | `/admin/groups/{id}/draw` | |
//! | `POST`   | `/admin/groups/{id}/reset` | |
//! | `PUT`    | `/admin/groups/{id}/results` | Body: `{"results":{giver:receiver}}` |
//! | `PUT`    | `/admin/users/{id}` | Body: any of `wishlist`, `dislikes` |
//!
//! Tenant administrators always see full groups, assignment included.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use santa_core::{
  draw::DrawConfig,
  group::{Assignment, ExclusionSet, Group, GroupId},
  lifecycle::{self, Action, Actor},
  participant::{MAX_NAME_LEN, MAX_NOTES_LEN, ParticipantId, Profile, sanitize},
  store::GroupStore,
  tenant::TenantId,
};
use serde::{Deserialize, Serialize};

use super::{create_with_fresh_id, fresh_recovery_code, group_id_candidates};
use crate::{
  AppState,
  auth::TenantAdmin,
  coordinator::{apply, load_group},
  error::ApiError,
};

async fn act<S>(
  state: &AppState<S>,
  admin: &TenantAdmin,
  group_id: &GroupId,
  action: Action,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = apply(state, &admin.tenant, group_id, &Actor::TenantAdmin, action).await?;
  Ok(Json(group))
}

// ─── Overview ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TenantData {
  pub profiles: Vec<Profile>,
  pub groups:   Vec<Group>,
}

/// `GET /admin/data`
pub async fn data<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
) -> Result<Json<TenantData>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profiles = state
    .store
    .list_profiles(&admin.tenant)
    .await
    .map_err(ApiError::store)?;
  let groups = state
    .store
    .list_groups(&admin.tenant)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(TenantData { profiles, groups }))
}

#[derive(Debug, Serialize)]
pub struct AdminConfig {
  pub title:  String,
  pub tenant: TenantId,
  pub draw:   DrawConfig,
}

/// `GET /admin/config`
pub async fn config<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
) -> Json<AdminConfig>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(AdminConfig {
    title:  state.config.title.clone(),
    tenant: admin.tenant,
    draw:   state.config.draw,
  })
}

// ─── Groups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateGroupBody {
  pub name:   String,
  #[serde(default)]
  pub budget: Option<String>,
}

/// `POST /admin/groups`: an empty group with no group administrator.
pub async fn create_group<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Json(body): Json<CreateGroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let now = Utc::now();
  let group = create_with_fresh_id(&state, &admin.tenant, group_id_candidates(), |id| {
    lifecycle::create_group(
      id,
      &body.name,
      body.budget.as_deref(),
      &Actor::TenantAdmin,
      None,
      now,
    )
  })
  .await?;

  tracing::info!(tenant = %admin.tenant, group_id = %group.group_id, "admin created group");
  Ok((StatusCode::CREATED, Json(group)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupBody {
  pub name:   Option<String>,
  /// A blank budget clears it.
  pub budget: Option<String>,
}

/// `PUT /admin/groups/{id}`
pub async fn update_group<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
  Json(body): Json<UpdateGroupBody>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let action = Action::UpdateDetails {
    name:   body.name,
    budget: body.budget,
  };
  act(&state, &admin, &group_id, action).await
}

/// `DELETE /admin/groups/{id}`
pub async fn delete_group<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let guard = state.locks.lock(&admin.tenant, &group_id).await;
  let deleted = state
    .store
    .delete_group(&admin.tenant, &group_id)
    .await
    .map_err(ApiError::store);
  drop(guard);
  state.locks.purge_idle().await;

  if !deleted? {
    return Err(santa_core::Error::GroupNotFound(group_id).into());
  }
  tracing::info!(tenant = %admin.tenant, %group_id, "admin deleted group");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Participants ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddParticipantBody {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddedParticipant {
  pub group:   Group,
  /// Includes the recovery code to hand to the new participant.
  pub profile: Profile,
}

/// `POST /admin/groups/{id}/participants`
///
/// Creates a fresh profile and adds it to the group. The profile is stored
/// first; if the group then rejects the member the profile stays unattached.
pub async fn add_participant<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
  Json(body): Json<AddParticipantBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name = sanitize(&body.name, MAX_NAME_LEN);
  if name.is_empty() {
    return Err(santa_core::Error::validation("participant name is required").into());
  }
  load_group(&state, &admin.tenant, &group_id).await?;

  let code = fresh_recovery_code(&state).await?;
  let profile = Profile::new(ParticipantId::generate(), name, code, Utc::now());

  state
    .store
    .save_profile(&admin.tenant, &profile)
    .await
    .map_err(ApiError::store)?;
  let group = apply(
    &state,
    &admin.tenant,
    &group_id,
    &Actor::TenantAdmin,
    Action::AddParticipant(profile.as_participant()),
  )
  .await?;

  Ok((StatusCode::CREATED, Json(AddedParticipant { group, profile })))
}

#[derive(Debug, Deserialize)]
pub struct ExclusionsBody {
  pub exclusions: ExclusionSet,
}

/// `PUT /admin/groups/{id}/exclusions`
pub async fn set_exclusions<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
  Json(body): Json<ExclusionsBody>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &admin, &group_id, Action::SetExclusions(body.exclusions)).await
}

// ─── Draw / results ───────────────────────────────────────────────────────────

/// `POST /admin/groups/{id}/draw`
pub async fn draw<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &admin, &group_id, Action::Draw).await
}

/// `POST /admin/groups/{id}/reset`
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &admin, &group_id, Action::Reset).await
}

#[derive(Debug, Deserialize)]
pub struct ResultsBody {
  pub results: Assignment,
}

/// `PUT /admin/groups/{id}/results`: replace the assignment by hand.
///
/// The edit is stored even if it is not a valid draw.
pub async fn edit_results<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(group_id): Path<GroupId>,
  Json(body): Json<ResultsBody>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(group) =
    act(&state, &admin, &group_id, Action::EditResult(body.results)).await?;

  if !group.assignment.is_empty()
    && !group
      .assignment
      .is_valid_draw(&group.participant_ids(), &group.exclusions)
  {
    tracing::warn!(
      tenant = %admin.tenant, %group_id,
      "manual result edit is not a valid derangement"
    );
  }
  Ok(Json(group))
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
  pub wishlist: Option<String>,
  pub dislikes: Option<String>,
}

/// `PUT /admin/users/{id}`
///
/// Unlike the self-service edit, a present but blank field clears it.
pub async fn update_user<S>(
  State(state): State<AppState<S>>,
  admin: TenantAdmin,
  Path(id): Path<ParticipantId>,
  Json(body): Json<UpdateUserBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut profile = state
    .store
    .get_profile(&admin.tenant, &id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  if let Some(wishlist) = body.wishlist {
    profile.wishlist = sanitize(&wishlist, MAX_NOTES_LEN);
  }
  if let Some(dislikes) = body.dislikes {
    profile.dislikes = sanitize(&dislikes, MAX_NOTES_LEN);
  }
  state
    .store
    .save_profile(&admin.tenant, &profile)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(tenant = %admin.tenant, participant = %id, "admin updated profile");
  Ok(Json(profile))
}
