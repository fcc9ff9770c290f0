//! Handlers for `/groups` endpoints, on behalf of a signed-in participant.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups` | Groups the caller belongs to |
//! | `POST` | `/groups` | Body: `{"name":"Family","budget":"€20"}` |
//! | `GET`  | `/groups/{id}` | Members only |
//! | `POST` | `/groups/{id}/join` | Idempotent; `SETUP` only |
//! | `PUT`  | `/groups/{id}/exclusions` | Group admin; body: `{"exclusions":{..}}` |
//! | `POST` | `/groups/{id}/draw` | Group admin |
//! | `POST` | `/groups/{id}/reset` | Group admin |
//! | `PUT`  | `/groups/{id}/participants/me` | Body: `{"name":"Bob"}` |
//! | `GET`  | `/groups/{id}/assignment` | The caller's receiver, if drawn |
//!
//! Groups are returned as seen by the caller: only the group administrator
//! gets the full assignment.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use santa_core::{
  group::{ExclusionSet, Group, GroupId, GroupStatus},
  lifecycle::{Action, create_group},
  participant::PublicProfile,
  store::GroupStore,
};
use serde::{Deserialize, Serialize};

use super::{create_with_fresh_id, group_id_candidates, view_for};
use crate::{
  AppState,
  auth::Session,
  coordinator::{apply, load_group},
  error::ApiError,
};

/// Load a group the caller belongs to.
async fn member_group<S>(
  state: &AppState<S>,
  session: &Session,
  group_id: &GroupId,
) -> Result<Group, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = load_group(state, &session.tenant, group_id).await?;
  if !group.is_member(session.participant_id()) {
    return Err(santa_core::Error::forbidden("not a member of this group").into());
  }
  Ok(group)
}

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /groups`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<Vec<Group>>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = session.actor();
  let groups = state
    .store
    .list_groups(&session.tenant)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .filter(|g| g.is_member(session.participant_id()))
    .map(|g| view_for(g, &actor))
    .collect();
  Ok(Json(groups))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:   String,
  #[serde(default)]
  pub budget: Option<String>,
}

/// `POST /groups`: the caller becomes the group administrator.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = session.actor();
  let now = Utc::now();
  let group = create_with_fresh_id(&state, &session.tenant, group_id_candidates(), |id| {
    create_group(
      id,
      &body.name,
      body.budget.as_deref(),
      &actor,
      Some(session.profile.display_name.as_str()),
      now,
    )
  })
  .await?;

  tracing::info!(
    tenant = %session.tenant, group_id = %group.group_id,
    admin = %session.participant_id(), "group created"
  );
  Ok((StatusCode::CREATED, Json(group)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /groups/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = member_group(&state, &session, &group_id).await?;
  Ok(Json(view_for(group, &session.actor())))
}

// ─── Mutations ────────────────────────────────────────────────────────────────

async fn act<S>(
  state: &AppState<S>,
  session: &Session,
  group_id: &GroupId,
  action: Action,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = session.actor();
  let group = apply(state, &session.tenant, group_id, &actor, action).await?;
  Ok(Json(view_for(group, &actor)))
}

/// `POST /groups/{id}/join`
pub async fn join<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name = session.profile.display_name.clone();
  act(&state, &session, &group_id, Action::Join { name }).await
}

#[derive(Debug, Deserialize)]
pub struct ExclusionsBody {
  pub exclusions: ExclusionSet,
}

/// `PUT /groups/{id}/exclusions`: replaces the whole set.
pub async fn set_exclusions<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
  Json(body): Json<ExclusionsBody>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &session, &group_id, Action::SetExclusions(body.exclusions)).await
}

/// `POST /groups/{id}/draw`
pub async fn draw<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &session, &group_id, Action::Draw).await
}

/// `POST /groups/{id}/reset`
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &session, &group_id, Action::Reset).await
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub name: String,
}

/// `PUT /groups/{id}/participants/me`: change the caller's name in this
/// group only.
pub async fn rename_me<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
  Json(body): Json<RenameBody>,
) -> Result<Json<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  act(&state, &session, &group_id, Action::RenameSelf { name: body.name }).await
}

// ─── Own assignment ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MyAssignment {
  pub group_id: GroupId,
  pub status:   GroupStatus,
  /// `None` until the group has been drawn.
  pub receiver: Option<PublicProfile>,
}

/// `GET /groups/{id}/assignment`
pub async fn my_assignment<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(group_id): Path<GroupId>,
) -> Result<Json<MyAssignment>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = member_group(&state, &session, &group_id).await?;

  let receiver = match group.assignment.receiver_for(session.participant_id()) {
    Some(receiver_id) => {
      let profile = state
        .store
        .get_profile(&session.tenant, receiver_id)
        .await
        .map_err(ApiError::store)?;
      // Fall back to the in-group name if the profile has gone missing.
      Some(profile.map(|p| p.public()).unwrap_or_else(|| PublicProfile {
        participant_id: receiver_id.clone(),
        display_name:   group
          .participant(receiver_id)
          .map(|p| p.name.clone())
          .unwrap_or_default(),
        wishlist:       String::new(),
        dislikes:       String::new(),
      }))
    }
    None => None,
  };

  Ok(Json(MyAssignment {
    group_id,
    status: group.status,
    receiver,
  }))
}
