//! Route handlers, one module per trust tier.

pub mod admin;
pub mod groups;
pub mod public;
pub mod users;

use santa_core::{
  group::{Group, GroupId},
  lifecycle::{Actor, is_group_admin, is_tenant_admin},
  participant::RecoveryCode,
  store::GroupStore,
  tenant::TenantId,
};

use crate::{AppState, error::ApiError};

/// Give up generating identifiers after this many collisions.
const MAX_ID_ATTEMPTS: usize = 32;

/// What `actor` may see of `group`: administrators see the whole
/// assignment, everyone else only their own entry.
pub(crate) fn view_for(group: Group, actor: &Actor) -> Group {
  if is_tenant_admin(actor) || is_group_admin(actor, &group) {
    return group;
  }
  let assignment = actor
    .participant_id()
    .map(|id| group.assignment.restricted_to(id))
    .unwrap_or_default();
  Group { assignment, ..group }
}

/// Random six-digit candidates for a new group id.
pub(crate) fn group_id_candidates() -> impl Iterator<Item = GroupId> + Send {
  std::iter::repeat_with(|| GroupId::generate(&mut rand::thread_rng()))
    .take(MAX_ID_ATTEMPTS)
}

/// Store a new group under the first candidate id not yet used within
/// `tenant`.
///
/// Each candidate is checked and written under its group lock, so two
/// concurrent creates drawing the same id cannot overwrite each other.
pub(crate) async fn create_with_fresh_id<S, F>(
  state: &AppState<S>,
  tenant: &TenantId,
  candidates: impl Iterator<Item = GroupId> + Send,
  build: F,
) -> Result<Group, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  F: Fn(GroupId) -> santa_core::Result<Group> + Send + Sync,
{
  for candidate in candidates {
    let guard = state.locks.lock(tenant, &candidate).await;
    let outcome = insert_if_free(state, tenant, candidate, &build).await;
    drop(guard);
    state.locks.purge_idle().await;

    if let Some(group) = outcome? {
      return Ok(group);
    }
  }
  Err(ApiError::Store("could not allocate a free group id".into()))
}

async fn insert_if_free<S, F>(
  state: &AppState<S>,
  tenant: &TenantId,
  candidate: GroupId,
  build: &F,
) -> Result<Option<Group>, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  F: Fn(GroupId) -> santa_core::Result<Group> + Send + Sync,
{
  let taken = state
    .store
    .get_group(tenant, &candidate)
    .await
    .map_err(ApiError::store)?
    .is_some();
  if taken {
    return Ok(None);
  }
  let group = build(candidate)?;
  state
    .store
    .save_group(tenant, &group)
    .await
    .map_err(ApiError::store)?;
  Ok(Some(group))
}

/// A recovery code not held by anyone in any tenant.
pub(crate) async fn fresh_recovery_code<S>(
  state: &AppState<S>,
) -> Result<RecoveryCode, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  for _ in 0..MAX_ID_ATTEMPTS {
    let candidate = RecoveryCode::generate(&mut rand::thread_rng());
    let taken = state
      .store
      .find_by_recovery_code(&candidate)
      .await
      .map_err(ApiError::store)?
      .is_some();
    if !taken {
      return Ok(candidate);
    }
  }
  Err(ApiError::Store("could not allocate a free recovery code".into()))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use santa_core::{
    group::{Assignment, ExclusionSet, GroupStatus},
    participant::{Participant, ParticipantId},
  };

  use super::*;

  fn pid(s: &str) -> ParticipantId { ParticipantId::from(s) }

  fn drawn_group() -> Group {
    let members = ["alice", "bob", "carol"];
    Group {
      group_id:     GroupId::new("123456"),
      name:         "Family".into(),
      budget:       None,
      admin_id:     Some(pid("alice")),
      status:       GroupStatus::Drawn,
      participants: members
        .iter()
        .map(|m| Participant {
          participant_id: pid(m),
          name:           m.to_string(),
        })
        .collect(),
      exclusions:   ExclusionSet::new(),
      assignment:   [
        (pid("alice"), pid("bob")),
        (pid("bob"), pid("carol")),
        (pid("carol"), pid("alice")),
      ]
      .into_iter()
      .collect::<Assignment>(),
      created_at:   Utc::now(),
      drawn_at:     Some(Utc::now()),
    }
  }

  #[test]
  fn admins_see_everything() {
    let group = drawn_group();
    assert_eq!(view_for(group.clone(), &Actor::TenantAdmin), group);
    assert_eq!(view_for(group.clone(), &Actor::Participant(pid("alice"))), group);
  }

  #[test]
  fn members_see_only_their_own_pairing() {
    let view = view_for(drawn_group(), &Actor::Participant(pid("bob")));
    assert_eq!(view.assignment.len(), 1);
    assert_eq!(view.assignment.receiver_for(&pid("bob")), Some(&pid("carol")));
  }
}
