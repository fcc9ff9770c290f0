//! Serialised load → transition → save for a single group.
//!
//! The store replaces groups wholesale, so two concurrent mutations of the
//! same group would lose one update. Every mutation therefore holds the
//! group's lock from the read to the write. Reads never take a lock.
//!
//! Lock entries exist only while someone holds or waits for them, so
//! requests naming groups that do not exist leave nothing behind.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use santa_core::{
  group::{Group, GroupId},
  lifecycle::{Action, Actor, Context, transition},
  store::GroupStore,
  tenant::TenantId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{AppState, error::ApiError};

type LockKey = (TenantId, GroupId);

/// One async mutex per `(tenant, group)`, created on first use.
#[derive(Clone, Default)]
pub struct GroupLocks {
  inner: Arc<Mutex<HashMap<LockKey, Arc<Mutex<()>>>>>,
}

impl GroupLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to a group.
  pub async fn lock(&self, tenant: &TenantId, group_id: &GroupId) -> OwnedMutexGuard<()> {
    let entry = {
      let mut map = self.inner.lock().await;
      map
        .entry((tenant.clone(), group_id.clone()))
        .or_default()
        .clone()
    };
    entry.lock_owned().await
  }

  /// Drop every entry nobody holds or waits on. Call after releasing a
  /// guard obtained from [`GroupLocks::lock`].
  pub async fn purge_idle(&self) {
    self
      .inner
      .lock()
      .await
      .retain(|_, entry| Arc::strong_count(entry) > 1);
  }

  #[cfg(test)]
  pub(crate) async fn len(&self) -> usize { self.inner.lock().await.len() }
}

/// Load a group or fail with [`santa_core::Error::GroupNotFound`].
pub async fn load_group<S>(
  state: &AppState<S>,
  tenant: &TenantId,
  group_id: &GroupId,
) -> Result<Group, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_group(tenant, group_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| santa_core::Error::GroupNotFound(group_id.clone()).into())
}

/// Apply `action` to a stored group under its lock and persist the result.
///
/// Nothing is written when the transition is rejected.
pub async fn apply<S>(
  state: &AppState<S>,
  tenant: &TenantId,
  group_id: &GroupId,
  actor: &Actor,
  action: Action,
) -> Result<Group, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let guard = state.locks.lock(tenant, group_id).await;
  let result = apply_locked(state, tenant, group_id, actor, action).await;
  drop(guard);
  state.locks.purge_idle().await;
  result
}

async fn apply_locked<S>(
  state: &AppState<S>,
  tenant: &TenantId,
  group_id: &GroupId,
  actor: &Actor,
  action: Action,
) -> Result<Group, ApiError>
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let group = load_group(state, tenant, group_id).await?;
  let action_name = action.name();

  let outcome = {
    let mut rng = rand::thread_rng();
    let mut ctx = Context {
      now:  Utc::now(),
      draw: state.config.draw,
      rng:  &mut rng,
    };
    transition(&group, action, actor, &mut ctx)
  };

  let updated = match outcome {
    Ok(updated) => updated,
    Err(e) => {
      match &e {
        santa_core::Error::Infeasible { attempts } => tracing::warn!(
          %tenant, %group_id, attempts, participants = group.participants.len(),
          "draw infeasible with current exclusions"
        ),
        _ => tracing::debug!(%tenant, %group_id, action = action_name, error = %e, "transition rejected"),
      }
      return Err(e.into());
    }
  };

  state
    .store
    .save_group(tenant, &updated)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    %tenant, %group_id, action = action_name, status = ?updated.status,
    participants = updated.participants.len(),
    "group updated"
  );
  Ok(updated)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[tokio::test]
  async fn same_group_is_serialised() {
    let locks = GroupLocks::new();
    let tenant = TenantId::from_credential("password");
    let group = GroupId::new("123456");

    let guard = locks.lock(&tenant, &group).await;
    let second = tokio::time::timeout(
      Duration::from_millis(50),
      locks.lock(&tenant, &group),
    )
    .await;
    assert!(second.is_err(), "second lock acquired while first was held");

    drop(guard);
    let third =
      tokio::time::timeout(Duration::from_millis(50), locks.lock(&tenant, &group)).await;
    assert!(third.is_ok());
  }

  #[tokio::test]
  async fn different_groups_do_not_block() {
    let locks = GroupLocks::new();
    let tenant = TenantId::from_credential("password");

    let _a = locks.lock(&tenant, &GroupId::new("111111")).await;
    let b = tokio::time::timeout(
      Duration::from_millis(50),
      locks.lock(&tenant, &GroupId::new("222222")),
    )
    .await;
    assert!(b.is_ok());
  }

  #[tokio::test]
  async fn purge_drops_released_entries() {
    let locks = GroupLocks::new();
    let tenant = TenantId::from_credential("password");
    let group = GroupId::new("123456");

    drop(locks.lock(&tenant, &group).await);
    locks.purge_idle().await;
    assert_eq!(locks.len().await, 0);
  }

  #[tokio::test]
  async fn purge_keeps_held_entries() {
    let locks = GroupLocks::new();
    let tenant = TenantId::from_credential("password");

    let _held = locks.lock(&tenant, &GroupId::new("111111")).await;
    drop(locks.lock(&tenant, &GroupId::new("222222")).await);
    locks.purge_idle().await;
    assert_eq!(locks.len().await, 1);
  }
}
