//! The `GroupStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `santa-store-sqlite`).
//! The server depends on this abstraction, not on any concrete backend.
//! Every record is scoped to a [`TenantId`]; nothing crosses tenants except
//! the recovery-code lookup used to sign participants in.

use std::future::Future;

use crate::{
  group::{Group, GroupId},
  participant::{ParticipantId, Profile, RecoveryCode},
  tenant::TenantId,
};

/// Abstraction over a group and profile store.
///
/// Groups are written whole: [`GroupStore::save_group`] replaces whatever was
/// stored under the same identifier. The store does not serialise
/// read-modify-write cycles; callers that mutate a group must hold their own
/// per-group lock.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GroupStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Retrieve a group. Returns `None` if not found.
  fn get_group<'a>(
    &'a self,
    tenant: &'a TenantId,
    group_id: &'a GroupId,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + 'a;

  /// All groups of a tenant, oldest first.
  fn list_groups<'a>(
    &'a self,
    tenant: &'a TenantId,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + 'a;

  /// Insert or atomically replace a group.
  fn save_group<'a>(
    &'a self,
    tenant: &'a TenantId,
    group: &'a Group,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a group. Returns `false` if there was nothing to delete.
  fn delete_group<'a>(
    &'a self,
    tenant: &'a TenantId,
    group_id: &'a GroupId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Retrieve a profile. Returns `None` if not found.
  fn get_profile<'a>(
    &'a self,
    tenant: &'a TenantId,
    participant_id: &'a ParticipantId,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// All profiles of a tenant, oldest first.
  fn list_profiles<'a>(
    &'a self,
    tenant: &'a TenantId,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + 'a;

  /// Insert or replace a profile.
  fn save_profile<'a>(
    &'a self,
    tenant: &'a TenantId,
    profile: &'a Profile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Find the profile holding `code`, searching every tenant.
  fn find_by_recovery_code<'a>(
    &'a self,
    code: &'a RecoveryCode,
  ) -> impl Future<Output = Result<Option<(TenantId, Profile)>, Self::Error>>
  + Send
  + 'a;
}
