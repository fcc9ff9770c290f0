//! [`SqliteStore`], the SQLite implementation of [`GroupStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use santa_core::{
  group::{Group, GroupId},
  participant::{ParticipantId, Profile, RecoveryCode},
  store::GroupStore,
  tenant::TenantId,
};

use crate::{
  encode::{RawProfile, decode_group, encode_dt, encode_group},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A group store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_profiles(
    &self,
    sql: String,
    param: String,
  ) -> Result<Vec<RawProfile>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }
}

// ─── GroupStore impl ─────────────────────────────────────────────────────────

impl GroupStore for SqliteStore {
  type Error = crate::Error;

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn get_group(
    &self,
    tenant:   &TenantId,
    group_id: &GroupId,
  ) -> Result<Option<Group>> {
    let tenant_str = tenant.as_str().to_owned();
    let group_str  = group_id.as_str().to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body_json FROM groups WHERE tenant_id = ?1 AND group_id = ?2",
              rusqlite::params![tenant_str, group_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.as_deref().map(decode_group).transpose()
  }

  async fn list_groups(&self, tenant: &TenantId) -> Result<Vec<Group>> {
    let tenant_str = tenant.as_str().to_owned();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body_json FROM groups
           WHERE tenant_id = ?1
           ORDER BY created_at, group_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies.iter().map(|b| decode_group(b)).collect()
  }

  async fn save_group(&self, tenant: &TenantId, group: &Group) -> Result<()> {
    let tenant_str  = tenant.as_str().to_owned();
    let group_str   = group.group_id.as_str().to_owned();
    let body        = encode_group(group)?;
    let created_str = encode_dt(group.created_at);
    let updated_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO groups (tenant_id, group_id, body_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (tenant_id, group_id) DO UPDATE SET
             body_json  = excluded.body_json,
             updated_at = excluded.updated_at",
          rusqlite::params![tenant_str, group_str, body, created_str, updated_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_group(&self, tenant: &TenantId, group_id: &GroupId) -> Result<bool> {
    let tenant_str = tenant.as_str().to_owned();
    let group_str  = group_id.as_str().to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM groups WHERE tenant_id = ?1 AND group_id = ?2",
          rusqlite::params![tenant_str, group_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(
    &self,
    tenant:         &TenantId,
    participant_id: &ParticipantId,
  ) -> Result<Option<Profile>> {
    let tenant_str = tenant.as_str().to_owned();
    let id_str     = participant_id.as_str().to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM profiles WHERE tenant_id = ?1 AND participant_id = ?2",
                RawProfile::COLUMNS
              ),
              rusqlite::params![tenant_str, id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self, tenant: &TenantId) -> Result<Vec<Profile>> {
    let sql = format!(
      "SELECT {} FROM profiles WHERE tenant_id = ?1 ORDER BY created_at, participant_id",
      RawProfile::COLUMNS
    );
    let raws = self.query_profiles(sql, tenant.as_str().to_owned()).await?;
    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn save_profile(&self, tenant: &TenantId, profile: &Profile) -> Result<()> {
    let tenant_str  = tenant.as_str().to_owned();
    let id_str      = profile.participant_id.as_str().to_owned();
    let name        = profile.display_name.clone();
    let wishlist    = profile.wishlist.clone();
    let dislikes    = profile.dislikes.clone();
    let code        = profile.recovery_code.as_str().to_owned();
    let created_str = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             tenant_id, participant_id, display_name, wishlist, dislikes,
             recovery_code, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (tenant_id, participant_id) DO UPDATE SET
             display_name  = excluded.display_name,
             wishlist      = excluded.wishlist,
             dislikes      = excluded.dislikes,
             recovery_code = excluded.recovery_code",
          rusqlite::params![
            tenant_str,
            id_str,
            name,
            wishlist,
            dislikes,
            code,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_by_recovery_code(
    &self,
    code: &RecoveryCode,
  ) -> Result<Option<(TenantId, Profile)>> {
    let sql = format!(
      "SELECT {} FROM profiles WHERE recovery_code = ?1 ORDER BY created_at LIMIT 1",
      RawProfile::COLUMNS
    );
    let raws = self.query_profiles(sql, code.as_str().to_owned()).await?;
    raws
      .into_iter()
      .next()
      .map(RawProfile::into_tenant_profile)
      .transpose()
  }
}
