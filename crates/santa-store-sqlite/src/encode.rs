//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Groups are stored as a
//! single JSON document; profiles are stored column by column.

use chrono::{DateTime, Utc};
use santa_core::{
  group::Group,
  participant::{ParticipantId, Profile, RecoveryCode},
  tenant::TenantId,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Group ───────────────────────────────────────────────────────────────────

pub fn encode_group(group: &Group) -> Result<String> {
  Ok(serde_json::to_string(group)?)
}

pub fn decode_group(s: &str) -> Result<Group> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub tenant_id:      String,
  pub participant_id: String,
  pub display_name:   String,
  pub wishlist:       String,
  pub dislikes:       String,
  pub recovery_code:  String,
  pub created_at:     String,
}

impl RawProfile {
  pub const COLUMNS: &'static str = "tenant_id, participant_id, display_name, \
                                     wishlist, dislikes, recovery_code, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tenant_id:      row.get(0)?,
      participant_id: row.get(1)?,
      display_name:   row.get(2)?,
      wishlist:       row.get(3)?,
      dislikes:       row.get(4)?,
      recovery_code:  row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(self.into_tenant_profile()?.1)
  }

  pub fn into_tenant_profile(self) -> Result<(TenantId, Profile)> {
    let profile = Profile {
      participant_id: ParticipantId::new(self.participant_id),
      display_name:   self.display_name,
      wishlist:       self.wishlist,
      dislikes:       self.dislikes,
      recovery_code:  RecoveryCode::parse(&self.recovery_code),
      created_at:     decode_dt(&self.created_at)?,
    };
    Ok((TenantId::from_key(self.tenant_id), profile))
  }
}
