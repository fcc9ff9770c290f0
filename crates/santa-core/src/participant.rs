//! Participants and their profiles.
//!
//! A [`Participant`] is the thin membership record a group keeps. Everything
//! a participant shares with their Santa (wishlist, dislikes) lives in a
//! separate [`Profile`] keyed by the same [`ParticipantId`].

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Input limits ────────────────────────────────────────────────────────────

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_BUDGET_LEN: usize = 50;
pub const MAX_NOTES_LEN: usize = 1000;

/// Trim surrounding whitespace and cap the result at `max_chars` characters.
pub fn sanitize(input: &str, max_chars: usize) -> String {
  input.trim().chars().take(max_chars).collect()
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identifier of a participant, unique within a tenant.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh `user_<uuid>` identifier.
  pub fn generate() -> Self {
    Self(format!("user_{}", Uuid::new_v4().simple()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ParticipantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ParticipantId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// Characters used in recovery codes; `0`, `O`, `1` and `I` are left out.
const RECOVERY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const RECOVERY_CODE_LEN: usize = 6;

/// Short memorable code a participant uses to sign back in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecoveryCode(String);

impl RecoveryCode {
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let code = (0..RECOVERY_CODE_LEN)
      .map(|_| RECOVERY_ALPHABET[rng.gen_range(0..RECOVERY_ALPHABET.len())] as char)
      .collect();
    Self(code)
  }

  /// Normalise user input: codes are case-insensitive.
  pub fn parse(input: &str) -> Self { Self(input.trim().to_uppercase()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

// ─── Participant ─────────────────────────────────────────────────────────────

/// A member of a group, as the group itself records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub participant_id: ParticipantId,
  /// Display name within this group.
  pub name:           String,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Per-participant data shared with whoever draws them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub participant_id: ParticipantId,
  pub display_name:   String,
  pub wishlist:       String,
  pub dislikes:       String,
  pub recovery_code:  RecoveryCode,
  pub created_at:     DateTime<Utc>,
}

impl Profile {
  /// A blank profile for a newly added participant.
  pub fn new(
    participant_id: ParticipantId,
    display_name: String,
    recovery_code: RecoveryCode,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      participant_id,
      display_name,
      wishlist: String::new(),
      dislikes: String::new(),
      recovery_code,
      created_at,
    }
  }

  /// The membership record for this profile.
  pub fn as_participant(&self) -> Participant {
    Participant {
      participant_id: self.participant_id.clone(),
      name:           self.display_name.clone(),
    }
  }

  /// The parts of the profile other participants may see.
  pub fn public(&self) -> PublicProfile {
    PublicProfile {
      participant_id: self.participant_id.clone(),
      display_name:   self.display_name.clone(),
      wishlist:       self.wishlist.clone(),
      dislikes:       self.dislikes.clone(),
    }
  }
}

/// A [`Profile`] without its recovery code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
  pub participant_id: ParticipantId,
  pub display_name:   String,
  pub wishlist:       String,
  pub dislikes:       String,
}

/// Self-service edit of a profile. Fields that are absent or blank after
/// sanitising leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub display_name: Option<String>,
  pub wishlist:     Option<String>,
  pub dislikes:     Option<String>,
}

impl ProfileUpdate {
  pub fn apply(&self, profile: &mut Profile) {
    fn replace(target: &mut String, input: Option<&str>, max: usize) {
      if let Some(value) = input.map(|s| sanitize(s, max))
        && !value.is_empty()
      {
        *target = value;
      }
    }

    replace(&mut profile.display_name, self.display_name.as_deref(), MAX_NAME_LEN);
    replace(&mut profile.wishlist, self.wishlist.as_deref(), MAX_NOTES_LEN);
    replace(&mut profile.dislikes, self.dislikes.as_deref(), MAX_NOTES_LEN);
  }
}
