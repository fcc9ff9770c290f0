//! Groups, exclusion sets, and assignments.

use std::{
  collections::{BTreeMap, BTreeSet, HashSet},
  fmt,
};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::participant::{Participant, ParticipantId};

// ─── GroupId ─────────────────────────────────────────────────────────────────

/// Identifier of a group: a six-digit code participants can type to join.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A random code in `100000..=999999`. Uniqueness is the caller's concern.
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    Self(rng.gen_range(100_000..1_000_000u32).to_string())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for GroupId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
  /// Participants and exclusions may change; no assignment is in force.
  #[default]
  Setup,
  /// An assignment has been drawn (or written by an administrator).
  Drawn,
}

// ─── ExclusionSet ────────────────────────────────────────────────────────────

/// Directed constraints: giver → receivers that giver must not draw.
///
/// Symmetry is not implied. `A` excluding `B` says nothing about `B → A`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeMap<ParticipantId, BTreeSet<ParticipantId>>);

impl ExclusionSet {
  pub fn new() -> Self { Self::default() }

  /// Forbid `giver` from drawing `receiver`.
  pub fn insert(&mut self, giver: ParticipantId, receiver: ParticipantId) {
    self.0.entry(giver).or_default().insert(receiver);
  }

  /// Forbid the pairing in both directions.
  pub fn insert_mutual(&mut self, a: ParticipantId, b: ParticipantId) {
    self.insert(a.clone(), b.clone());
    self.insert(b, a);
  }

  pub fn excludes(&self, giver: &ParticipantId, receiver: &ParticipantId) -> bool {
    self
      .0
      .get(giver)
      .is_some_and(|receivers| receivers.contains(receiver))
  }

  /// Every identifier mentioned, as giver or receiver.
  pub fn referenced_ids(&self) -> impl Iterator<Item = &ParticipantId> {
    self
      .0
      .iter()
      .flat_map(|(giver, receivers)| std::iter::once(giver).chain(receivers))
  }
}

impl FromIterator<(ParticipantId, ParticipantId)> for ExclusionSet {
  fn from_iter<T: IntoIterator<Item = (ParticipantId, ParticipantId)>>(
    iter: T,
  ) -> Self {
    let mut set = Self::new();
    for (giver, receiver) in iter {
      set.insert(giver, receiver);
    }
    set
  }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// Giver → receiver. Empty until a group is drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(BTreeMap<ParticipantId, ParticipantId>);

impl Assignment {
  pub fn new() -> Self { Self::default() }

  pub fn receiver_for(&self, giver: &ParticipantId) -> Option<&ParticipantId> {
    self.0.get(giver)
  }

  pub fn insert(&mut self, giver: ParticipantId, receiver: ParticipantId) {
    self.0.insert(giver, receiver);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &ParticipantId)> {
    self.0.iter()
  }

  /// Keep only the entry for `giver`.
  pub fn restricted_to(&self, giver: &ParticipantId) -> Self {
    self
      .0
      .get_key_value(giver)
      .map(|(g, r)| (g.clone(), r.clone()))
      .into_iter()
      .collect()
  }

  /// Whether this assignment is something the engine could have produced:
  /// a bijection on `participants` with no fixed point and no excluded pair.
  ///
  /// Administrator edits bypass the engine, so this is the way to check them.
  pub fn is_valid_draw(
    &self,
    participants: &[ParticipantId],
    exclusions: &ExclusionSet,
  ) -> bool {
    if self.0.len() != participants.len() {
      return false;
    }
    let members: HashSet<&ParticipantId> = participants.iter().collect();
    let mut receivers = HashSet::with_capacity(self.0.len());
    self.0.iter().all(|(giver, receiver)| {
      members.contains(giver)
        && members.contains(receiver)
        && giver != receiver
        && !exclusions.excludes(giver, receiver)
        && receivers.insert(receiver)
    })
  }
}

impl FromIterator<(ParticipantId, ParticipantId)> for Assignment {
  fn from_iter<T: IntoIterator<Item = (ParticipantId, ParticipantId)>>(
    iter: T,
  ) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Group ───────────────────────────────────────────────────────────────────

/// A gift exchange: who takes part, who may not draw whom, and the result.
///
/// Persisted as a whole; backends replace the stored record on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub group_id:     GroupId,
  pub name:         String,
  pub budget:       Option<String>,
  /// The participant who manages this group. `None` for groups created by a
  /// tenant administrator, which only tenant administrators manage.
  pub admin_id:     Option<ParticipantId>,
  pub status:       GroupStatus,
  pub participants: Vec<Participant>,
  #[serde(default)]
  pub exclusions:   ExclusionSet,
  #[serde(default)]
  pub assignment:   Assignment,
  pub created_at:   DateTime<Utc>,
  /// Set by a successful draw; cleared on reset.
  pub drawn_at:     Option<DateTime<Utc>>,
}

impl Group {
  pub fn is_member(&self, id: &ParticipantId) -> bool {
    self.participants.iter().any(|p| &p.participant_id == id)
  }

  pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
    self.participants.iter().find(|p| &p.participant_id == id)
  }

  /// Participant identifiers in group order.
  pub fn participant_ids(&self) -> Vec<ParticipantId> {
    self
      .participants
      .iter()
      .map(|p| p.participant_id.clone())
      .collect()
  }
}
