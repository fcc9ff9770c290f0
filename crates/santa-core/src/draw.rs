//! The assignment engine.
//!
//! Rejection sampling over uniformly random permutations: shuffle, pair
//! position `i` of the input with position `i` of the shuffle, and keep the
//! first pairing with no self-assignment and no excluded pair.
//!
//! The attempt budget makes this a heuristic. A dense exclusion graph can be
//! reported [`Infeasible`] even though a valid pairing exists.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  group::{Assignment, ExclusionSet},
  participant::ParticipantId,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Smallest group the engine will draw for.
pub const MIN_PARTICIPANTS: usize = 3;

/// Tunables for [`compute_assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
  /// Number of shuffles tried before giving up.
  pub max_attempts: u32,
}

impl Default for DrawConfig {
  fn default() -> Self {
    Self {
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }
}

/// No valid pairing was found within the attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no valid assignment found after {attempts} attempts")]
pub struct Infeasible {
  /// Shuffles actually tried; zero when the input was rejected outright.
  pub attempts: u32,
}

/// Draw a giver → receiver assignment for `participants`.
///
/// Fewer than [`MIN_PARTICIPANTS`] identifiers, or duplicate identifiers,
/// are reported as [`Infeasible`] without searching. Every call may return a
/// different result.
pub fn compute_assignment<R: Rng + ?Sized>(
  participants: &[ParticipantId],
  exclusions: &ExclusionSet,
  config: &DrawConfig,
  rng: &mut R,
) -> Result<Assignment, Infeasible> {
  if participants.len() < MIN_PARTICIPANTS {
    return Err(Infeasible { attempts: 0 });
  }

  let mut seen = HashSet::with_capacity(participants.len());
  if !participants.iter().all(|id| seen.insert(id)) {
    return Err(Infeasible { attempts: 0 });
  }

  let mut receivers = participants.to_vec();
  for _ in 0..config.max_attempts {
    // Fisher–Yates; the result is uniform whatever the starting order.
    receivers.shuffle(rng);
    if let Some(assignment) = pair_up(participants, &receivers, exclusions) {
      return Ok(assignment);
    }
  }

  Err(Infeasible {
    attempts: config.max_attempts,
  })
}

/// Pair givers with receivers position by position, or `None` on the first
/// self-pairing or excluded pair.
fn pair_up(
  givers: &[ParticipantId],
  receivers: &[ParticipantId],
  exclusions: &ExclusionSet,
) -> Option<Assignment> {
  let mut assignment = Assignment::new();
  for (giver, receiver) in givers.iter().zip(receivers) {
    if giver == receiver || exclusions.excludes(giver, receiver) {
      return None;
    }
    assignment.insert(giver.clone(), receiver.clone());
  }
  Some(assignment)
}
