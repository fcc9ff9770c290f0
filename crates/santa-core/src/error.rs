//! Error types for `santa-core`.
//!
//! Every lifecycle guard reports one of four kinds: not found, forbidden,
//! validation, or infeasible. Callers map each kind to a distinct message.

use thiserror::Error;

use crate::{draw::Infeasible, group::GroupId, participant::ParticipantId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("group not found: {0}")]
  GroupNotFound(GroupId),

  #[error("participant not found: {0}")]
  ParticipantNotFound(ParticipantId),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("invalid request: {0}")]
  Validation(String),

  #[error(
    "could not find a valid draw with the current exclusions after {attempts} \
     attempts"
  )]
  Infeasible { attempts: u32 },
}

impl Error {
  pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

impl From<Infeasible> for Error {
  fn from(e: Infeasible) -> Self {
    Self::Infeasible {
      attempts: e.attempts,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
