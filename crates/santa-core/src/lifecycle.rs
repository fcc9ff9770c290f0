//! The group lifecycle: `SETUP` → `DRAWN` → `SETUP`.
//!
//! [`transition`] is the single entry point for changing an existing group.
//! It never mutates its input: callers get either an updated copy to persist
//! or an error, in which case nothing should be written.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{
  Error, Result,
  draw::{DrawConfig, MIN_PARTICIPANTS, compute_assignment},
  group::{Assignment, ExclusionSet, Group, GroupId, GroupStatus},
  participant::{MAX_BUDGET_LEN, MAX_NAME_LEN, Participant, ParticipantId, sanitize},
};

// ─── Actors ──────────────────────────────────────────────────────────────────

/// Who is asking. Credentials are checked before an actor is constructed;
/// the lifecycle only compares identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
  /// A participant of the tenant, identified by their participant id.
  Participant(ParticipantId),
  /// The holder of the tenant administrator credential.
  TenantAdmin,
}

impl Actor {
  pub fn participant_id(&self) -> Option<&ParticipantId> {
    match self {
      Self::Participant(id) => Some(id),
      Self::TenantAdmin => None,
    }
  }
}

pub fn is_tenant_admin(actor: &Actor) -> bool { matches!(actor, Actor::TenantAdmin) }

pub fn is_group_admin(actor: &Actor, group: &Group) -> bool {
  match (actor, &group.admin_id) {
    (Actor::Participant(id), Some(admin)) => id == admin,
    _ => false,
  }
}

fn require_admin(actor: &Actor, group: &Group, what: &str) -> Result<()> {
  if is_group_admin(actor, group) || is_tenant_admin(actor) {
    Ok(())
  } else {
    Err(Error::forbidden(format!("only an administrator can {what}")))
  }
}

fn require_setup(group: &Group, what: &str) -> Result<()> {
  match group.status {
    GroupStatus::Setup => Ok(()),
    GroupStatus::Drawn => Err(Error::validation(format!(
      "cannot {what} after the draw; reset the group first"
    ))),
  }
}

fn require_member(group: &Group, id: &ParticipantId) -> Result<()> {
  if group.is_member(id) {
    Ok(())
  } else {
    Err(Error::ParticipantNotFound(id.clone()))
  }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Everything that can happen to an existing group.
#[derive(Debug, Clone)]
pub enum Action {
  /// The acting participant joins under `name`. Joining twice is a no-op.
  Join { name: String },
  /// An administrator adds someone else.
  AddParticipant(Participant),
  /// Replace the exclusion set wholesale.
  SetExclusions(ExclusionSet),
  /// Run the assignment engine.
  Draw,
  /// Discard the assignment and return to `SETUP`.
  Reset,
  /// Overwrite the assignment by hand, bypassing the engine.
  EditResult(Assignment),
  /// The acting participant changes their display name in this group.
  RenameSelf { name: String },
  UpdateDetails {
    name:   Option<String>,
    budget: Option<String>,
  },
}

impl Action {
  /// Short name for logs.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Join { .. } => "join",
      Self::AddParticipant(_) => "add_participant",
      Self::SetExclusions(_) => "set_exclusions",
      Self::Draw => "draw",
      Self::Reset => "reset",
      Self::EditResult(_) => "edit_result",
      Self::RenameSelf { .. } => "rename_self",
      Self::UpdateDetails { .. } => "update_details",
    }
  }
}

/// Inputs a transition needs besides the group itself.
pub struct Context<'a, R: ?Sized> {
  pub now:  DateTime<Utc>,
  pub draw: DrawConfig,
  pub rng:  &'a mut R,
}

// ─── Creation ────────────────────────────────────────────────────────────────

/// Build a new group in `SETUP`.
///
/// A participant creator becomes the group administrator and its first
/// member; a tenant administrator creates an empty group only tenant
/// administrators manage.
pub fn create_group(
  group_id: GroupId,
  name: &str,
  budget: Option<&str>,
  creator: &Actor,
  creator_name: Option<&str>,
  now: DateTime<Utc>,
) -> Result<Group> {
  let name = sanitize(name, MAX_NAME_LEN);
  if name.is_empty() {
    return Err(Error::validation("group name is required"));
  }
  let budget = budget
    .map(|b| sanitize(b, MAX_BUDGET_LEN))
    .filter(|b| !b.is_empty());

  let (admin_id, participants) = match creator {
    Actor::Participant(id) => {
      let display = creator_name.map(|n| sanitize(n, MAX_NAME_LEN)).unwrap_or_default();
      (Some(id.clone()), vec![Participant {
        participant_id: id.clone(),
        name:           display,
      }])
    }
    Actor::TenantAdmin => (None, Vec::new()),
  };

  Ok(Group {
    group_id,
    name,
    budget,
    admin_id,
    status: GroupStatus::Setup,
    participants,
    exclusions: ExclusionSet::new(),
    assignment: Assignment::new(),
    created_at: now,
    drawn_at: None,
  })
}

// ─── Transition ──────────────────────────────────────────────────────────────

/// Apply `action` on behalf of `actor`, returning the updated group.
///
/// Re-drawing a `DRAWN` group is allowed and replaces the previous
/// assignment.
pub fn transition<R: Rng + ?Sized>(
  group: &Group,
  action: Action,
  actor: &Actor,
  ctx: &mut Context<'_, R>,
) -> Result<Group> {
  let mut next = group.clone();

  match action {
    Action::Join { name } => {
      let Actor::Participant(id) = actor else {
        return Err(Error::forbidden("only participants can join a group"));
      };
      if group.is_member(id) {
        return Ok(next);
      }
      require_setup(group, "join")?;
      next.participants.push(Participant {
        participant_id: id.clone(),
        name:           sanitize(&name, MAX_NAME_LEN),
      });
    }

    Action::AddParticipant(participant) => {
      require_admin(actor, group, "add participants")?;
      require_setup(group, "add participants")?;
      if group.is_member(&participant.participant_id) {
        return Err(Error::validation(format!(
          "{} is already a participant",
          participant.participant_id
        )));
      }
      let name = sanitize(&participant.name, MAX_NAME_LEN);
      if name.is_empty() {
        return Err(Error::validation("participant name is required"));
      }
      next.participants.push(Participant {
        participant_id: participant.participant_id,
        name,
      });
    }

    Action::SetExclusions(exclusions) => {
      require_admin(actor, group, "update exclusions")?;
      require_setup(group, "update exclusions")?;
      for id in exclusions.referenced_ids() {
        require_member(group, id)?;
      }
      next.exclusions = exclusions;
    }

    Action::Draw => {
      require_admin(actor, group, "start the draw")?;
      if group.participants.len() < MIN_PARTICIPANTS {
        return Err(Error::validation(format!(
          "need at least {MIN_PARTICIPANTS} participants"
        )));
      }
      let assignment = compute_assignment(
        &group.participant_ids(),
        &group.exclusions,
        &ctx.draw,
        &mut *ctx.rng,
      )?;
      next.assignment = assignment;
      next.status = GroupStatus::Drawn;
      next.drawn_at = Some(ctx.now);
    }

    Action::Reset => {
      require_admin(actor, group, "reset the group")?;
      next.assignment = Assignment::new();
      next.status = GroupStatus::Setup;
      next.drawn_at = None;
    }

    Action::EditResult(assignment) => {
      if !is_tenant_admin(actor) {
        return Err(Error::forbidden(
          "only the tenant administrator can edit results",
        ));
      }
      for (giver, receiver) in assignment.iter() {
        require_member(group, giver)?;
        require_member(group, receiver)?;
      }
      if !assignment.is_empty() && group.status == GroupStatus::Setup {
        next.status = GroupStatus::Drawn;
        next.drawn_at = Some(ctx.now);
      }
      next.assignment = assignment;
    }

    Action::RenameSelf { name } => {
      let id = actor
        .participant_id()
        .ok_or_else(|| Error::forbidden("only participants can rename themselves"))?;
      let name = sanitize(&name, MAX_NAME_LEN);
      if name.is_empty() {
        return Err(Error::validation("name is required"));
      }
      match next.participants.iter_mut().find(|p| &p.participant_id == id) {
        Some(participant) => participant.name = name,
        None => return Err(Error::forbidden("not a member of this group")),
      }
    }

    Action::UpdateDetails { name, budget } => {
      require_admin(actor, group, "update group details")?;
      if let Some(name) = name.map(|n| sanitize(&n, MAX_NAME_LEN))
        && !name.is_empty()
      {
        next.name = name;
      }
      if let Some(budget) = budget {
        let budget = sanitize(&budget, MAX_BUDGET_LEN);
        next.budget = (!budget.is_empty()).then_some(budget);
      }
    }
  }

  Ok(next)
}
