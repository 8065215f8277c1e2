//! Role-based authorization decisions.
//!
//! Every mutation path in the application consults [`can`] before touching
//! the store; the checks live here, in one place, rather than being
//! scattered across call sites. The functions are pure: they look only at
//! the actor, the action, and the facts about the target incident.

use model::entities::incident::IncidentStatus;
use model::entities::profile::Role;
use std::fmt;
use thiserror::Error;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub account_id: i32,
    pub role: Role,
    pub is_superuser: bool,
}

impl Actor {
    fn is_admin(&self) -> bool {
        self.is_superuser || self.role == Role::Admin
    }
}

/// Actions an actor can attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Report,
    ViewOwn,
    ViewAll,
    Edit,
    Delete,
    UpdateStatus,
    Confirm,
    Resolve,
    ViewStats,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Report => "report incidents",
            Action::ViewOwn => "view this incident",
            Action::ViewAll => "view all incidents",
            Action::Edit => "edit this incident",
            Action::Delete => "delete this incident",
            Action::UpdateStatus => "update this incident",
            Action::Confirm => "confirm incidents",
            Action::Resolve => "resolve incidents",
            Action::ViewStats => "view incident statistics",
        };
        f.write_str(s)
    }
}

/// Facts about the target incident needed for ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncidentFacts {
    pub reporter_id: i32,
    pub status: IncidentStatus,
}

/// A structured policy denial. The messages are user-facing and never
/// expose anything beyond the action that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Only residents can report incidents.")]
    NotResident,
    #[error("Only officers can {0}.")]
    NotOfficer(Action),
    #[error("You can only {verb} pending incidents.")]
    PendingOnly { verb: &'static str },
    #[error("You are not authorized to {0}.")]
    NotAuthorized(Action),
}

/// Decide whether `actor` may perform `action`, optionally against a
/// specific incident. `incident` is required for the ownership-sensitive
/// actions (`ViewOwn`, `Edit`, `Delete`); when absent those actions are
/// denied outright.
pub fn can(actor: &Actor, action: Action, incident: Option<&IncidentFacts>) -> Result<(), Denial> {
    match action {
        Action::Report => {
            if actor.role == Role::Resident {
                Ok(())
            } else {
                Err(Denial::NotResident)
            }
        }
        Action::ViewOwn => match incident {
            Some(facts) if facts.reporter_id == actor.account_id => Ok(()),
            _ => Err(Denial::NotAuthorized(Action::ViewOwn)),
        },
        Action::ViewAll => {
            if actor.is_superuser
                || matches!(actor.role, Role::Officer | Role::Chief | Role::Admin)
            {
                Ok(())
            } else {
                Err(Denial::NotAuthorized(Action::ViewAll))
            }
        }
        Action::Edit | Action::Delete => {
            if actor.is_admin() {
                return Ok(());
            }
            let facts = match incident {
                Some(facts) => facts,
                None => return Err(Denial::NotAuthorized(action)),
            };
            if facts.reporter_id != actor.account_id {
                return Err(Denial::NotAuthorized(action));
            }
            if facts.status != IncidentStatus::Pending {
                let verb = if action == Action::Edit { "edit" } else { "delete" };
                return Err(Denial::PendingOnly { verb });
            }
            Ok(())
        }
        Action::UpdateStatus => {
            if actor.is_superuser || matches!(actor.role, Role::Admin | Role::Officer) {
                Ok(())
            } else {
                Err(Denial::NotAuthorized(Action::UpdateStatus))
            }
        }
        Action::Confirm | Action::Resolve => {
            if actor.role == Role::Officer {
                Ok(())
            } else {
                Err(Denial::NotOfficer(action))
            }
        }
        Action::ViewStats => {
            if actor.is_superuser || matches!(actor.role, Role::Chief | Role::Admin) {
                Ok(())
            } else {
                Err(Denial::NotAuthorized(Action::ViewStats))
            }
        }
    }
}

/// Convenience wrapper when only the boolean answer matters.
pub fn allowed(actor: &Actor, action: Action, incident: Option<&IncidentFacts>) -> bool {
    can(actor, action, incident).is_ok()
}

/// Non-role profile fields may be changed by the account holder or by an
/// admin/superuser.
pub fn can_update_profile(actor: &Actor, target_account_id: i32) -> Result<(), Denial> {
    if actor.account_id == target_account_id || actor.is_admin() {
        Ok(())
    } else {
        Err(Denial::NotAuthorized(Action::ViewOwn))
    }
}

/// Roles are assigned only by admins/superusers, and never by an account
/// to itself unless it is a superuser.
pub fn can_assign_role(actor: &Actor, target_account_id: i32) -> Result<(), Denial> {
    if !actor.is_admin() {
        return Err(Denial::NotAuthorized(Action::UpdateStatus));
    }
    if actor.account_id == target_account_id && !actor.is_superuser {
        return Err(Denial::NotAuthorized(Action::UpdateStatus));
    }
    Ok(())
}
