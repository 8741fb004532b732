//! Appointment status transitions.
//!
//! Every path that changes an appointment's status goes through [`next_status`],
//! so the transition table and its role requirements live in one place:
//!
//! | From      | Action   | To        | Roles          |
//! |-----------|----------|-----------|----------------|
//! | PENDING   | confirm  | CONFIRMED | ADMIN, BARBER  |
//! | PENDING   | cancel   | CANCELLED | any            |
//! | CONFIRMED | cancel   | CANCELLED | any            |
//! | CONFIRMED | complete | COMPLETED | ADMIN, BARBER  |
//! | PENDING   | complete | COMPLETED | ADMIN, BARBER  |
//!
//! COMPLETED and CANCELLED are terminal.

use crate::models::appointment::AppointmentStatus;
use crate::models::user::Role;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusAction {
    Confirm,
    Cancel,
    Complete,
}

impl StatusAction {
    pub const ALL: [StatusAction; 3] = [StatusAction::Confirm, StatusAction::Cancel, StatusAction::Complete];

    /// Roles allowed to perform the action, regardless of the current status.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            StatusAction::Confirm | StatusAction::Complete => &[Role::Admin, Role::Barber],
            StatusAction::Cancel => &Role::ALL,
        }
    }

    /// The action a generic update must perform to reach `target`.
    /// PENDING is never a target.
    pub fn for_target(target: AppointmentStatus) -> Option<StatusAction> {
        match target {
            AppointmentStatus::Pending => None,
            AppointmentStatus::Confirmed => Some(StatusAction::Confirm),
            AppointmentStatus::Completed => Some(StatusAction::Complete),
            AppointmentStatus::Cancelled => Some(StatusAction::Cancel),
        }
    }
}

impl std::fmt::Display for StatusAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusAction::Confirm => write!(f, "confirm"),
            StatusAction::Cancel => write!(f, "cancel"),
            StatusAction::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Role {role} may not {action} appointments")]
    NotPermitted { action: StatusAction, role: Role },
    #[error("Cannot {action} an appointment that is {from}")]
    InvalidTransition { from: AppointmentStatus, action: StatusAction },
    #[error("An appointment that is {from} cannot return to PENDING")]
    CannotReopen { from: AppointmentStatus },
}

pub fn next_status(current: AppointmentStatus, action: StatusAction, actor_role: Role) -> Result<AppointmentStatus, TransitionError> {
    if !action.allowed_roles().contains(&actor_role) {
        return Err(TransitionError::NotPermitted { action, role: actor_role });
    }

    match (current, action) {
        (AppointmentStatus::Pending, StatusAction::Confirm) => Ok(AppointmentStatus::Confirmed),
        (AppointmentStatus::Pending | AppointmentStatus::Confirmed, StatusAction::Cancel) => Ok(AppointmentStatus::Cancelled),
        (AppointmentStatus::Pending | AppointmentStatus::Confirmed, StatusAction::Complete) => Ok(AppointmentStatus::Completed),
        (from, action) => Err(TransitionError::InvalidTransition { from, action }),
    }
}

/// Resolves a requested target status (from a generic update) into a transition.
pub fn transition_to(current: AppointmentStatus, target: AppointmentStatus, actor_role: Role) -> Result<AppointmentStatus, TransitionError> {
    match StatusAction::for_target(target) {
        Some(action) => next_status(current, action, actor_role),
        None => Err(TransitionError::CannotReopen { from: current }),
    }
}
