//! Ticket access policy
//!
//! Staff (agents and admins) see and modify every ticket. Requesters see
//! only tickets they created or are assigned to, and may not touch workflow
//! fields.

use shared::error::AppError;
use shared::models::{Role, Ticket};

use super::CurrentUser;

/// Ownership facts the policy needs about a ticket
#[derive(Debug, Clone, Copy)]
pub struct TicketAccess<'a> {
    pub creator_id: &'a str,
    pub assignee_id: Option<&'a str>,
}

impl<'a> From<&'a Ticket> for TicketAccess<'a> {
    fn from(ticket: &'a Ticket) -> Self {
        Self {
            creator_id: &ticket.creator_id,
            assignee_id: ticket.assignee_id.as_deref(),
        }
    }
}

/// Fields only staff may set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowField {
    Status,
    Priority,
    AssigneeId,
}

impl WorkflowField {
    /// Request body field name
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkflowField::Status => "status",
            WorkflowField::Priority => "priority",
            WorkflowField::AssigneeId => "assigneeId",
        }
    }
}

pub fn can_access(user: &CurrentUser, ticket: &TicketAccess<'_>) -> bool {
    user.is_staff() || ticket.creator_id == user.id || ticket.assignee_id == Some(user.id.as_str())
}

pub fn ensure_access(user: &CurrentUser, ticket: &TicketAccess<'_>) -> Result<(), AppError> {
    if can_access(user, ticket) {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, "Ticket access denied");
        Err(AppError::forbidden("You do not have access to this ticket"))
    }
}

/// Reject a requester supplying any staff-only field; reports the first offender
pub fn ensure_workflow_fields_allowed(
    role: Role,
    supplied: &[WorkflowField],
    message: &str,
) -> Result<(), AppError> {
    if role.is_staff() {
        return Ok(());
    }
    match supplied.first() {
        Some(field) => Err(AppError::forbidden(message).with_field(field.as_str())),
        None => Ok(()),
    }
}

pub fn require_staff(role: Role) -> Result<(), AppError> {
    if role.is_staff() {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only agents or admins may view the support roster",
        ))
    }
}

pub fn require_admin(role: Role) -> Result<(), AppError> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::forbidden("Only admins may manage users"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn user(id: &str, role: Role) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            role,
        }
    }

    const TICKET: TicketAccess<'static> = TicketAccess {
        creator_id: "creator",
        assignee_id: Some("assignee"),
    };

    #[test]
    fn test_staff_access_everything() {
        assert!(can_access(&user("other", Role::Agent), &TICKET));
        assert!(can_access(&user("other", Role::Admin), &TICKET));
    }

    #[test]
    fn test_requester_access() {
        assert!(can_access(&user("creator", Role::Requester), &TICKET));
        assert!(can_access(&user("assignee", Role::Requester), &TICKET));
        assert!(!can_access(&user("other", Role::Requester), &TICKET));

        let err = ensure_access(&user("other", Role::Requester), &TICKET).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_workflow_fields() {
        let fields = [WorkflowField::Priority, WorkflowField::AssigneeId];
        let err = ensure_workflow_fields_allowed(Role::Requester, &fields, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.field.as_deref(), Some("priority"));

        assert!(ensure_workflow_fields_allowed(Role::Requester, &[], "nope").is_ok());
        assert!(ensure_workflow_fields_allowed(Role::Agent, &fields, "nope").is_ok());
    }

    #[test]
    fn test_require_staff_and_admin() {
        assert!(require_staff(Role::Agent).is_ok());
        assert!(require_staff(Role::Requester).is_err());
        assert!(require_admin(Role::Admin).is_ok());
        assert!(require_admin(Role::Agent).is_err());
    }
}
