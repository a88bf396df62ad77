//! Ticket domain: inputs, filters and the [`TicketStore`]

mod store;
pub mod view;

pub use store::{TicketPatch, TicketStore, diff_changes};

use shared::models::{Role, TicketPriority, TicketStatus};

/// Maximum characters kept in `latest_comment_excerpt`
pub const EXCERPT_MAX_CHARS: usize = 280;
/// Default page size for ticket listing
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Upper bound on the page size for ticket listing
pub const MAX_PAGE_SIZE: i64 = 50;

/// Input for [`TicketStore::create`]
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub category: Option<String>,
    pub creator_id: String,
    pub assignee_id: Option<String>,
}

/// Requested field changes for [`TicketStore::update`]
///
/// `None` leaves a field untouched. For `category` and `assignee_id`,
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
}

/// Input for [`TicketStore::add_comment`]
#[derive(Debug, Clone)]
pub struct NewComment {
    pub ticket_id: String,
    pub author_id: String,
    pub body: String,
    pub parent_comment_id: Option<String>,
}

/// Listing filters; `requester_id`/`role` scope what the caller may see
#[derive(Debug, Clone)]
pub struct TicketFilters {
    pub requester_id: String,
    pub role: Role,
    pub status: Option<TicketStatus>,
    pub assignee_id: Option<String>,
    pub breached: Option<bool>,
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl TicketFilters {
    /// Unfiltered first page for a caller
    pub fn for_user(requester_id: impl Into<String>, role: Role) -> Self {
        Self {
            requester_id: requester_id.into(),
            role,
            status: None,
            assignee_id: None,
            breached: None,
            q: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(500)), 50);
    }
}
