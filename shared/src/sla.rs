//! SLA windows and breach evaluation
//!
//! Every priority maps to a fixed resolution window. A ticket is breached
//! once its due time has passed while it is still open or in progress.

use crate::models::{TicketPriority, TicketStatus};

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Resolution window for a priority, in milliseconds
pub const fn sla_window(priority: TicketPriority) -> i64 {
    match priority {
        TicketPriority::Urgent => 2 * HOUR_MS,
        TicketPriority::High => 6 * HOUR_MS,
        TicketPriority::Medium => 12 * HOUR_MS,
        TicketPriority::Low => 24 * HOUR_MS,
    }
}

/// Due timestamp for a ticket whose clock starts at `reference_ms`
pub const fn due_at(priority: TicketPriority, reference_ms: i64) -> i64 {
    reference_ms + sla_window(priority)
}

/// Like [`due_at`], but for a raw label; unknown labels get the medium window
pub fn due_at_for_label(label: &str, reference_ms: i64) -> i64 {
    let priority = TicketPriority::parse(label).unwrap_or(TicketPriority::Medium);
    due_at(priority, reference_ms)
}

/// Whether a ticket with this due time and status counts as breached at `now`
pub const fn is_breached(due_at: i64, status: TicketStatus, now: i64) -> bool {
    now >= due_at && !status.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_windows() {
        assert_eq!(due_at(TicketPriority::Urgent, T0) - T0, 2 * HOUR_MS);
        assert_eq!(due_at(TicketPriority::High, T0) - T0, 6 * HOUR_MS);
        assert_eq!(due_at(TicketPriority::Medium, T0) - T0, 12 * HOUR_MS);
        assert_eq!(due_at(TicketPriority::Low, T0) - T0, 24 * HOUR_MS);
    }

    #[test]
    fn test_label_matches_enum() {
        for priority in TicketPriority::ALL {
            assert_eq!(due_at_for_label(priority.as_str(), T0), due_at(priority, T0));
        }
    }

    #[test]
    fn test_unknown_label_uses_medium() {
        assert_eq!(due_at_for_label("critical", T0) - T0, 12 * HOUR_MS);
        assert_eq!(due_at_for_label("", T0) - T0, 12 * HOUR_MS);
    }

    #[test]
    fn test_is_breached() {
        let due = due_at(TicketPriority::Urgent, T0);
        assert!(!is_breached(due, TicketStatus::Open, due - 1));
        assert!(is_breached(due, TicketStatus::Open, due));
        assert!(is_breached(due, TicketStatus::InProgress, due + 1));
        assert!(!is_breached(due, TicketStatus::Resolved, due + 1));
        assert!(!is_breached(due, TicketStatus::Closed, due + 1));
    }
}
