//! Ticket Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::comment::CommentView;
use super::event::TimelineEntry;
use super::user::UserSummary;
use crate::error::{AppError, ErrorCode};

/// Ticket status
///
/// Any status is reachable from any other; transition policy belongs to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Parse a wire label, failing with `INVALID_STATUS`
    pub fn parse(label: &str) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == label)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidStatus).with_field("status"))
    }

    /// Resolved and closed tickets no longer run an SLA clock
    pub const fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }

    /// Parse a wire label, failing with `INVALID_PRIORITY`
    pub fn parse(label: &str) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == label)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidPriority).with_field("priority"))
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket row joined with creator/assignee display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: Option<String>,
    pub creator_id: String,
    pub creator_name: String,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub sla_due_at: i64,
    pub sla_breached: bool,
    pub latest_comment_excerpt: Option<String>,
    pub latest_comment_at: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// List item: every ticket field except the description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub id: String,
    pub title: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: Option<String>,
    pub creator_id: String,
    pub creator_name: String,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub sla_due_at: i64,
    pub sla_breached: bool,
    pub latest_comment_excerpt: Option<String>,
    pub latest_comment_at: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Ticket> for TicketSummary {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            status: t.status,
            priority: t.priority,
            category: t.category,
            creator_id: t.creator_id,
            creator_name: t.creator_name,
            assignee_id: t.assignee_id,
            assignee_name: t.assignee_name,
            sla_due_at: t.sla_due_at,
            sla_breached: t.sla_breached,
            latest_comment_excerpt: t.latest_comment_excerpt,
            latest_comment_at: t.latest_comment_at,
            version: t.version,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Full ticket view: summary, description, participants, comment forest, timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    #[serde(flatten)]
    pub summary: TicketSummary,
    pub description: String,
    pub participants: BTreeMap<String, UserSummary>,
    pub comments: Vec<CommentView>,
    pub timeline: Vec<TimelineEntry>,
}

/// One page of ticket summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub items: Vec<TicketSummary>,
    /// Offset of the next page, `None` once exhausted
    pub next_offset: Option<i64>,
}
