//! Ticket events - immutable audit records
//!
//! Each event type carries its own typed payload. The database stores the
//! type tag and payload in separate columns; [`EventPayload::from_parts`]
//! reassembles them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ticket::{TicketPriority, TicketStatus};
use super::user::UserSummary;

/// Event row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TicketEvent {
    pub id: String,
    pub ticket_id: String,
    /// `None` for system-originated events
    pub actor_id: Option<String>,
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub event_type: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub payload: serde_json::Value,
    pub created_at: i64,
}

/// Typed event payload, keyed by event type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum EventPayload {
    TicketCreated {
        priority: TicketPriority,
        assignee_id: Option<String>,
    },
    TitleUpdated {
        title: String,
    },
    DescriptionUpdated {},
    StatusChanged {
        from: TicketStatus,
        to: TicketStatus,
    },
    PriorityChanged {
        from: TicketPriority,
        to: TicketPriority,
    },
    CategoryChanged {
        category: Option<String>,
    },
    AssigneeChanged {
        from: Option<String>,
        to: Option<String>,
    },
    CommentAdded {
        comment_id: String,
        parent_comment_id: Option<String>,
    },
}

impl EventPayload {
    /// Type tag as stored in the `type` column
    pub const fn event_type(&self) -> &'static str {
        match self {
            EventPayload::TicketCreated { .. } => "TICKET_CREATED",
            EventPayload::TitleUpdated { .. } => "TITLE_UPDATED",
            EventPayload::DescriptionUpdated {} => "DESCRIPTION_UPDATED",
            EventPayload::StatusChanged { .. } => "STATUS_CHANGED",
            EventPayload::PriorityChanged { .. } => "PRIORITY_CHANGED",
            EventPayload::CategoryChanged { .. } => "CATEGORY_CHANGED",
            EventPayload::AssigneeChanged { .. } => "ASSIGNEE_CHANGED",
            EventPayload::CommentAdded { .. } => "COMMENT_ADDED",
        }
    }

    /// Payload object without the type tag, as stored in the `payload` column
    pub fn payload_json(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map
                .remove("payload")
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            _ => serde_json::Value::Object(Default::default()),
        }
    }

    /// Reassemble a payload from its stored columns
    pub fn from_parts(
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let payload = if payload.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            payload.clone()
        };
        serde_json::from_value(serde_json::json!({ "type": event_type, "payload": payload }))
    }

    /// Human-readable timeline sentence
    pub fn describe(&self, actor: &str, participants: &BTreeMap<String, UserSummary>) -> String {
        match self {
            EventPayload::TicketCreated { .. } => format!("{actor} created the ticket"),
            EventPayload::StatusChanged { from, to } => format!(
                "{actor} changed status from {} to {}",
                label(from.as_str()),
                label(to.as_str())
            ),
            EventPayload::PriorityChanged { from, to } => format!(
                "{actor} changed priority from {} to {}",
                label(from.as_str()),
                label(to.as_str())
            ),
            EventPayload::AssigneeChanged { from, to } => format!(
                "{actor} reassigned the ticket from {} to {}",
                assignee_label(from.as_deref(), participants),
                assignee_label(to.as_deref(), participants)
            ),
            EventPayload::CategoryChanged { category } => format!(
                "{actor} set category to {}",
                category.as_deref().map(label).unwrap_or_else(|| "Unassigned".to_string())
            ),
            EventPayload::TitleUpdated { .. } => format!("{actor} updated the title"),
            EventPayload::DescriptionUpdated {} => format!("{actor} updated the description"),
            EventPayload::CommentAdded { .. } => format!("{actor} added a comment"),
        }
    }
}

/// Sentence for an event whose type this build does not know
pub fn describe_unknown(actor: &str, event_type: &str) -> String {
    format!("{actor} recorded {}", label(event_type))
}

fn label(value: &str) -> String {
    value.replace('_', " ")
}

fn assignee_label(id: Option<&str>, participants: &BTreeMap<String, UserSummary>) -> String {
    match id {
        Some(id) => participants
            .get(id)
            .map(|u| u.full_name.clone())
            .unwrap_or_else(|| "Unknown user".to_string()),
        None => "Unassigned".to_string(),
    }
}

/// Wire representation of a timeline entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    pub actor_id: Option<String>,
    pub actor_name: String,
    /// Actor role, or `"system"` for system-originated events
    pub actor_role: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    pub payload: serde_json::Value,
    pub created_at: i64,
}
