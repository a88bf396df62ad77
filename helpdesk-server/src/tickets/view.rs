//! Ticket detail shaping
//!
//! Turns stored rows into the wire view: participant directory, comment
//! forest with author names, and a described timeline.

use std::collections::{BTreeMap, BTreeSet};

use shared::comment_tree::build_comment_tree;
use shared::models::event::describe_unknown;
use shared::models::{
    Comment, CommentNode, CommentView, EventPayload, Role, Ticket, TicketDetail, TicketEvent,
    TicketSummary, TimelineEntry, UserSummary,
};

const SYSTEM_ACTOR: &str = "System";
const UNKNOWN_USER: &str = "Unknown user";

/// Every user a ticket references: creator, assignee, comment authors, event actors
pub fn participant_ids<'a>(
    ticket: &'a Ticket,
    comments: &'a [Comment],
    events: &'a [TicketEvent],
) -> Vec<&'a str> {
    let mut ids = BTreeSet::new();
    ids.insert(ticket.creator_id.as_str());
    if let Some(assignee) = &ticket.assignee_id {
        ids.insert(assignee.as_str());
    }
    ids.extend(comments.iter().map(|c| c.author_id.as_str()));
    ids.extend(events.iter().filter_map(|e| e.actor_id.as_deref()));
    ids.into_iter().collect()
}

/// Assemble the full detail view
pub fn ticket_detail(
    mut ticket: Ticket,
    comments: Vec<Comment>,
    events: Vec<TicketEvent>,
    directory: Vec<UserSummary>,
) -> TicketDetail {
    let participants: BTreeMap<String, UserSummary> = directory
        .into_iter()
        .map(|user| (user.id.clone(), user))
        .collect();

    let comments = build_comment_tree(comments)
        .into_iter()
        .map(|node| comment_view(node, &participants))
        .collect();

    let timeline = events
        .into_iter()
        .map(|event| timeline_entry(event, &participants))
        .collect();

    let description = std::mem::take(&mut ticket.description);
    TicketDetail {
        summary: TicketSummary::from(ticket),
        description,
        participants,
        comments,
        timeline,
    }
}

fn comment_view(node: CommentNode, participants: &BTreeMap<String, UserSummary>) -> CommentView {
    let author = participants.get(&node.comment.author_id);
    CommentView {
        author_name: author
            .map(|u| u.full_name.clone())
            .unwrap_or_else(|| UNKNOWN_USER.to_string()),
        author_role: author.map(|u| u.role).unwrap_or(Role::Requester),
        id: node.comment.id,
        body: node.comment.body,
        author_id: node.comment.author_id,
        parent_comment_id: node.comment.parent_comment_id,
        created_at: node.comment.created_at,
        replies: node
            .replies
            .into_iter()
            .map(|reply| comment_view(reply, participants))
            .collect(),
    }
}

fn timeline_entry(event: TicketEvent, participants: &BTreeMap<String, UserSummary>) -> TimelineEntry {
    let (actor_name, actor_role) = match event.actor_id.as_deref() {
        None => (SYSTEM_ACTOR.to_string(), "system".to_string()),
        Some(id) => match participants.get(id) {
            Some(user) => (user.full_name.clone(), user.role.as_str().to_string()),
            None => (UNKNOWN_USER.to_string(), Role::Requester.as_str().to_string()),
        },
    };

    let description = match EventPayload::from_parts(&event.event_type, &event.payload) {
        Ok(payload) => payload.describe(&actor_name, participants),
        Err(_) => describe_unknown(&actor_name, &event.event_type),
    };

    let payload = if event.payload.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        event.payload
    };

    TimelineEntry {
        id: event.id,
        actor_id: event.actor_id,
        actor_name,
        actor_role,
        event_type: event.event_type,
        description,
        payload,
        created_at: event.created_at,
    }
}
