//! Event Recorder
//!
//! Appends immutable audit events. Recording takes a connection borrowed
//! from the caller's transaction, so an event commits or rolls back together
//! with the mutation that caused it.

use shared::models::{EventPayload, TicketEvent};
use sqlx::{SqliteConnection, SqliteExecutor};

use crate::util::new_id;

/// Append one event for `ticket_id`; `actor_id` is `None` for system actions
pub async fn record(
    conn: &mut SqliteConnection,
    ticket_id: &str,
    actor_id: Option<&str>,
    payload: &EventPayload,
    now: i64,
) -> Result<String, sqlx::Error> {
    let id = new_id();
    sqlx::query(
        "INSERT INTO ticket_events (id, ticket_id, actor_id, type, payload, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(ticket_id)
    .bind(actor_id)
    .bind(payload.event_type())
    .bind(sqlx::types::Json(payload.payload_json()))
    .bind(now)
    .execute(conn)
    .await?;

    tracing::debug!(ticket_id, event_type = payload.event_type(), "Recorded ticket event");
    Ok(id)
}

/// Events of a ticket in recording order
pub async fn list_for_ticket(
    conn: impl SqliteExecutor<'_>,
    ticket_id: &str,
) -> Result<Vec<TicketEvent>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, ticket_id, actor_id, type, payload, created_at \
         FROM ticket_events WHERE ticket_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(ticket_id)
    .fetch_all(conn)
    .await
}
