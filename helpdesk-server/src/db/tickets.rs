//! Ticket row queries

use shared::models::{Role, Ticket};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

use super::escape_like;
use crate::tickets::{TicketFilters, TicketPatch};

const TICKET_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, t.category, \
     t.creator_id, creator.full_name AS creator_name, \
     t.assignee_id, assignee.full_name AS assignee_name, \
     t.sla_due_at, t.sla_breached, t.latest_comment_excerpt, t.latest_comment_at, \
     t.version, t.created_at, t.updated_at \
     FROM tickets t \
     JOIN users creator ON creator.id = t.creator_id \
     LEFT JOIN users assignee ON assignee.id = t.assignee_id";

/// Row values for a freshly created ticket
#[derive(Debug)]
pub struct TicketInsert<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub priority: shared::models::TicketPriority,
    pub category: Option<&'a str>,
    pub creator_id: &'a str,
    pub assignee_id: Option<&'a str>,
    pub sla_due_at: i64,
    pub now: i64,
}

pub async fn insert(conn: &mut SqliteConnection, row: &TicketInsert<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tickets (id, title, description, status, priority, category, creator_id, \
         assignee_id, sla_due_at, sla_breached, version, created_at, updated_at) \
         VALUES (?, ?, ?, 'open', ?, ?, ?, ?, ?, 0, 0, ?, ?)",
    )
    .bind(row.id)
    .bind(row.title)
    .bind(row.description)
    .bind(row.priority)
    .bind(row.category)
    .bind(row.creator_id)
    .bind(row.assignee_id)
    .bind(row.sla_due_at)
    .bind(row.now)
    .bind(row.now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find(conn: impl SqliteExecutor<'_>, id: &str) -> Result<Option<Ticket>, sqlx::Error> {
    let sql = format!("{TICKET_SELECT} WHERE t.id = ?");
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Take the database write lock by touching the row without changing it
///
/// Returns `false` when the ticket does not exist.
pub async fn lock(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE tickets SET version = version WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write changed fields and bump the version, guarded on `expected_version`
///
/// Returns the number of rows written (0 when the version moved).
pub async fn apply_patch(
    conn: &mut SqliteConnection,
    id: &str,
    expected_version: i64,
    patch: &TicketPatch,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("UPDATE tickets SET version = version + 1, updated_at = ");
    builder.push_bind(now);

    if let Some(title) = &patch.title {
        builder.push(", title = ").push_bind(title.as_str());
    }
    if let Some(description) = &patch.description {
        builder.push(", description = ").push_bind(description.as_str());
    }
    if let Some(status) = patch.status {
        builder.push(", status = ").push_bind(status);
    }
    if let Some(priority) = patch.priority {
        builder.push(", priority = ").push_bind(priority);
    }
    if let Some(due) = patch.sla_due_at {
        builder
            .push(", sla_due_at = ")
            .push_bind(due)
            .push(", sla_breached = 0");
    }
    if let Some(category) = &patch.category {
        builder.push(", category = ").push_bind(category.as_deref());
    }
    if let Some(assignee_id) = &patch.assignee_id {
        builder.push(", assignee_id = ").push_bind(assignee_id.as_deref());
    }

    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" AND version = ")
        .push_bind(expected_version);

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// Record the latest comment on the ticket row; does not touch `version`
pub async fn set_latest_comment(
    conn: &mut SqliteConnection,
    id: &str,
    excerpt: &str,
    at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tickets SET latest_comment_excerpt = ?, latest_comment_at = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(excerpt)
    .bind(at)
    .bind(at)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Flag tickets whose SLA has elapsed; never clears a flag
pub async fn mark_breached(pool: &SqlitePool, now: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tickets SET sla_breached = 1, updated_at = ? \
         WHERE sla_due_at <= ? AND sla_breached = 0 AND status NOT IN ('resolved', 'closed')",
    )
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// One page of tickets plus a look-ahead row (`limit + 1` rows at most)
pub async fn list(pool: &SqlitePool, filters: &TicketFilters) -> Result<Vec<Ticket>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(TICKET_SELECT);
    builder.push(" WHERE 1 = 1");

    if filters.role == Role::Requester {
        builder
            .push(" AND (t.creator_id = ")
            .push_bind(filters.requester_id.as_str())
            .push(" OR t.assignee_id = ")
            .push_bind(filters.requester_id.as_str())
            .push(")");
    }
    if let Some(status) = filters.status {
        builder.push(" AND t.status = ").push_bind(status);
    }
    if let Some(assignee_id) = &filters.assignee_id {
        builder.push(" AND t.assignee_id = ").push_bind(assignee_id.as_str());
    }
    if let Some(breached) = filters.breached {
        builder.push(" AND t.sla_breached = ").push_bind(breached);
    }
    if let Some(q) = filters.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
        builder
            .push(" AND (LOWER(t.title) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(t.description) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(COALESCE(t.latest_comment_excerpt, '')) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    builder
        .push(" ORDER BY t.created_at DESC, t.rowid DESC LIMIT ")
        .push_bind(filters.limit.saturating_add(1))
        .push(" OFFSET ")
        .push_bind(filters.offset);

    builder.build_query_as().fetch_all(pool).await
}
