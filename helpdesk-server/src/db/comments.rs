//! Comment queries

use shared::models::Comment;
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn insert(conn: &mut SqliteConnection, comment: &Comment) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ticket_comments (id, ticket_id, author_id, body, parent_comment_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&comment.id)
    .bind(&comment.ticket_id)
    .bind(&comment.author_id)
    .bind(&comment.body)
    .bind(&comment.parent_comment_id)
    .bind(comment.created_at)
    .bind(comment.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Comments of a ticket in creation order
pub async fn list_for_ticket(
    conn: impl SqliteExecutor<'_>,
    ticket_id: &str,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, ticket_id, author_id, body, parent_comment_id, created_at, updated_at \
         FROM ticket_comments WHERE ticket_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(ticket_id)
    .fetch_all(conn)
    .await
}
