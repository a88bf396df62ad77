//! Ticket Store
//!
//! Owns ticket rows. Mutations run in one transaction that takes the SQLite
//! write lock up front (a no-op write on the ticket row), checks the expected
//! version, writes the changed fields and records one event per change.

use shared::error::AppError;
use shared::models::{
    Comment, EventPayload, Ticket, TicketDetail, TicketPage, TicketPriority, TicketStatus,
    TicketSummary,
};
use shared::sla;
use sqlx::SqlitePool;

use super::{EXCERPT_MAX_CHARS, NewComment, NewTicket, TicketChanges, TicketFilters, view};
use crate::db::{self, tickets::TicketInsert};
use crate::error::ServiceResult;
use crate::util::{new_id, truncate_chars};

/// Column values an update actually changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    /// Set together with `priority`; also clears the breach flag
    pub sla_due_at: Option<i64>,
    pub category: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
}

/// Compare requested changes with the stored row
///
/// Returns the fields that differ and one event per changed field, in the
/// order title, description, status, priority, category, assignee.
pub fn diff_changes(
    existing: &Ticket,
    changes: TicketChanges,
    now: i64,
) -> (TicketPatch, Vec<EventPayload>) {
    let mut patch = TicketPatch::default();
    let mut events = Vec::new();

    if let Some(title) = changes.title.filter(|t| *t != existing.title) {
        events.push(EventPayload::TitleUpdated {
            title: title.clone(),
        });
        patch.title = Some(title);
    }

    if let Some(description) = changes.description.filter(|d| *d != existing.description) {
        events.push(EventPayload::DescriptionUpdated {});
        patch.description = Some(description);
    }

    if let Some(status) = changes.status.filter(|s| *s != existing.status) {
        events.push(EventPayload::StatusChanged {
            from: existing.status,
            to: status,
        });
        patch.status = Some(status);
    }

    if let Some(priority) = changes.priority.filter(|p| *p != existing.priority) {
        events.push(EventPayload::PriorityChanged {
            from: existing.priority,
            to: priority,
        });
        patch.priority = Some(priority);
        patch.sla_due_at = Some(sla::due_at(priority, now));
    }

    if let Some(category) = changes.category.filter(|c| *c != existing.category) {
        events.push(EventPayload::CategoryChanged {
            category: category.clone(),
        });
        patch.category = Some(category);
    }

    if let Some(assignee_id) = changes.assignee_id.filter(|a| *a != existing.assignee_id) {
        events.push(EventPayload::AssigneeChanged {
            from: existing.assignee_id.clone(),
            to: assignee_id.clone(),
        });
        patch.assignee_id = Some(assignee_id);
    }

    (patch, events)
}

#[derive(Clone)]
pub struct TicketStore {
    pool: SqlitePool,
}

impl TicketStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a ticket at version 0 with a `TICKET_CREATED` event
    pub async fn create(&self, new: NewTicket, now: i64) -> ServiceResult<TicketDetail> {
        let id = new_id();
        let sla_due_at = sla::due_at(new.priority, now);

        let mut tx = self.pool.begin().await?;

        if let Some(assignee_id) = &new.assignee_id {
            ensure_user_exists(&mut tx, assignee_id).await?;
        }

        db::tickets::insert(
            &mut tx,
            &TicketInsert {
                id: &id,
                title: &new.title,
                description: &new.description,
                priority: new.priority,
                category: new.category.as_deref(),
                creator_id: &new.creator_id,
                assignee_id: new.assignee_id.as_deref(),
                sla_due_at,
                now,
            },
        )
        .await?;

        db::events::record(
            &mut tx,
            &id,
            Some(&new.creator_id),
            &EventPayload::TicketCreated {
                priority: new.priority,
                assignee_id: new.assignee_id.clone(),
            },
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            ticket_id = %id,
            creator_id = %new.creator_id,
            priority = %new.priority,
            sla_due_at,
            "Ticket created"
        );

        self.get(&id, now).await
    }

    /// Ticket row with names, after a breach sweep; `None` if absent
    pub async fn find(&self, id: &str, now: i64) -> ServiceResult<Option<Ticket>> {
        self.sweep_breaches(now).await?;
        Ok(db::tickets::find(&self.pool, id).await?)
    }

    /// Full detail view, after a breach sweep
    pub async fn get(&self, id: &str, now: i64) -> ServiceResult<TicketDetail> {
        self.sweep_breaches(now).await?;

        // One read transaction so the row, comments and events share a snapshot
        let mut tx = self.pool.begin().await?;
        let ticket = db::tickets::find(&mut *tx, id)
            .await?
            .ok_or_else(AppError::ticket_not_found)?;
        let comments = db::comments::list_for_ticket(&mut *tx, id).await?;
        let events = db::events::list_for_ticket(&mut *tx, id).await?;
        let ids = view::participant_ids(&ticket, &comments, &events);
        let directory = db::users::summaries(&mut *tx, &ids).await?;
        tx.commit().await?;

        Ok(view::ticket_detail(ticket, comments, events, directory))
    }

    /// One page of tickets, newest first, after a breach sweep
    pub async fn list(&self, filters: &TicketFilters, now: i64) -> ServiceResult<TicketPage> {
        self.sweep_breaches(now).await?;

        let mut rows = db::tickets::list(&self.pool, filters).await?;
        let limit = usize::try_from(filters.limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        Ok(TicketPage {
            items: rows.into_iter().map(TicketSummary::from).collect(),
            next_offset: has_more.then(|| filters.offset.saturating_add(filters.limit)),
        })
    }

    /// Apply changes if `expected_version` matches the stored version
    ///
    /// Nothing is written when no field actually changes.
    pub async fn update(
        &self,
        id: &str,
        changes: TicketChanges,
        expected_version: i64,
        actor_id: &str,
        now: i64,
    ) -> ServiceResult<TicketDetail> {
        let mut tx = self.pool.begin().await?;

        if !db::tickets::lock(&mut tx, id).await? {
            return Err(AppError::ticket_not_found().into());
        }
        let existing = db::tickets::find(&mut *tx, id)
            .await?
            .ok_or_else(AppError::ticket_not_found)?;

        if existing.version != expected_version {
            tracing::info!(
                ticket_id = %id,
                expected = expected_version,
                actual = existing.version,
                "Ticket version mismatch"
            );
            return Err(AppError::version_mismatch().into());
        }

        let (patch, events) = diff_changes(&existing, changes, now);
        if events.is_empty() {
            tx.rollback().await?;
            tracing::debug!(ticket_id = %id, "Update changed nothing");
            return self.get(id, now).await;
        }

        if let Some(Some(assignee_id)) = &patch.assignee_id {
            ensure_user_exists(&mut tx, assignee_id).await?;
        }

        let written = db::tickets::apply_patch(&mut tx, id, expected_version, &patch, now).await?;
        if written == 0 {
            return Err(AppError::version_mismatch().into());
        }

        for event in &events {
            db::events::record(&mut tx, id, Some(actor_id), event, now).await?;
        }

        tx.commit().await?;

        tracing::info!(
            ticket_id = %id,
            version = expected_version + 1,
            changes = events.len(),
            "Ticket updated"
        );

        self.get(id, now).await
    }

    /// Append a comment and refresh the latest-comment fields
    ///
    /// The ticket version is left unchanged.
    pub async fn add_comment(&self, new: NewComment, now: i64) -> ServiceResult<TicketDetail> {
        let mut tx = self.pool.begin().await?;

        if !db::tickets::lock(&mut tx, &new.ticket_id).await? {
            return Err(AppError::ticket_not_found().into());
        }

        let comment = Comment {
            id: new_id(),
            ticket_id: new.ticket_id,
            author_id: new.author_id,
            body: new.body,
            parent_comment_id: new.parent_comment_id,
            created_at: now,
            updated_at: now,
        };
        db::comments::insert(&mut tx, &comment).await?;

        let excerpt = truncate_chars(&comment.body, EXCERPT_MAX_CHARS);
        db::tickets::set_latest_comment(&mut tx, &comment.ticket_id, excerpt, now).await?;

        db::events::record(
            &mut tx,
            &comment.ticket_id,
            Some(&comment.author_id),
            &EventPayload::CommentAdded {
                comment_id: comment.id.clone(),
                parent_comment_id: comment.parent_comment_id.clone(),
            },
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            ticket_id = %comment.ticket_id,
            comment_id = %comment.id,
            "Comment added"
        );

        self.get(&comment.ticket_id, now).await
    }

    /// Flag every ticket whose SLA elapsed at `now`; returns how many were flagged
    pub async fn sweep_breaches(&self, now: i64) -> ServiceResult<u64> {
        let flagged = db::tickets::mark_breached(&self.pool, now).await?;
        if flagged > 0 {
            tracing::info!(count = flagged, "Marked tickets as SLA breached");
        }
        Ok(flagged)
    }
}

async fn ensure_user_exists(conn: &mut sqlx::SqliteConnection, user_id: &str) -> ServiceResult<()> {
    if db::users::exists(conn, user_id).await? {
        Ok(())
    } else {
        Err(AppError::validation("Assignee does not exist")
            .with_field("assigneeId")
            .into())
    }
}
