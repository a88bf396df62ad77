//! Ticket Handlers

use axum::extract::{Path, Query, State, rejection::QueryRejection};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{TeamMember, Ticket, TicketDetail, TicketPage, TicketPriority, TicketStatus};
use validator::Validate;

use crate::api::extract::deserialize_some;
use crate::api::{ApiResult, CreatedResult, ValidatedJson, created, ok};
use crate::auth::CurrentUser;
use crate::auth::policy::{
    TicketAccess, WorkflowField, ensure_access, ensure_workflow_fields_allowed, require_staff,
};
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::tickets::{NewComment, NewTicket, TicketChanges, TicketFilters, clamp_limit};
use crate::util::now_millis;

// ========== Request types ==========

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    pub priority: String,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Assignee id must not be empty"))]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assignee_id: Option<Option<String>>,
    #[validate(
        required(message = "Version is required"),
        range(min = 0, message = "Version must be a non-negative integer")
    )]
    pub version: Option<i64>,
}

impl UpdateTicketRequest {
    /// Staff-only fields present in the body, `null` included
    fn workflow_fields(&self) -> Vec<WorkflowField> {
        let mut fields = Vec::new();
        if self.status.is_some() {
            fields.push(WorkflowField::Status);
        }
        if self.priority.is_some() {
            fields.push(WorkflowField::Priority);
        }
        if self.assignee_id.is_some() {
            fields.push(WorkflowField::AssigneeId);
        }
        fields
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Comment body must not be empty"))]
    pub body: String,
    pub parent_comment_id: Option<String>,
}

/// Query string for `GET /api/tickets`; values are parsed by hand so bad
/// input maps onto our error codes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
    pub assignee_id: Option<String>,
    pub breached: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    fn into_filters(self, current: &CurrentUser) -> Result<TicketFilters, AppError> {
        let limit = match self.limit.as_deref() {
            Some(raw) => Some(parse_int(raw, "limit")?),
            None => None,
        };
        let offset = match self.offset.as_deref() {
            Some(raw) => parse_int(raw, "offset")?,
            None => 0,
        };
        if offset < 0 {
            return Err(AppError::validation("Offset must be non-negative").with_field("offset"));
        }
        let breached = match self.breached.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => {
                return Err(
                    AppError::validation("Breached must be true or false").with_field("breached")
                );
            }
            None => None,
        };

        Ok(TicketFilters {
            status: self.status.as_deref().map(TicketStatus::parse).transpose()?,
            assignee_id: self.assignee_id.filter(|s| !s.is_empty()),
            breached,
            q: self
                .q
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            limit: clamp_limit(limit),
            offset,
            ..TicketFilters::for_user(current.id.clone(), current.role)
        })
    }
}

fn parse_int(raw: &str, field: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("{field} must be an integer")).with_field(field))
}

// ========== Response types ==========

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: TicketDetail,
}

#[derive(Debug, Serialize)]
pub struct SupportTeamResponse {
    pub members: Vec<TeamMember>,
}

// ========== Handlers ==========

/// Load a ticket and run the access policy against it
async fn accessible_ticket(
    state: &AppState,
    current: &CurrentUser,
    id: &str,
    now: i64,
) -> Result<Ticket, AppError> {
    let ticket = state
        .tickets
        .find(id, now)
        .await?
        .ok_or_else(AppError::ticket_not_found)?;
    ensure_access(current, &TicketAccess::from(&ticket))?;
    Ok(ticket)
}

/// Open a new ticket
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateTicketRequest>,
) -> CreatedResult<TicketResponse> {
    if req.assignee_id.is_some() {
        ensure_workflow_fields_allowed(
            current.role,
            &[WorkflowField::AssigneeId],
            "Users cannot assign tickets at creation",
        )?;
    }
    let priority = TicketPriority::parse(&req.priority)?;

    let ticket = state
        .tickets
        .create(
            NewTicket {
                title: req.title,
                description: req.description,
                priority,
                category: req.category,
                creator_id: current.id,
                assignee_id: req.assignee_id,
            },
            now_millis(),
        )
        .await?;

    Ok(created(TicketResponse { ticket }))
}

/// Page through the tickets visible to the caller
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<TicketPage> {
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;
    let filters = query.into_filters(&current)?;
    let page = state.tickets.list(&filters, now_millis()).await?;
    Ok(ok(page))
}

/// Agents and admins, for assignment pickers
pub async fn support_team(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<SupportTeamResponse> {
    require_staff(current.role)?;
    let members = db::users::list_staff(&state.pool)
        .await
        .map_err(ServiceError::from)?;
    Ok(ok(SupportTeamResponse { members }))
}

/// Full ticket detail
pub async fn get(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<TicketResponse> {
    let now = now_millis();
    accessible_ticket(&state, &current, &id, now).await?;
    let ticket = state.tickets.get(&id, now).await?;
    Ok(ok(TicketResponse { ticket }))
}

/// Partial update guarded by the client's `version`
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTicketRequest>,
) -> ApiResult<TicketResponse> {
    let now = now_millis();
    accessible_ticket(&state, &current, &id, now).await?;
    ensure_workflow_fields_allowed(
        current.role,
        &req.workflow_fields(),
        "Users cannot modify ticket workflow fields",
    )?;

    let changes = TicketChanges {
        status: req.status.as_deref().map(TicketStatus::parse).transpose()?,
        priority: req.priority.as_deref().map(TicketPriority::parse).transpose()?,
        title: req.title,
        description: req.description,
        category: req.category,
        assignee_id: req.assignee_id,
    };
    // validated as required above
    let version = req.version.unwrap_or_default();

    let ticket = state
        .tickets
        .update(&id, changes, version, &current.id, now)
        .await?;
    Ok(ok(TicketResponse { ticket }))
}

/// Reply to a ticket, optionally threaded under another comment
pub async fn add_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> CreatedResult<TicketResponse> {
    let now = now_millis();
    accessible_ticket(&state, &current, &id, now).await?;

    let ticket = state
        .tickets
        .add_comment(
            NewComment {
                ticket_id: id,
                author_id: current.id,
                body: req.body,
                parent_comment_id: req.parent_comment_id,
            },
            now,
        )
        .await?;
    Ok(created(TicketResponse { ticket }))
}
