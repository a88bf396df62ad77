//! Comment Model

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Comment row (immutable once created)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: String,
    pub ticket_id: String,
    pub author_id: String,
    pub body: String,
    pub parent_comment_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Comment with its direct replies, as produced by
/// [`build_comment_tree`](crate::comment_tree::build_comment_tree)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Wire representation of a comment node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub body: String,
    pub author_id: String,
    pub author_name: String,
    pub author_role: Role,
    pub parent_comment_id: Option<String>,
    pub created_at: i64,
    pub replies: Vec<CommentView>,
}
