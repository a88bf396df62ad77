//! User queries

use shared::models::{PublicUser, Role, TeamMember, UserSummary};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

/// Full user row, including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
        }
    }
}

/// Insert a user; the email must already be normalized
pub async fn create(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    full_name: &str,
    role: Role,
    password_hash: &str,
    now: i64,
) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO users (id, email, full_name, role, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING id, email, full_name, role, password_hash, created_at, updated_at",
    )
    .bind(id)
    .bind(email)
    .bind(full_name)
    .bind(role)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, email, full_name, role, password_hash, created_at, updated_at \
         FROM users WHERE email = LOWER(?)",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, email, full_name, role, password_hash, created_at, updated_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn exists(conn: impl SqliteExecutor<'_>, id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

pub async fn update_role(
    pool: &SqlitePool,
    id: &str,
    role: Role,
    now: i64,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE users SET role = ?, updated_at = ? WHERE id = ? \
         RETURNING id, email, full_name, role, password_hash, created_at, updated_at",
    )
    .bind(role)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Agents and admins, ordered by name
pub async fn list_staff(pool: &SqlitePool) -> Result<Vec<TeamMember>, sqlx::Error> {
    let rows: Vec<(String, String, String, Role)> = sqlx::query_as(
        "SELECT id, full_name, email, role FROM users \
         WHERE role IN ('agent', 'admin') ORDER BY full_name ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, full_name, email, role)| TeamMember {
            id,
            full_name,
            email,
            role,
        })
        .collect())
}

/// Directory entries for the given ids; unknown ids are skipped
pub async fn summaries(
    conn: impl SqliteExecutor<'_>,
    ids: &[&str],
) -> Result<Vec<UserSummary>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, full_name, role FROM users WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    builder.build_query_as().fetch_all(conn).await
}
