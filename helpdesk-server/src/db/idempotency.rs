//! Idempotency record queries

use sqlx::SqlitePool;

/// Stored outcome of a mutating request
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdempotencyRecord {
    pub key: String,
    pub user_id: Option<String>,
    pub method: String,
    pub path: String,
    pub request_hash: String,
    pub response_body: Vec<u8>,
    pub response_status: i64,
    pub created_at: i64,
}

pub async fn find(pool: &SqlitePool, key: &str) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
    sqlx::query_as(
        "SELECT key, user_id, method, path, request_hash, response_body, response_status, created_at \
         FROM idempotency_keys WHERE key = ?",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// Insert or replace the record for `record.key`
pub async fn upsert(pool: &SqlitePool, record: &IdempotencyRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO idempotency_keys \
         (key, user_id, method, path, request_hash, response_body, response_status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (key) DO UPDATE SET \
           user_id = excluded.user_id, \
           method = excluded.method, \
           path = excluded.path, \
           request_hash = excluded.request_hash, \
           response_body = excluded.response_body, \
           response_status = excluded.response_status, \
           created_at = excluded.created_at",
    )
    .bind(&record.key)
    .bind(&record.user_id)
    .bind(&record.method)
    .bind(&record.path)
    .bind(&record.request_hash)
    .bind(&record.response_body)
    .bind(record.response_status)
    .bind(record.created_at)
    .execute(pool)
    .await?;
    Ok(())
}
