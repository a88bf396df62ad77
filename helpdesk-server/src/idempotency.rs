//! Idempotency Layer
//!
//! A mutating request carrying an `Idempotency-Key` header runs at most once
//! per key: the first response is stored and later requests with the same
//! key get it back verbatim, flagged with `X-Idempotent-Replay: 1`.
//!
//! Server errors and retryable rejections (version conflicts, throttling)
//! are not stored, so retrying with the same key runs the request again.
//!
//! Keys are global (not scoped by user or path). Two first-time requests
//! racing on one key may both execute; the later response wins the record.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, Method, StatusCode, header};
use shared::error::{AppError, ErrorCode};

use crate::auth::CurrentUser;
use crate::db::idempotency::{self as records, IdempotencyRecord};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_request, now_millis};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
pub const REPLAY_HEADER: &str = "x-idempotent-replay";

/// Largest request body buffered for fingerprinting
const MAX_REQUEST_BYTES: usize = 1024 * 1024;

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Idempotency middleware; must run after authentication
pub async fn idempotency(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !is_mutating(req.method()) {
        return next.run(req).await;
    }

    let Some(key) = req
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
    else {
        return next.run(req).await;
    };

    match records::find(&state.pool, &key).await {
        Ok(Some(record)) => {
            tracing::info!(key = %key, path = %record.path, "Replaying idempotent response");
            return replay(record);
        }
        Ok(None) => {}
        Err(e) => return ServiceError::from(e).into_response(),
    }

    let (parts, body) = req.into_parts();
    let request_body = match axum::body::to_bytes(body, MAX_REQUEST_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return AppError::validation("Request body too large").into_response(),
    };

    let method = parts.method.to_string();
    let path = parts.uri.path().to_owned();
    let request_hash = hash_request(
        &method,
        &path,
        parts.uri.query().unwrap_or_default(),
        &request_body,
    );
    let user_id = parts.extensions.get::<CurrentUser>().map(|u| u.id.clone());

    let response = next
        .run(Request::from_parts(parts, Body::from(request_body)))
        .await;

    // Server errors and retryable rejections are not remembered so a retry re-executes
    let retryable = response
        .extensions()
        .get::<ErrorCode>()
        .is_some_and(ErrorCode::is_retryable);
    if retryable || response.status().is_server_error() {
        tracing::debug!(key = %key, status = %response.status(), "Not storing retryable response");
        return response;
    }

    let (parts, body) = response.into_parts();
    let response_body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let record = IdempotencyRecord {
        key,
        user_id,
        method,
        path,
        request_hash,
        response_body: response_body.to_vec(),
        response_status: i64::from(parts.status.as_u16()),
        created_at: now_millis(),
    };
    if let Err(e) = records::upsert(&state.pool, &record).await {
        tracing::warn!(key = %record.key, error = %e, "Failed to persist idempotency record");
    }

    Response::from_parts(parts, Body::from(response_body))
}

fn replay(record: IdempotencyRecord) -> Response {
    let status = u16::try_from(record.response_status)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    let mut response = Response::new(Body::from(record.response_body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(REPLAY_HEADER, HeaderValue::from_static("1"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_mutating() {
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PATCH));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::DELETE));
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(!is_mutating(&Method::OPTIONS));
    }

    #[tokio::test]
    async fn test_replay_sets_headers() {
        let record = IdempotencyRecord {
            key: "k".into(),
            user_id: None,
            method: "POST".into(),
            path: "/api/tickets".into(),
            request_hash: String::new(),
            response_body: br#"{"data":{}}"#.to_vec(),
            response_status: 201,
            created_at: 0,
        };
        let response = replay(record);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[REPLAY_HEADER], "1");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"data":{}}"#);
    }
}
