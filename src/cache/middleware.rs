//! Serves cached pages for GET requests and stores fresh 200 responses.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, instrument};

use super::store::{CachedResponse, ResponseCache};
use crate::auth::SESSION_COOKIE;

/// Larger pages are served but not stored.
const MAX_CACHED_BODY: usize = 1024 * 1024;

/// Pages render the signed-in username, so the session is part of the key.
fn cache_key(request: &Request) -> String {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let session = CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default();
    format!("{target}|{session}")
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn cache_page(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if !cache.is_enabled() || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);
    if let Some(cached) = cache.get(&key).await {
        debug!(outcome = "hit", "serving cached page");
        return build_response(cached);
    }
    debug!(outcome = "miss", "rendering page");

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer page for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if bytes.len() > MAX_CACHED_BODY {
        debug!(bytes = bytes.len(), "page too large to cache");
        return Response::from_parts(parts, Body::from(bytes));
    }

    let mut headers = parts.headers.clone();
    headers.remove(header::SET_COOKIE);
    cache
        .insert(
            key,
            CachedResponse {
                status: parts.status.as_u16(),
                headers,
                body: bytes.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(bytes))
}

fn build_response(cached: CachedResponse) -> Response {
    let status = StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK);
    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = status;
    *response.headers_mut() = cached.headers;
    response
}
