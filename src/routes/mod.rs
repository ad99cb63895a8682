pub mod auth;
pub mod comments;
pub mod follows;
pub mod posts;
pub mod web;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::AppState;

/// 302 Found to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn create_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(posts::routes(state))
        .merge(comments::routes())
        .merge(follows::routes())
        .nest("/auth", auth::routes())
        .merge(web::routes())
        .nest_service("/media", ServeDir::new(state.media.root()))
        .fallback(web::not_found)
}

/// The full application with middleware and state applied.
pub fn build_app(state: AppState) -> Router {
    create_routes(&state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .with_state(state)
}
