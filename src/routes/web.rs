use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;

use crate::auth::MaybeUser;
use crate::views::{self, Layout, NotFoundTemplate};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "storage": state.db.backend_name(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "storage": state.db.backend_name(),
                })),
            )
                .into_response()
        }
    }
}

/// Any path no route matches.
pub async fn not_found(viewer: MaybeUser) -> Response {
    let page = views::render(NotFoundTemplate {
        layout: Layout::new("Page not found", viewer.username()),
        what: "This page".to_string(),
    });
    match page {
        Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render not found page");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
