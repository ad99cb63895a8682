use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views::{self, ErrorTemplate, Layout, NotFoundTemplate};

// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Authentication error: {0}")]
    AuthError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] askama::Error),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::TemplateError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let rendered = match &self {
            AppError::NotFound(what) => {
                tracing::debug!(error = %self, "rendering not found page");
                views::render(NotFoundTemplate {
                    layout: Layout::new("Page not found", None),
                    what: what.clone(),
                })
            }
            _ => {
                if status.is_server_error() {
                    tracing::error!(error = %self, "request failed");
                } else {
                    tracing::warn!(error = %self, "request rejected");
                }
                let message = if status.is_server_error() {
                    "Something went wrong on our side. Please try again later.".to_string()
                } else {
                    self.to_string()
                };
                views::render(ErrorTemplate {
                    layout: Layout::new("Error", None),
                    status: status.as_u16(),
                    message,
                })
            }
        };

        match rendered {
            Ok(html) => (status, html).into_response(),
            Err(render_error) => {
                tracing::error!(error = %render_error, "failed to render error page");
                (status, Html(status.to_string())).into_response()
            }
        }
    }
}

// Convenient Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::NotFound("post".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("edit".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::DatabaseError("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::ValidationError("page".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_renders_html_page() {
        let response = AppError::NotFound("Post".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }
}
