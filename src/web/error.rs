use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::db::services::csv_import::ImportError;
use crate::db::services::{PodError, VpsError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to a client. Server-side failures are logged and
    /// replaced by a generic text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::DatabaseError(msg) | AppError::InternalServerError(msg) => {
                error!(error = %msg, "Request failed with an internal error.");
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::InternalServerError(format!("Template rendering failed: {err:?}"))
    }
}

impl From<PodError> for AppError {
    fn from(err: PodError) -> Self {
        match err {
            PodError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            PodError::NotFound(slug) => AppError::NotFound(format!("Pod '{slug}' not found")),
            PodError::InvalidInput(msg) => AppError::InvalidInput(msg),
            PodError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl From<VpsError> for AppError {
    fn from(err: VpsError) -> Self {
        match err {
            VpsError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            VpsError::NotFound(slug) => {
                AppError::NotFound(format!("VPS server '{slug}' not found"))
            }
            VpsError::UnknownPod(pod) => AppError::InvalidInput(format!("Unknown pod '{pod}'")),
            VpsError::InvalidInput(msg) => AppError::InvalidInput(msg),
            VpsError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Error for HTML routes: same status mapping as [`AppError`], rendered as a
/// plain error page instead of JSON.
#[derive(Debug)]
pub struct PageError(pub AppError);

macro_rules! page_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for PageError {
                fn from(err: $source) -> Self {
                    PageError(err.into())
                }
            }
        )*
    };
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

page_error_from!(sea_orm::DbErr, tera::Error, PodError, VpsError, ImportError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = tera::escape_html(&self.0.public_message());
        let title = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<h1>{code} {title}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to dashboard</a></p>\n</body>\n</html>\n",
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::DatabaseError("constraint pods_pkey".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_pod_not_found_maps_to_404() {
        let err: AppError = PodError::NotFound("core".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
