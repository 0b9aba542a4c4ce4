//! Error normalizer: every handler failure becomes an `AppError`, and `AppError`
//! is the only thing that produces user-visible error output.

use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use farmstand_core::DomainError;
use farmstand_infra::StoreError;

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";
pub const VALIDATION_PREFIX: &str = "Validation Failed...";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    pub fn product_not_found() -> Self {
        AppError::NotFound("Product not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Connectivity(_) | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client, if any. Server-side detail stays in the logs.
    pub fn public_message(&self) -> Option<String> {
        match self {
            AppError::Validation(msg) | AppError::MalformedIdentifier(msg) => {
                Some(format!("{VALIDATION_PREFIX}{msg}"))
            }
            AppError::NotFound(msg) => Some(msg.clone()),
            AppError::Connectivity(_) | AppError::Unknown(_) => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::InvalidId(msg) => AppError::MalformedIdentifier(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => e.into(),
            StoreError::Connectivity(msg) => AppError::Connectivity(msg),
            StoreError::Backend(msg) => AppError::Unknown(msg),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedIdentifier(rejection.body_text())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Unknown(format!("template rendering failed: {err:#}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let message = self
            .public_message()
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        (status, message).into_response()
    }
}
