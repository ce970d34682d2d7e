use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::estimator::ShellError;
use crate::services::exporter::ExportError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Text the form shows to the user
    pub message: String,
    /// Whether the export action is still enabled
    pub exportable: bool,
}

#[derive(Debug)]
pub enum AppError {
    Shell(ShellError),
    Export(ExportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Shell(ShellError::MissingInput) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
            AppError::Shell(ShellError::InvalidInput) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::Shell(ShellError::FetchFailed) => (StatusCode::BAD_GATEWAY, "FETCH_FAILED"),
            AppError::Export(ExportError::NotExportable) => (StatusCode::CONFLICT, "NOT_EXPORTABLE"),
            AppError::Export(ExportError::InvalidDestination(_)) => (StatusCode::BAD_REQUEST, "INVALID_DESTINATION"),
            AppError::Export(ExportError::Io { .. }) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
        };
        let message = match &self {
            AppError::Shell(e) => e.to_string(),
            AppError::Export(e) => e.to_string(),
        };
        // A rejected or failed write leaves the displayed result exportable
        let exportable = matches!(
            self,
            AppError::Export(ExportError::Io { .. } | ExportError::InvalidDestination(_))
        );
        let body = ApiError {
            code: code.to_string(),
            message,
            exportable,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ShellError> for AppError {
    fn from(e: ShellError) -> Self {
        AppError::Shell(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}
