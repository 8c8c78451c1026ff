use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sales_assistant_core::error::{self, ApiError};

/// HTTP-level failures of the skill endpoint.
///
/// Dialog failures are spoken, so the only thing that can go wrong at this
/// level is a body that is not a request envelope.
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => {
                tracing::warn!(request_id = %request_id, message = %message, "rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    ApiError {
                        error: error::codes::VALIDATION_FAILED.to_string(),
                        message,
                        field,
                        received,
                        request_id,
                        docs_hint,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}
