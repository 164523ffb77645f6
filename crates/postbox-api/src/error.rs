use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use thiserror::Error;
use tracing::error;

use postbox_types::api::ErrorResponse;

/// Everything a handler can reject a request with. The validation variants
/// surface as 400s with the message in the `error_message` body field;
/// storage failures surface as opaque 500s.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request does not have JSON content")]
    InvalidContentType,

    /// All absent field names, alphabetically sorted, reported together.
    #[error("Missing required fields: {}", fmt_field_list(.0))]
    MissingFields(Vec<String>),

    #[error("Missing required recipient field")]
    MissingRecipient,

    #[error("'limit' and 'all' are mutually exclusive options")]
    MutuallyExclusiveOptions,

    #[error("Invalid value for field '{0}'")]
    InvalidField(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Renders names in list-literal form: `['recipients', 'sender', 'text']`.
fn fmt_field_list(fields: &[String]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| format!("'{}'", f)).collect();
    format!("[{}]", quoted.join(", "))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Internal(err) => {
                error!("request failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };

        (
            status,
            Json(ErrorResponse {
                error_message: self.to_string(),
            }),
        )
            .into_response()
    }
}
