use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("API error: {error_type} - {message}")]
    Api { error_type: String, message: String },

    #[error("not found: {error_type} - {message}")]
    NotFound { error_type: String, message: String },

    #[error("transaction has no id; it must be charged before it can be refunded")]
    NotPaid,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in API response: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps a non-200 response onto the remote-reported error, pulling
    /// `type` and `message` from the first entry of the body's `errors`
    /// array. 404 gets its own variant so callers can match on it.
    pub(crate) fn from_api_response(status: StatusCode, body: &str) -> Self {
        let (error_type, message) = parse_error_body(body);

        if status == StatusCode::NOT_FOUND {
            Error::NotFound {
                error_type,
                message,
            }
        } else {
            Error::Api {
                error_type,
                message,
            }
        }
    }
}

fn parse_error_body(body: &str) -> (String, String) {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|data| {
            let entry = data.get("errors")?.get(0)?;
            let error_type = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let message = entry
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some((error_type, message))
        })
        .unwrap_or_else(|| ("unknown".to_string(), body.trim().to_string()))
}
