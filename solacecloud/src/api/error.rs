use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {body}")]
    Status {
        status: u16,
        body: String,
        error: Option<ErrorPayload>,
    },

    #[error("Failed to encode request: {0}")]
    EncodeError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code()
            .is_some_and(|status| (500..=599).contains(&status))
    }
}

impl From<tfplug::Cancelled> for ApiError {
    fn from(_: tfplug::Cancelled) -> Self {
        ApiError::Cancelled
    }
}

/// Error body returned by the Mission Control API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub error_id: Option<String>,
}

/// Structured error body, tagged by the documented status it arrived with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    BadRequest(ErrorResponse),
    Unauthorized(ErrorResponse),
    Forbidden(ErrorResponse),
    NotFound(ErrorResponse),
    ServiceUnavailable(ErrorResponse),
}

impl ErrorPayload {
    /// Tag `response` with `status`, for the five statuses that carry a
    /// structured error body
    pub fn from_status(status: u16, response: ErrorResponse) -> Option<Self> {
        match status {
            400 => Some(ErrorPayload::BadRequest(response)),
            401 => Some(ErrorPayload::Unauthorized(response)),
            403 => Some(ErrorPayload::Forbidden(response)),
            404 => Some(ErrorPayload::NotFound(response)),
            503 => Some(ErrorPayload::ServiceUnavailable(response)),
            _ => None,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ErrorPayload::BadRequest(_) => 400,
            ErrorPayload::Unauthorized(_) => 401,
            ErrorPayload::Forbidden(_) => 403,
            ErrorPayload::NotFound(_) => 404,
            ErrorPayload::ServiceUnavailable(_) => 503,
        }
    }

    pub fn response(&self) -> &ErrorResponse {
        match self {
            ErrorPayload::BadRequest(r)
            | ErrorPayload::Unauthorized(r)
            | ErrorPayload::Forbidden(r)
            | ErrorPayload::NotFound(r)
            | ErrorPayload::ServiceUnavailable(r) => r,
        }
    }

    /// The message, when present and non-empty
    pub fn message(&self) -> Option<&str> {
        self.response()
            .message
            .as_deref()
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_tagging_follows_status() {
        let body = ErrorResponse {
            message: Some("nope".to_string()),
            error_id: Some("e-1".to_string()),
        };

        let payload = ErrorPayload::from_status(404, body.clone()).unwrap();
        assert_eq!(payload, ErrorPayload::NotFound(body.clone()));
        assert_eq!(payload.status(), 404);
        assert_eq!(payload.message(), Some("nope"));

        assert!(ErrorPayload::from_status(409, body).is_none());
    }

    #[test]
    fn empty_message_is_treated_as_absent() {
        let payload = ErrorPayload::from_status(
            400,
            ErrorResponse {
                message: Some(String::new()),
                error_id: None,
            },
        )
        .unwrap();
        assert_eq!(payload.message(), None);
    }

    #[test]
    fn error_body_parses_camel_case() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"message":"You cannot delete a service with deletion protection enabled.","errorId":"service-locked-error"}"#,
        )
        .unwrap();
        assert_eq!(body.error_id.as_deref(), Some("service-locked-error"));
    }

    #[test]
    fn only_5xx_status_errors_are_server_errors() {
        let unavailable = ApiError::Status {
            status: 503,
            body: String::new(),
            error: None,
        };
        assert!(unavailable.is_server_error());
        assert_eq!(unavailable.status_code(), Some(503));

        assert!(!ApiError::ParseError("bad".to_string()).is_server_error());
        assert!(!ApiError::Cancelled.is_server_error());
    }
}
