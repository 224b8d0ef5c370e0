//! Error classification for Mission Control responses
//!
//! [`classify`] turns an unexpected HTTP status into the diagnostic a user
//! sees. [`ReconcileError`] covers every way a lifecycle operation can fail
//! and maps each failure to exactly one diagnostic.

use tfplug::types::{AttributePath, Diagnostic};
use thiserror::Error;

use crate::api::{ApiError, ErrorPayload};
use crate::model::ConversionError;

const AUTHENTICATION_FAILED_DETAIL: &str = "Received HTTP 401 Unauthorized. Please check your authentication configuration:\n\n\
1. Verify your API token is correct and not expired\n\
2. Set the api_token in your provider configuration or use the SOLACECLOUD_API_TOKEN environment variable\n\
3. Ensure your API token has the necessary permissions to manage services\n\
4. Check that the base_url is correct for your Solace Cloud region\n\n\
Example provider configuration:\n\
provider \"solacecloud\" {\n  base_url  = \"https://api.solace.cloud/\"\n  api_token = \"your-api-token-here\"\n}\n\n\
Or set environment variable: export SOLACECLOUD_API_TOKEN=\"your-api-token-here\"";

const BAD_REQUEST_DETAIL: &str = "Received HTTP 400 Bad Request. This usually indicates a malformed request or missing required parameters. Check your request body and parameters.";

const FORBIDDEN_DETAIL: &str = "Received HTTP 403 Forbidden. This usually indicates that your API token does not have the necessary permissions to perform this action. Check your API token's permissions and ensure it has access to the requested resource.";

const NOT_FOUND_DETAIL: &str = "Received HTTP 404 Not Found. This usually indicates that the requested resource does not exist or has already been deleted. Check the resource ID and ensure it is correct.";

const SERVICE_UNAVAILABLE_DETAIL: &str = "Received HTTP 503 Service Unavailable. This usually indicates that the Solace Cloud API is temporarily unavailable. Try again later.";

const CONFLICT_DETAIL: &str = "Received HTTP 409 Conflict. This usually indicates that a resource with the same name already exists. ";

/// Marker the API puts in messages about services it does not know
const NOT_FOUND_MARKER: &str = "Could not find";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    AuthenticationFailed,
    Forbidden,
    NotFound,
    ResourceConflict,
    ServiceUnavailable,
    UnexpectedStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub summary: String,
    pub detail: String,
}

impl ClassifiedError {
    fn new(kind: ErrorKind, summary: &str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            summary: summary.to_string(),
            detail: detail.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary.clone(), self.detail.clone())
    }
}

fn payload_message(payload: Option<&ErrorPayload>, status: u16) -> Option<&str> {
    payload
        .filter(|payload| payload.status() == status)
        .and_then(ErrorPayload::message)
}

/// Classify `status` against the `expected` success status. Returns `None`
/// when they match. Payload messages are used for 400, 403, 404 and 503
/// only; a 401 always gets the fixed authentication guidance.
pub fn classify(
    expected: u16,
    status: u16,
    body: &str,
    payload: Option<&ErrorPayload>,
) -> Option<ClassifiedError> {
    if status == expected {
        return None;
    }

    let with_fallback = |kind, summary, fallback: &str| {
        let detail = payload_message(payload, status).unwrap_or(fallback);
        ClassifiedError::new(kind, summary, detail)
    };

    let classified = match status {
        401 => ClassifiedError::new(
            ErrorKind::AuthenticationFailed,
            "Authentication Failed",
            AUTHENTICATION_FAILED_DETAIL,
        ),
        400 => with_fallback(ErrorKind::BadRequest, "Bad Request", BAD_REQUEST_DETAIL),
        403 => with_fallback(ErrorKind::Forbidden, "Forbidden", FORBIDDEN_DETAIL),
        404 => with_fallback(ErrorKind::NotFound, "Not Found", NOT_FOUND_DETAIL),
        503 => with_fallback(
            ErrorKind::ServiceUnavailable,
            "Service Unavailable",
            SERVICE_UNAVAILABLE_DETAIL,
        ),
        409 => ClassifiedError::new(
            ErrorKind::ResourceConflict,
            "Resource Conflict",
            format!("{}{}", CONFLICT_DETAIL, body),
        ),
        // Summary and detail are swapped here: the raw body is the summary
        _ => ClassifiedError {
            kind: ErrorKind::UnexpectedStatus,
            summary: body.to_string(),
            detail: "Unexpected Error".to_string(),
        },
    };

    Some(classified)
}

/// Append the classification of an unexpected status to `diagnostics`.
/// Returns whether an error occurred.
pub fn handle_error(
    expected: u16,
    status: u16,
    body: &str,
    payload: Option<&ErrorPayload>,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    match classify(expected, status, body, payload) {
        Some(classified) => {
            diagnostics.push(classified.to_diagnostic());
            true
        }
        None => false,
    }
}

/// Failure of a lifecycle operation against Mission Control
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The call never produced an HTTP response
    #[error("{summary}: {detail}")]
    Transport { summary: String, detail: String },

    #[error("{}: {}", .0.summary, .0.detail)]
    Http(ClassifiedError),

    #[error("authentication failed while waiting for service creation")]
    CreationAuthExpired,

    /// The service or one of its operations reported a failed state
    #[error("{summary}: {detail}")]
    RemoteFailure { summary: String, detail: String },

    #[error("{summary}: {detail}")]
    Timeout { summary: String, detail: String },

    #[error("failed to convert {path}: {source}")]
    Conversion {
        path: AttributePath,
        #[source]
        source: ConversionError,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("response is missing {0}")]
    MissingField(&'static str),
}

impl ReconcileError {
    /// Wrap an [`ApiError`] that surfaced from the transport. Server errors
    /// that exhausted their retries are classified like any other status.
    pub fn from_api(error: ApiError, expected: u16, summary: &str, detail_prefix: &str) -> Self {
        match error {
            ApiError::Cancelled => ReconcileError::Cancelled,
            ApiError::Status {
                status,
                body,
                error,
            } => match classify(expected, status, &body, error.as_ref()) {
                Some(classified) => ReconcileError::Http(classified),
                None => ReconcileError::Transport {
                    summary: summary.to_string(),
                    detail: format!("{}{}", detail_prefix, body),
                },
            },
            other => ReconcileError::Transport {
                summary: summary.to_string(),
                detail: format!("{}{}", detail_prefix, other),
            },
        }
    }

    /// Whether the failure means the remote service no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            ReconcileError::Http(classified) => {
                classified.kind == ErrorKind::NotFound
                    || classified.detail.contains(NOT_FOUND_MARKER)
            }
            _ => false,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ReconcileError::Transport { summary, detail }
            | ReconcileError::RemoteFailure { summary, detail }
            | ReconcileError::Timeout { summary, detail } => {
                Diagnostic::error(summary.clone(), detail.clone())
            }
            ReconcileError::Http(classified) => classified.to_diagnostic(),
            ReconcileError::CreationAuthExpired => Diagnostic::error(
                "Authentication Failed During Service Status Check",
                "Received HTTP 401 Unauthorized while checking service creation status. This may indicate that your API token has expired or been revoked during the service creation process. Verify your authentication configuration and try again.",
            ),
            ReconcileError::Conversion { path, source } => Diagnostic::error(
                "Value Conversion Error",
                format!("Could not convert the value of {}: {}", path, source),
            )
            .with_attribute(path.clone()),
            ReconcileError::Cancelled => Diagnostic::error(
                "Operation Cancelled",
                "The operation was cancelled before it completed.",
            ),
            ReconcileError::MissingField(field) => Diagnostic::error(
                "Unexpected API Response",
                format!("The Solace Cloud API response did not include {}.", field),
            ),
        }
    }
}
