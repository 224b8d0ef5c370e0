//! Solace Cloud Mission Control API
//!
//! [`ServiceApi`] is the capability the service resource talks to. [`Client`]
//! implements it over HTTP and [`RetryingServiceApi`] decorates any
//! implementation with the 5xx retry policy.

pub mod client;
pub mod error;
pub mod models;
pub mod retry;

#[cfg(test)]
pub mod test_helpers;

pub use client::Client;
pub use error::{ApiError, ErrorPayload, ErrorResponse};
pub use retry::{retry, RetryPolicy, RetryingServiceApi};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tfplug::Context;

use models::{
    CreateServiceRequest, Envelope, EventBrokerService, Operation, UpdateMessageSpoolRequest,
    UpdateServiceRequest,
};

/// Raw outcome of a call that reached the server and did not fail with 5xx
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: String,
    /// Parsed `data` envelope, present only on the endpoint's success status
    pub data: Option<T>,
    /// Structured error body, present only for statuses the endpoint documents
    pub error: Option<ErrorPayload>,
}

/// Success status and documented error statuses of one endpoint
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub success: u16,
    pub documented_errors: &'static [u16],
}

pub const CREATE_SERVICE: Endpoint = Endpoint {
    success: 202,
    documented_errors: &[400, 401, 403, 503],
};

pub const GET_SERVICE: Endpoint = Endpoint {
    success: 200,
    documented_errors: &[401, 403, 404, 503],
};

pub const DELETE_SERVICE: Endpoint = Endpoint {
    success: 202,
    documented_errors: &[400, 401, 403, 404, 503],
};

pub const UPDATE_SERVICE: Endpoint = Endpoint {
    success: 200,
    documented_errors: &[400, 401, 403, 404, 503],
};

pub const UPDATE_MESSAGE_SPOOL: Endpoint = Endpoint {
    success: 202,
    documented_errors: &[400, 401, 403, 404, 503],
};

pub const GET_SERVICE_OPERATION: Endpoint = Endpoint {
    success: 200,
    documented_errors: &[401, 403, 404, 503],
};

/// Turn a status and body into an [`ApiResponse`]. A 5xx status becomes
/// [`ApiError::Status`] so the retry policy can see it.
pub fn build_response<T: DeserializeOwned>(
    endpoint: Endpoint,
    status: u16,
    body: String,
) -> Result<ApiResponse<T>, ApiError> {
    let error = if endpoint.documented_errors.contains(&status) {
        serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|response| ErrorPayload::from_status(status, response))
    } else {
        None
    };

    if (500..=599).contains(&status) {
        return Err(ApiError::Status {
            status,
            body,
            error,
        });
    }

    let data = if status == endpoint.success {
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::ParseError(format!("HTTP {} body: {}", status, e)))?;
        Some(envelope.data)
    } else {
        None
    };

    Ok(ApiResponse {
        status,
        body,
        data,
        error,
    })
}

/// Event broker service operations of the Mission Control API
#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn create_service(
        &self,
        ctx: &Context,
        request: &CreateServiceRequest,
    ) -> Result<ApiResponse<Operation>, ApiError>;

    /// `expand` asks for broker, connection endpoint and spool details
    async fn get_service(
        &self,
        ctx: &Context,
        id: &str,
        expand: bool,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError>;

    async fn delete_service(
        &self,
        ctx: &Context,
        id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError>;

    async fn update_service(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateServiceRequest,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError>;

    async fn update_message_spool(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateMessageSpoolRequest,
    ) -> Result<ApiResponse<Operation>, ApiError>;

    async fn get_service_operation(
        &self,
        ctx: &Context,
        service_id: &str,
        operation_id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError>;
}
