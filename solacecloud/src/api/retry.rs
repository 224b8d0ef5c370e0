//! Fixed-delay retry of server errors

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tfplug::Context;

use super::error::ApiError;
use super::models::{
    CreateServiceRequest, EventBrokerService, Operation, UpdateMessageSpoolRequest,
    UpdateServiceRequest,
};
use super::{ApiResponse, ServiceApi};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Ceiling on the number of attempts, including the first one
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            wait: Duration::from_secs(10),
        }
    }
}

/// Run `op` until it succeeds, fails with something other than a 5xx
/// status, or runs out of attempts. At least one attempt is always made.
pub async fn retry<T, F, Fut>(ctx: &Context, policy: &RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.max_retries.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Err(e) if e.is_server_error() && attempt < attempts => {
                tracing::debug!(
                    attempt,
                    status = e.status_code(),
                    "Retrying request after {:?}",
                    policy.wait
                );
                ctx.sleep(policy.wait).await?;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Routes every [`ServiceApi`] call through [`retry`]
pub struct RetryingServiceApi<A> {
    inner: A,
    policy: RetryPolicy,
}

impl<A: ServiceApi> RetryingServiceApi<A> {
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<A: ServiceApi> ServiceApi for RetryingServiceApi<A> {
    async fn create_service(
        &self,
        ctx: &Context,
        request: &CreateServiceRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        retry(ctx, &self.policy, || self.inner.create_service(ctx, request)).await
    }

    async fn get_service(
        &self,
        ctx: &Context,
        id: &str,
        expand: bool,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        retry(ctx, &self.policy, || self.inner.get_service(ctx, id, expand)).await
    }

    async fn delete_service(
        &self,
        ctx: &Context,
        id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        retry(ctx, &self.policy, || self.inner.delete_service(ctx, id)).await
    }

    async fn update_service(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateServiceRequest,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        retry(ctx, &self.policy, || self.inner.update_service(ctx, id, request)).await
    }

    async fn update_message_spool(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateMessageSpoolRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        retry(ctx, &self.policy, || {
            self.inner.update_message_spool(ctx, id, request)
        })
        .await
    }

    async fn get_service_operation(
        &self,
        ctx: &Context,
        service_id: &str,
        operation_id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        retry(ctx, &self.policy, || {
            self.inner.get_service_operation(ctx, service_id, operation_id)
        })
        .await
    }
}
