//! Lifecycle of an event broker service against Mission Control
//!
//! Every operation runs to completion before it returns, including its
//! polling loops. The reconciler holds no per-resource state, so one
//! instance serves concurrent operations on different services.

use std::sync::Arc;
use std::time::Duration;

use tfplug::Context;

use crate::api::models::{
    CreationState, OperationStatus, UpdateMessageSpoolRequest, UpdateServiceRequest,
};
use crate::api::{ApiError, ApiResponse, ServiceApi};
use crate::errors::{classify, ReconcileError};
use crate::model::{Attr, ServiceModel};

const API_ERROR_SUMMARY: &str = "Error calling Solace Cloud API";

/// Timing of the polling loops
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    pub polling_interval: Duration,
    /// Ceiling for a message spool resize. Creation has no ceiling.
    pub spool_operation_timeout: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_secs(30),
            spool_operation_timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// A create that did not complete
#[derive(Debug)]
pub struct CreateFailure {
    /// The service as far as it is known, once the API has assigned an id.
    /// It must be kept in state so the service stays tracked.
    pub tracked: Option<ServiceModel>,
    pub error: ReconcileError,
}

impl CreateFailure {
    fn untracked(error: ReconcileError) -> Self {
        Self {
            tracked: None,
            error,
        }
    }
}

/// Fail with the classified error unless `response` has the `expected` status
fn expect_status<T>(response: &ApiResponse<T>, expected: u16) -> Result<(), ReconcileError> {
    match classify(expected, response.status, &response.body, response.error.as_ref()) {
        Some(classified) => Err(ReconcileError::Http(classified)),
        None => Ok(()),
    }
}

fn known_id(model: &ServiceModel) -> Result<&str, ReconcileError> {
    model
        .id
        .known()
        .map(String::as_str)
        .ok_or(ReconcileError::MissingField("id"))
}

/// Whether `planned` is set and differs from `current`
fn changed<T: PartialEq>(current: &Attr<T>, planned: &Attr<T>) -> bool {
    planned.is_known() && current != planned
}

pub struct ServiceReconciler {
    api: Arc<dyn ServiceApi>,
    settings: ReconcileSettings,
}

impl ServiceReconciler {
    pub fn new(api: Arc<dyn ServiceApi>, settings: ReconcileSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    /// Create the service described by `plan` and return its state.
    ///
    /// The id is recorded as soon as the API accepts the request, so a
    /// failure while waiting for provisioning still returns the service in
    /// [`CreateFailure::tracked`].
    pub async fn create(
        &self,
        ctx: &Context,
        plan: &ServiceModel,
    ) -> Result<ServiceModel, CreateFailure> {
        let request = plan.create_request().map_err(CreateFailure::untracked)?;

        let response = self
            .api
            .create_service(ctx, &request)
            .await
            .map_err(|e| {
                CreateFailure::untracked(ReconcileError::from_api(
                    e,
                    202,
                    API_ERROR_SUMMARY,
                    "Could not create/get service, unexpected error: ",
                ))
            })?;
        expect_status(&response, 202).map_err(CreateFailure::untracked)?;

        let service_id = response
            .data
            .and_then(|operation| operation.resource_id)
            .ok_or_else(|| CreateFailure::untracked(ReconcileError::MissingField("resourceId")))?;
        tracing::info!(service_id = %service_id, "Service creation accepted");

        let mut model = plan.clone();
        model.id = Attr::Known(service_id.clone());

        let tracked = |model: ServiceModel, error| CreateFailure {
            tracked: Some(model.without_unknowns()),
            error,
        };

        if let Err(error) = self.wait_for_creation(ctx, &service_id).await {
            return Err(tracked(model, error));
        }
        if let Err(error) = self.refresh(ctx, &mut model).await {
            return Err(tracked(model, error));
        }

        // Apply mutable attributes the create call does not carry
        match self.update(ctx, &model, plan).await {
            Ok(false) => {}
            Ok(true) => {
                if let Err(error) = self.refresh(ctx, &mut model).await {
                    return Err(tracked(model, error));
                }
            }
            Err(error) => return Err(tracked(model, error)),
        }

        tracing::info!(service_id = %service_id, "Service created");
        Ok(model)
    }

    /// Poll the service until its creation state is terminal. There is no
    /// ceiling; only cancellation of `ctx` ends a service stuck in progress.
    async fn wait_for_creation(&self, ctx: &Context, service_id: &str) -> Result<(), ReconcileError> {
        loop {
            let status = match self.api.get_service(ctx, service_id, false).await {
                Ok(response) => response,
                Err(ApiError::Status { status, .. }) => {
                    return Err(creation_poll_failure(status));
                }
                Err(e) => {
                    return Err(ReconcileError::from_api(
                        e,
                        200,
                        API_ERROR_SUMMARY,
                        "Could not create/get service, unexpected error: ",
                    ));
                }
            };

            if status.status != 200 {
                return Err(creation_poll_failure(status.status));
            }

            let state = status
                .data
                .and_then(|service| service.creation_state)
                .ok_or(ReconcileError::MissingField("creationState"))?;

            match state {
                CreationState::Failed => {
                    return Err(ReconcileError::RemoteFailure {
                        summary: "Resource Creation FAILED".to_string(),
                        detail: format!(
                            "Received creationState as: {} from the GetService API Request",
                            state
                        ),
                    });
                }
                CreationState::Completed => {
                    tracing::info!(service_id, "Service Status reported as COMPLETED, finished Waiting");
                    return Ok(());
                }
                _ => {
                    tracing::info!(service_id, status = %state, "Waiting for Service Status to Complete");
                    ctx.sleep(self.settings.polling_interval)
                        .await
                        .map_err(|_| ReconcileError::Cancelled)?;
                }
            }
        }
    }

    /// Read the expanded service into `model`. `id` is kept as is.
    pub async fn refresh(&self, ctx: &Context, model: &mut ServiceModel) -> Result<(), ReconcileError> {
        let service_id = known_id(model)?.to_string();

        let response = self
            .api
            .get_service(ctx, &service_id, true)
            .await
            .map_err(|e| {
                ReconcileError::from_api(
                    e,
                    200,
                    "Error Reading Service",
                    &format!("Could not read service {}: ", service_id),
                )
            })?;
        expect_status(&response, 200)?;

        let service = response
            .data
            .ok_or(ReconcileError::MissingField("data"))?;
        model.apply_remote(&service)?;

        tracing::info!(
            service_id = %service_id,
            message_vpn = service.msg_vpn_name.as_deref().unwrap_or_default(),
            service_class = service.service_class_id.as_deref().unwrap_or_default(),
            datacenter = service.datacenter_id.as_deref().unwrap_or_default(),
            spool_default_gb = ?service.message_spool_details.as_ref().and_then(|d| d.default_gb_size),
            spool_total_gb = ?service.message_spool_details.as_ref().and_then(|d| d.total_gb_size),
            "Read service"
        );
        Ok(())
    }

    /// Push the mutable attributes that differ between `state` and `plan`.
    /// Returns whether anything was changed remotely.
    pub async fn update(
        &self,
        ctx: &Context,
        state: &ServiceModel,
        plan: &ServiceModel,
    ) -> Result<bool, ReconcileError> {
        let service_id = known_id(state)?;

        let mut patch = UpdateServiceRequest::default();
        if changed(&state.name, &plan.name) {
            patch.name = plan.name.cloned();
        }
        if changed(&state.owned_by, &plan.owned_by) {
            patch.owned_by = plan.owned_by.cloned();
        }
        if changed(&state.locked, &plan.locked) {
            patch.locked = plan.locked.cloned();
        }
        let spool_size = plan
            .max_spool_usage
            .cloned()
            .filter(|_| changed(&state.max_spool_usage, &plan.max_spool_usage));

        if patch.is_empty() && spool_size.is_none() {
            tracing::debug!(service_id, "No mutable attribute changed");
            return Ok(false);
        }

        if !patch.is_empty() {
            self.patch_service(ctx, service_id, &patch).await?;
        }
        if let Some(size) = spool_size {
            self.resize_message_spool(ctx, service_id, size).await?;
        }
        Ok(true)
    }

    async fn patch_service(
        &self,
        ctx: &Context,
        service_id: &str,
        patch: &UpdateServiceRequest,
    ) -> Result<(), ReconcileError> {
        tracing::info!(service_id, ?patch, "Updating service");

        let response = self
            .api
            .update_service(ctx, service_id, patch)
            .await
            .map_err(|e| {
                ReconcileError::from_api(
                    e,
                    200,
                    API_ERROR_SUMMARY,
                    "Could not update service, unexpected error: ",
                )
            })?;
        expect_status(&response, 200)
    }

    async fn resize_message_spool(
        &self,
        ctx: &Context,
        service_id: &str,
        size_in_gb: i64,
    ) -> Result<(), ReconcileError> {
        tracing::info!(service_id, size_in_gb, "Updating message spool size");

        let request = UpdateMessageSpoolRequest {
            message_spool_size_in_gb: size_in_gb,
        };
        let response = self
            .api
            .update_message_spool(ctx, service_id, &request)
            .await
            .map_err(|e| {
                ReconcileError::from_api(
                    e,
                    202,
                    API_ERROR_SUMMARY,
                    "Could not update message spool, unexpected error: ",
                )
            })?;
        expect_status(&response, 202)?;

        let operation_id = response
            .data
            .and_then(|operation| operation.id)
            .ok_or(ReconcileError::MissingField("operation id"))?;

        self.wait_for_operation(ctx, service_id, &operation_id).await
    }

    /// Poll a spool operation until it is terminal or the spool operation
    /// timeout has passed
    async fn wait_for_operation(
        &self,
        ctx: &Context,
        service_id: &str,
        operation_id: &str,
    ) -> Result<(), ReconcileError> {
        let deadline = tokio::time::Instant::now() + self.settings.spool_operation_timeout;

        loop {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(ReconcileError::Timeout {
                    summary: "Service operation timeout".to_string(),
                    detail: format!(
                        "Message spool update operation timed out after {}",
                        describe_duration(self.settings.spool_operation_timeout)
                    ),
                });
            }

            let response = self
                .api
                .get_service_operation(ctx, service_id, operation_id)
                .await
                .map_err(|e| {
                    ReconcileError::from_api(
                        e,
                        200,
                        API_ERROR_SUMMARY,
                        "Could not get service operation status, unexpected error: ",
                    )
                })?;
            expect_status(&response, 200)?;

            let operation = response
                .data
                .ok_or(ReconcileError::MissingField("operation status"))?;
            let status = operation
                .status
                .ok_or(ReconcileError::MissingField("operation status"))?;

            match status {
                OperationStatus::Failed => {
                    return Err(ReconcileError::RemoteFailure {
                        summary: "Service operation failed".to_string(),
                        detail: format!(
                            "Message spool update operation failed with status: {}",
                            status
                        ),
                    });
                }
                OperationStatus::Succeeded => {
                    tracing::info!(
                        service_id,
                        operation_id,
                        created = ?operation.created_time,
                        completed = ?operation.completed_time,
                        "Message spool update operation completed successfully"
                    );
                    return Ok(());
                }
                _ => {
                    tracing::info!(
                        service_id,
                        operation_id,
                        status = %status,
                        created = ?operation.created_time,
                        "Waiting for message spool update operation to complete"
                    );
                    // Never sleep past the deadline
                    let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
                    ctx.sleep(self.settings.polling_interval.min(remaining))
                        .await
                        .map_err(|_| ReconcileError::Cancelled)?;
                }
            }
        }
    }

    pub async fn delete(&self, ctx: &Context, model: &ServiceModel) -> Result<(), ReconcileError> {
        let service_id = known_id(model)?;
        tracing::info!(service_id, "About to delete service");

        let response = self
            .api
            .delete_service(ctx, service_id)
            .await
            .map_err(|e| ReconcileError::from_api(e, 202, "An internal error has occurred", ""))?;
        expect_status(&response, 202)?;

        tracing::info!(service_id, "Service deletion accepted");
        Ok(())
    }
}

fn creation_poll_failure(status: u16) -> ReconcileError {
    if status == 401 {
        return ReconcileError::CreationAuthExpired;
    }
    ReconcileError::RemoteFailure {
        summary: "Failed to get service while waiting for service creation to complete."
            .to_string(),
        detail: format!(
            "Expected HTTP 200 but received {} while waiting for service to complete",
            status
        ),
    }
}

/// Whole minutes when the duration has no seconds part
fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        _ => format!("{:?}", duration),
    }
}
