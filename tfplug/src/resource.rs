//! Managed resource lifecycle
//!
//! `Resource` carries the CRUD contract. Configuration, plan shaping and
//! import are opt-in through the extension traits below.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{AttributePath, ClientCapabilities, Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// A managed object the host plans, applies and refreshes
#[async_trait]
pub trait Resource: Send + Sync {
    /// Key this resource is registered under in `Provider::resources`
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse;

    async fn schema(&self, ctx: Context, request: ResourceSchemaRequest) -> ResourceSchemaResponse;

    /// Static checks against configuration, before any plan exists
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse;

    /// new_state must leave no unknown values behind
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// Refresh from the remote side
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    /// Called to delete a resource
    /// Error diagnostics keep the resource in state
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;
}

pub struct ResourceMetadataRequest;

pub struct ResourceMetadataResponse {
    pub type_name: String,
}

pub struct ResourceSchemaRequest;

pub struct ResourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CreateResourceRequest {
    pub type_name: String,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

/// A create that fails after the remote object exists should still return
/// a new_state carrying its identifier so the object stays tracked.
pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ReadResourceResponse {
    /// None removes the resource from state
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct UpdateResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DeleteResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Receives the provider's shared data right after the factory builds the resource
#[async_trait]
pub trait ResourceWithConfigure: Resource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse;
}

pub struct ConfigureResourceRequest {
    /// `ConfigureProviderResponse::provider_data`, downcast by the resource
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

pub struct ConfigureResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Plan shaping. Implementations usually start from
/// [`apply_schema_plan`](crate::plan_modifier::apply_schema_plan), which
/// applies defaults and the plan modifiers declared on schema attributes,
/// then add resource-specific logic.
#[async_trait]
pub trait ResourceWithModifyPlan: Resource {
    async fn modify_plan(&self, ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse;
}

pub struct ModifyPlanRequest {
    pub type_name: String,
    pub config: DynamicValue,
    /// Null when the resource is being created
    pub prior_state: DynamicValue,
    /// Null when the resource is being destroyed
    pub proposed_new_state: DynamicValue,
}

pub struct ModifyPlanResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Adoption of existing remote objects by id
#[async_trait]
pub trait ResourceWithImportState: Resource {
    /// Only needs enough state for the following read to succeed
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;
}

pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
    pub client_capabilities: ClientCapabilities,
}

pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}
