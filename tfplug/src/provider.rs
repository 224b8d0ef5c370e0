//! Provider trait and resource factories

use crate::context::Context;
use crate::error::{Result, TfplugError};
use crate::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use crate::schema::Schema;
use crate::types::{ClientCapabilities, Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory producing an unconfigured resource instance
pub type ResourceFactory = fn() -> Box<dyn ResourceWithConfigure>;

/// Provider is the entry point the framework talks to
/// configure() is called once before any resource is instantiated
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider type name, the prefix of every resource type name
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Validate provider configuration and build the data shared with resources
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Resource factories keyed by resource type name
    fn resources(&self) -> HashMap<String, ResourceFactory>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    /// Passed verbatim to every resource's configure()
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

/// Instantiate `type_name` from the provider's factories and hand it the
/// provider data, the way the framework does before each resource call.
/// Returns the configure diagnostics alongside the resource.
pub async fn instantiate_resource(
    ctx: Context,
    provider: &dyn Provider,
    type_name: &str,
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>)> {
    let factory = provider
        .resources()
        .get(type_name)
        .copied()
        .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))?;

    if provider_data.is_none() {
        return Err(TfplugError::ProviderNotConfigured);
    }

    let mut resource = factory();
    let response = resource
        .configure(ctx, ConfigureResourceRequest { provider_data })
        .await;

    Ok((resource, response.diagnostics))
}
