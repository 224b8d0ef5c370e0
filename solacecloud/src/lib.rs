//! Terraform provider for Solace Cloud event broker services

pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod model;
pub mod provider_data;
pub mod resources;

pub use provider_data::SolaceCloudProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::types::Diagnostic;

use api::{Client, RetryPolicy, RetryingServiceApi};
use config::{provider_schema, ProviderConfig};
use resources::service::{ServiceResource, TYPE_NAME as SERVICE_TYPE_NAME};

#[derive(Default)]
pub struct SolaceCloudProvider {
    provider_data: Option<SolaceCloudProviderData>,
}

impl SolaceCloudProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider_data(&self) -> Option<&SolaceCloudProviderData> {
        self.provider_data.as_ref()
    }
}

#[async_trait]
impl Provider for SolaceCloudProvider {
    fn type_name(&self) -> &str {
        "solacecloud"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: provider_schema(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        if logging::try_init_logging() {
            tracing::debug!("Installed stderr logging");
        }

        let config = match ProviderConfig::from_config(&request.config) {
            Ok(config) => config,
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        let client = match Client::new(&config.base_url, &config.api_token) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to create Solace Cloud API client",
                    format!(
                        "An unexpected error occurred when creating the Solace Cloud API client.\n\nSolace Cloud API Client Error: {}",
                        e
                    ),
                ));
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        tracing::info!(
            base_url = %config.base_url,
            polling_interval_secs = config.polling_interval.as_secs(),
            terraform_version = %request.terraform_version,
            "Configured Solace Cloud provider"
        );

        let data = SolaceCloudProviderData::new(
            RetryingServiceApi::new(client, RetryPolicy::default()),
            config.reconcile_settings(),
        );
        self.provider_data = Some(data.clone());

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(Arc::new(data)),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(SERVICE_TYPE_NAME.to_string(), ServiceResource::factory);
        resources
    }
}
