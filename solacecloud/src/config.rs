//! Provider configuration
//!
//! Resolves the `provider "solacecloud"` block, with the API token falling
//! back to the environment, into a [`ProviderConfig`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use url::Url;

use crate::model::{Attr, ConversionError, StateValue};
use crate::resources::service::ReconcileSettings;

pub const DEFAULT_BASE_URL: &str = "https://production-api.solace.cloud";
pub const API_TOKEN_ENV: &str = "SOLACECLOUD_API_TOKEN";
pub const DEFAULT_POLLING_INTERVAL_SECS: i64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing Solace Cloud API Token")]
    MissingToken,

    #[error("invalid base_url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("api_polling_interval must be a positive number of seconds, got {0}")]
    InvalidPollingInterval(i64),

    #[error("invalid value for {attribute}: {source}")]
    Conversion {
        attribute: &'static str,
        #[source]
        source: ConversionError,
    },
}

impl ConfigError {
    fn attribute(&self) -> &'static str {
        match self {
            ConfigError::MissingToken => "api_token",
            ConfigError::InvalidBaseUrl { .. } => "base_url",
            ConfigError::InvalidPollingInterval(_) => "api_polling_interval",
            ConfigError::Conversion { attribute, .. } => attribute,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = match self {
            ConfigError::MissingToken => Diagnostic::error(
                "Missing Solace Cloud API Token",
                format!(
                    "The provider cannot create the API client as there is an unknown configuration value for the Solace API Token. \
                     Set the api_token value in the configuration or use the {} environment variable. \
                     If either is already set, ensure the value is not empty.",
                    API_TOKEN_ENV
                ),
            ),
            ConfigError::InvalidBaseUrl { .. } => {
                Diagnostic::error("Invalid Solace Cloud Base URL", self.to_string())
            }
            ConfigError::InvalidPollingInterval(_) => {
                Diagnostic::error("Invalid API Polling Interval", self.to_string())
            }
            ConfigError::Conversion { .. } => {
                Diagnostic::error("Invalid Provider Configuration", self.to_string())
            }
        };
        diagnostic.with_attribute(AttributePath::new(self.attribute()))
    }
}

/// Resolved provider settings
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: Url,
    pub api_token: String,
    pub polling_interval: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"<redacted>")
            .field("polling_interval", &self.polling_interval)
            .finish()
    }
}

fn read<T: StateValue>(
    config: &DynamicValue,
    attribute: &'static str,
) -> Result<Option<T>, ConfigError> {
    let value = config.get(&AttributePath::new(attribute));
    Attr::<T>::from_dynamic(&value)
        .map(Attr::into_known)
        .map_err(|source| ConfigError::Conversion { attribute, source })
}

impl ProviderConfig {
    /// Resolve the provider block. The token comes from the environment
    /// when the block leaves it empty.
    pub fn from_config(config: &DynamicValue) -> Result<Self, ConfigError> {
        let env_token = std::env::var(API_TOKEN_ENV).ok();
        Self::resolve(config, env_token)
    }

    fn resolve(config: &DynamicValue, env_token: Option<String>) -> Result<Self, ConfigError> {
        let base_url = read::<String>(config, "base_url")?
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;

        let api_token = read::<String>(config, "api_token")?
            .filter(|token| !token.is_empty())
            .or_else(|| env_token.filter(|token| !token.is_empty()))
            .ok_or(ConfigError::MissingToken)?;

        let polling_interval = match read::<i64>(config, "api_polling_interval")? {
            None | Some(0) => {
                tracing::debug!(
                    default = DEFAULT_POLLING_INTERVAL_SECS,
                    "No api_polling_interval configured, using the default"
                );
                DEFAULT_POLLING_INTERVAL_SECS
            }
            Some(secs) if secs < 0 => return Err(ConfigError::InvalidPollingInterval(secs)),
            Some(secs) => secs,
        };
        tracing::debug!(api_polling_interval = polling_interval, "Resolved polling interval");

        Ok(Self {
            base_url,
            api_token,
            polling_interval: Duration::from_secs(polling_interval.unsigned_abs()),
        })
    }

    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            polling_interval: self.polling_interval,
            ..ReconcileSettings::default()
        }
    }
}

pub fn provider_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Manages event broker services in Solace Cloud")
        .attribute(
            AttributeBuilder::new("base_url", AttributeType::String)
                .description("Base URL for REST API Endpoints. The PubSub+ Home Cloud your account is located determines the base URL you use.  ex: https://api.solace.cloud/")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("api_token", AttributeType::String)
                .description("Token for authenticating with the Solace Cloud API. Can be set as Env Variable SOLACECLOUD_API_TOKEN")
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("api_polling_interval", AttributeType::Number)
                .description("Polling interval in seconds for API calls that wait for a status change, such as a service reaching COMPLETED. Default value is 30 seconds")
                .optional()
                .build(),
        )
        .build()
}
