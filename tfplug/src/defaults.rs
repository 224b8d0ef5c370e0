//! Default value providers for attributes
//!
//! Default providers are evaluated during the planning phase when an attribute
//! is not set in the configuration.

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    /// Create a new static default provider with the given value
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    /// Create a static string default
    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    /// Create a static number default
    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    /// Create a static boolean default
    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("value defaults to {}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}
