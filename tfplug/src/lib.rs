//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin framework: value model,
//! schema, provider and resource traits, planning helpers and cancellation.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use context::{Cancelled, Context};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use plan_modifier::{apply_schema_plan, UseStateForUnknown};
pub use provider::{Provider, ProviderMetadataRequest, ProviderMetadataResponse};
pub use resource::{
    Resource, ResourceWithConfigure, ResourceWithImportState, ResourceWithModifyPlan,
};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{Diagnostic, DiagnosticsExt, Dynamic, DynamicValue};
