//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// Sets the import ID to a specific attribute in state
///
/// This is useful for simple resources where the import ID maps directly to
/// a single attribute in the resource state. The following read fills in
/// everything else.
///
/// Example: ID "svc-123" -> state.id = "svc-123"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Missing import ID",
                "An import ID is required to import this resource",
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::new(Dynamic::Map(HashMap::new()));

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!(
                    "Could not set attribute '{}' to value '{}'",
                    attr_path, request.id
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}
