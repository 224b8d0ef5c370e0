//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and provider
//! schemas, including attribute types, nested attributes, and the validator,
//! plan modifier and default seams attached to each attribute.

use crate::types::{AttributePath, Diagnostic, DynamicValue};
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

/// Schema is returned by providers and resources
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Look up a top-level attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
    pub default: Option<Arc<dyn Default>>,
    pub nested_type: Option<NestedType>,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .field("default", &self.default.is_some())
            .field("nested_type", &self.nested_type)
            .finish()
    }
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

impl NestedType {
    /// A single nested object
    pub fn single(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::Single,
        }
    }

    /// A list of nested objects
    pub fn list(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::List,
        }
    }
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Single,
    List,
}

/// Checks a configured value. Only called for known, non-null values.
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown, cross-field derivations
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
///
/// `prior_state` and `plan` are the whole resource objects so that a
/// modifier can read sibling attributes. `prior_state` is null on create.
pub struct PlanModifierRequest {
    pub config_value: DynamicValue,
    pub state_value: DynamicValue,
    pub plan_value: DynamicValue,
    pub path: AttributePath,
    pub prior_state: DynamicValue,
    pub plan: DynamicValue,
}

pub struct PlanModifierResponse {
    pub plan_value: DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifierResponse {
    /// Leave the planned value as it is
    pub fn unchanged(request: PlanModifierRequest) -> Self {
        Self {
            plan_value: request.plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Value planned for an optional attribute the configuration leaves null
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

pub struct DefaultRequest {
    pub path: AttributePath,
}

pub struct DefaultResponse {
    pub value: DynamicValue,
}

/// Fluent construction of an [`Attribute`]
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
                nested_type: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Redacted from plan output
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(Arc::from(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(Arc::from(modifier));
        self
    }

    pub fn default(mut self, default: Box<dyn Default>) -> Self {
        self.attribute.default = Some(Arc::from(default));
        self
    }

    pub fn nested_type(mut self, nested: NestedType) -> Self {
        self.attribute.nested_type = Some(nested);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent construction of a [`Schema`]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                description: String::new(),
                attributes: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl PlanModifier for Noop {
        fn description(&self) -> String {
            "does nothing".to_string()
        }

        fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
            PlanModifierResponse::unchanged(request)
        }
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.attributes.len(), 2);
        assert_eq!(schema.description, "Test resource schema");
        assert!(schema.attribute("name").is_some_and(|a| a.required));
    }

    #[test]
    fn cloned_attribute_keeps_plan_modifiers() {
        let attr = AttributeBuilder::new("id", AttributeType::String)
            .computed()
            .plan_modifier(Box::new(Noop))
            .build();

        let cloned = attr.clone();
        assert_eq!(cloned.plan_modifiers.len(), 1);
        assert_eq!(cloned.plan_modifiers[0].description(), "does nothing");
    }

    #[test]
    fn nested_single_attribute() {
        let attr = AttributeBuilder::new("credential", AttributeType::Object(HashMap::new()))
            .computed()
            .nested_type(NestedType::single(vec![
                AttributeBuilder::new("username", AttributeType::String)
                    .computed()
                    .build(),
                AttributeBuilder::new("password", AttributeType::String)
                    .computed()
                    .sensitive()
                    .build(),
            ]))
            .build();

        let nested = attr.nested_type.as_ref().unwrap();
        assert_eq!(nested.nesting, ObjectNestingMode::Single);
        assert_eq!(nested.attributes.len(), 2);
        assert!(nested.attributes[1].sensitive);
    }
}
