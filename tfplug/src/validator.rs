//! Built-in attribute validators and schema-driven config validation

use crate::schema::{
    Attribute, ObjectNestingMode, Schema, Validator, ValidatorRequest, ValidatorResponse,
};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use regex::Regex;

/// String length bounds, counted in characters
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn between(min: usize, max: usize) -> Box<dyn Validator> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("string length must be between {} and {}", min, max),
            (Some(min), None) => format!("string length must be at least {}", min),
            (None, Some(max)) => format!("string length must be at most {}", max),
            (None, None) => "any string length".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Some(s) = request.config_value.value.as_str() {
            let len = s.chars().count();
            let too_short = self.min.is_some_and(|min| len < min);
            let too_long = self.max.is_some_and(|max| len > max);
            if too_short || too_long {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Length",
                        format!(
                            "Attribute {} {}, got: {}",
                            request.path,
                            self.description(),
                            len
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Regular expression match with a human readable explanation
pub struct StringPatternValidator {
    pattern: Result<Regex, regex::Error>,
    message: String,
}

impl StringPatternValidator {
    pub fn create(pattern: &str, message: &str) -> Box<dyn Validator> {
        Box::new(Self {
            pattern: Regex::new(pattern),
            message: message.to_string(),
        })
    }
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }
        match &self.pattern {
            Ok(re) => format!("value must match regular expression '{}'", re.as_str()),
            Err(_) => "value must match an invalid regular expression".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Some(s) = request.config_value.value.as_str() {
            match &self.pattern {
                Ok(re) if re.is_match(s) => {}
                Ok(_) => diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!("Attribute {} {}, got: {}", request.path, self.description(), s),
                    )
                    .with_attribute(request.path),
                ),
                Err(e) => diagnostics.push(
                    Diagnostic::error("Invalid Validator Pattern", e.to_string())
                        .with_attribute(request.path),
                ),
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Value must equal one of the listed strings
pub struct StringOneOfValidator {
    pub values: Vec<String>,
}

impl StringOneOfValidator {
    pub fn create(values: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for StringOneOfValidator {
    fn description(&self) -> String {
        format!("value must be one of: {:?}", self.values)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Some(s) = request.config_value.value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} {}, got: {:?}",
                            request.path,
                            self.description(),
                            s
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Value must not equal any of the listed strings
pub struct StringNoneOfValidator {
    pub values: Vec<String>,
}

impl StringNoneOfValidator {
    pub fn create(values: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for StringNoneOfValidator {
    fn description(&self) -> String {
        format!("value must be none of: {:?}", self.values)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Some(s) = request.config_value.value.as_str() {
            if self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} {}, got: {:?}",
                            request.path,
                            self.description(),
                            s
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Inclusive numeric bounds
pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRangeValidator {
    pub fn between(min: f64, max: f64) -> Box<dyn Validator> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Some(n) = request.config_value.value.as_number() {
            let below = self.min.is_some_and(|min| n < min);
            let above = self.max.is_some_and(|max| n > max);
            if below || above {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value",
                        format!("Attribute {} {}, got: {}", request.path, self.description(), n),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Check a configuration object against the schema: required attributes
/// must be present and every validator runs on known configured values.
/// Unknown values are skipped since they are validated again at apply time.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_attributes(
        &schema.attributes,
        config,
        &AttributePath::root(),
        &mut diagnostics,
    );
    diagnostics
}

fn validate_attributes(
    attributes: &[Attribute],
    config: &DynamicValue,
    parent: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for attr in attributes {
        let path = parent.clone().attribute(&attr.name);
        let value = config.get(&path);

        if value.is_null() {
            if attr.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", path),
                    )
                    .with_attribute(path),
                );
            }
            continue;
        }
        if value.is_unknown() {
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }

        if let Some(nested) = &attr.nested_type {
            match (nested.nesting, &value) {
                (ObjectNestingMode::Single, Dynamic::Map(_)) => {
                    validate_attributes(&nested.attributes, config, &path, diagnostics);
                }
                (ObjectNestingMode::List, Dynamic::List(items)) => {
                    for idx in 0..items.len() {
                        let element = path.clone().index(idx as i64);
                        validate_attributes(&nested.attributes, config, &element, diagnostics);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeBuilder, AttributeType, NestedType, SchemaBuilder};
    use std::collections::HashMap;

    fn request(value: Dynamic) -> ValidatorRequest {
        ValidatorRequest {
            config_value: DynamicValue::new(value),
            path: AttributePath::new("field"),
        }
    }

    #[test]
    fn string_length_validator_accepts_valid_length() {
        let validator = StringLengthValidator::between(3, 10);
        let response = validator.validate(request(Dynamic::String("valid".to_string())));
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn string_length_validator_rejects_long_value() {
        let validator = StringLengthValidator::between(1, 5);
        let response = validator.validate(request(Dynamic::String("too long".to_string())));
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid Attribute Value Length");
        assert!(response.diagnostics[0].detail.contains("got: 8"));
    }

    #[test]
    fn pattern_validator_uses_message() {
        let validator = StringPatternValidator::create(r"^[a-zA-Z_].*", "must start with a letter");
        assert!(validator
            .validate(request(Dynamic::String("_vpn".to_string())))
            .diagnostics
            .is_empty());

        let response = validator.validate(request(Dynamic::String("1vpn".to_string())));
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .detail
            .contains("must start with a letter"));
    }

    #[test]
    fn invalid_pattern_reports_diagnostic_instead_of_panicking() {
        let validator = StringPatternValidator::create("(", "");
        let response = validator.validate(request(Dynamic::String("x".to_string())));
        assert_eq!(response.diagnostics[0].summary, "Invalid Validator Pattern");
    }

    #[test]
    fn one_of_and_none_of() {
        let one_of = StringOneOfValidator::create(&["INTERNAL", "LDAP"]);
        assert!(one_of
            .validate(request(Dynamic::String("LDAP".to_string())))
            .diagnostics
            .is_empty());
        assert_eq!(
            one_of
                .validate(request(Dynamic::String("KERBEROS".to_string())))
                .diagnostics
                .len(),
            1
        );

        let none_of = StringNoneOfValidator::create(&["default"]);
        assert_eq!(
            none_of
                .validate(request(Dynamic::String("default".to_string())))
                .diagnostics
                .len(),
            1
        );
    }

    #[test]
    fn number_range_validator_bounds_are_inclusive() {
        let validator = NumberRangeValidator::between(10.0, 6000.0);
        assert!(validator.validate(request(Dynamic::Number(10.0))).diagnostics.is_empty());
        assert!(validator.validate(request(Dynamic::Number(6000.0))).diagnostics.is_empty());
        assert_eq!(validator.validate(request(Dynamic::Number(9.0))).diagnostics.len(), 1);
    }

    #[test]
    fn validate_config_walks_nested_and_skips_unknown() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 5))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("vpn", AttributeType::Object(HashMap::new()))
                    .optional()
                    .nested_type(NestedType::single(vec![AttributeBuilder::new(
                        "auth_type",
                        AttributeType::String,
                    )
                    .optional()
                    .validator(StringOneOfValidator::create(&["INTERNAL"]))
                    .build()]))
                    .build(),
            )
            .build();

        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::Unknown),
            (
                "vpn",
                Dynamic::object([("auth_type", Dynamic::String("LDAP".to_string()))]),
            ),
        ]));
        let diags = validate_config(&schema, &config);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute,
            Some(AttributePath::new("vpn").attribute("auth_type"))
        );

        let missing = validate_config(&schema, &DynamicValue::new(Dynamic::Map(HashMap::new())));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].summary, "Missing required argument");
    }
}
