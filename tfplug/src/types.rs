//! Core type system for tfplug
//!
//! This module provides the core types used throughout the framework,
//! including Dynamic values, attribute paths and diagnostics.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Marker used when an unknown value has to pass through a JSON encoding
const UNKNOWN_MARKER: &str = "__unknown__";

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// IMPORTANT: Prefer the type-safe accessors on DynamicValue over matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (all numbers are f64 to match Terraform)
    Number(f64),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    /// True for any value that is neither null nor unknown
    pub fn is_known(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }

    /// Build an object value from attribute name/value pairs
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Dynamic)>,
        K: Into<String>,
    {
        Dynamic::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => f.write_str("null"),
            Dynamic::Unknown => f.write_str("(known after apply)"),
            Dynamic::Bool(b) => write!(f, "{}", b),
            Dynamic::Number(n) => write!(f, "{}", n),
            Dynamic::String(s) => write!(f, "{:?}", s),
            Dynamic::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Dynamic::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (idx, key) in keys.into_iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", key, map[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == UNKNOWN_MARKER {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == UNKNOWN_MARKER {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps Dynamic and provides path-based access
/// This is what gets passed between Terraform and the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Type-safe accessors - these handle path navigation and type checking
    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(type_mismatch("string", value)),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Number(n) => Ok(*n),
            _ => Err(type_mismatch("number", value)),
        }
    }

    /// Value at `path`, treating missing attributes as null.
    /// Navigating through a null or unknown parent yields that parent's state.
    pub fn get(&self, path: &AttributePath) -> Dynamic {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Null, _) => return Dynamic::Null,
                (Dynamic::Unknown, _) => return Dynamic::Unknown,
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    match m.get(name) {
                        Some(value) => value,
                        None => return Dynamic::Null,
                    }
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    match usize::try_from(*idx).ok().and_then(|idx| l.get(idx)) {
                        Some(value) => value,
                        None => return Dynamic::Null,
                    }
                }
                _ => return Dynamic::Null,
            };
        }

        current.clone()
    }

    /// Type-safe setters - Use for building state/config objects
    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    /// Helpers for handling unknown values during planning
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => m
                    .get(name)
                    .ok_or_else(|| TfplugError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => usize::try_from(*idx)
                    .ok()
                    .and_then(|i| l.get(i))
                    .ok_or(TfplugError::IndexOutOfBounds(*idx))?,
                _ => return Err(TfplugError::InvalidPath(path.to_string())),
            };
        }

        Ok(current)
    }

    /// Set the value at `path`, creating intermediate objects as needed.
    /// Null or unknown intermediate objects are replaced by empty ones.
    pub fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        let mut current = &mut self.value;

        for (idx, step) in parents.iter().enumerate() {
            if !matches!(current, Dynamic::Map(_) | Dynamic::List(_)) {
                *current = Dynamic::Map(HashMap::new());
            }

            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    let next_is_index = matches!(
                        path.steps.get(idx + 1),
                        Some(AttributePathStep::ElementKeyInt(_))
                    );
                    let entry = m.entry(name.clone()).or_insert(Dynamic::Null);
                    if !entry.is_known() {
                        *entry = if next_is_index {
                            Dynamic::List(Vec::new())
                        } else {
                            Dynamic::Map(HashMap::new())
                        };
                    }
                    entry
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => usize::try_from(*i)
                    .ok()
                    .and_then(|i| l.get_mut(i))
                    .ok_or(TfplugError::IndexOutOfBounds(*i))?,
                _ => return Err(TfplugError::InvalidPath(path.to_string())),
            };
        }

        if !matches!(current, Dynamic::Map(_) | Dynamic::List(_)) {
            *current = Dynamic::Map(HashMap::new());
        }

        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                let slot = usize::try_from(*i)
                    .ok()
                    .and_then(|i| l.get_mut(i))
                    .ok_or(TfplugError::IndexOutOfBounds(*i))?;
                *slot = new_value;
                Ok(())
            }
            _ => Err(TfplugError::InvalidPath(path.to_string())),
        }
    }
}

fn type_mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) => {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                AttributePathStep::ElementKeyString(key) => write!(f, "[{:?}]", key)?,
                AttributePathStep::ElementKeyInt(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributePathStep {
    /// Access attribute by name in object/map
    AttributeName(String),
    /// Access element by string key (for maps)
    ElementKeyString(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Queries over a collection of diagnostics
pub trait DiagnosticsExt {
    fn has_error(&self) -> bool;
    fn errors(&self) -> Vec<&Diagnostic>;
}

impl DiagnosticsExt for [Diagnostic] {
    fn has_error(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }

    fn errors(&self) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.is_error()).collect()
    }
}

/// ClientCapabilities indicates Terraform client capabilities
#[derive(Debug, Clone, Default)]
pub struct ClientCapabilities {
    pub deferral_allowed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::new(Dynamic::Map(HashMap::new()));
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        let result = dv.get_string(&AttributePath::new("name")).unwrap();
        assert_eq!(result, "test");
    }

    #[test]
    fn dynamic_value_nested_access() {
        let mut dv = DynamicValue::new(Dynamic::Map(HashMap::new()));
        let path = AttributePath::new("config").attribute("endpoint");
        dv.set_string(&path, "https://example.com".to_string())
            .unwrap();

        let result = dv.get_string(&path).unwrap();
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn set_replaces_unknown_parent_object() {
        let mut dv = DynamicValue::new(Dynamic::object([("message_vpn", Dynamic::Unknown)]));
        let path = AttributePath::new("message_vpn").attribute("max_msg_spool_usage");
        dv.set_number(&path, 5000.0).unwrap();

        assert_eq!(dv.get_number(&path).unwrap(), 5000.0);
    }

    #[test]
    fn get_through_unknown_parent_is_unknown() {
        let dv = DynamicValue::new(Dynamic::object([("message_vpn", Dynamic::Unknown)]));
        let path = AttributePath::new("message_vpn").attribute("name");

        assert_eq!(dv.get(&path), Dynamic::Unknown);
        assert_eq!(dv.get(&AttributePath::new("missing")), Dynamic::Null);
    }

    #[test]
    fn list_index_access() {
        let dv = DynamicValue::new(Dynamic::object([(
            "hostnames",
            Dynamic::List(vec![Dynamic::String("a.example.com".to_string())]),
        )]));

        assert_eq!(
            dv.get_string(&AttributePath::new("hostnames").index(0))
                .unwrap(),
            "a.example.com"
        );
        assert!(matches!(
            dv.get_string(&AttributePath::new("hostnames").index(3)),
            Err(TfplugError::IndexOutOfBounds(3))
        ));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let dv = DynamicValue::new(Dynamic::object([("locked", Dynamic::Bool(true))]));
        let err = dv.get_string(&AttributePath::new("locked")).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected string, got bool");
    }

    #[test]
    fn json_keeps_unknown_marker() {
        let dv = DynamicValue::new(Dynamic::object([
            ("id", Dynamic::Unknown),
            ("name", Dynamic::String("broker".to_string())),
        ]));

        let decoded = DynamicValue::decode_json(&dv.encode_json().unwrap()).unwrap();
        assert_eq!(decoded, dv);
    }

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::new("connection_endpoints")
            .index(0)
            .attribute("ports")
            .attribute("smf");
        assert_eq!(path.to_string(), "connection_endpoints[0].ports.smf");
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Dynamic::String("a".to_string()).to_string(), "\"a\"");
        assert_eq!(Dynamic::Number(10.0).to_string(), "10");
    }

    #[test]
    fn diagnostics_ext_detects_errors() {
        let diags = vec![Diagnostic::warning("careful", "")];
        assert!(!diags.has_error());

        let diags = vec![Diagnostic::warning("careful", ""), Diagnostic::error("boom", "")];
        assert!(diags.has_error());
        assert_eq!(diags.errors().len(), 1);
    }
}
