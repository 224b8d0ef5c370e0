//! Typed state model of the service resource
//!
//! Every nested object converts to and from [`Dynamic`] through
//! [`StateValue`]. Attributes are tri-state ([`Attr`]) because a planned
//! value may be unknown until apply.

pub mod credential;
pub mod dmr_cluster;
pub mod endpoint;
pub mod message_vpn;
pub mod ports;
pub mod service;

pub use credential::BasicAuthCredential;
pub use dmr_cluster::DmrClusterInfo;
pub use endpoint::ConnectionEndpoint;
pub use message_vpn::MessageVpn;
pub use ports::{Protocol, ProtocolPorts};
pub use service::{custom_router_prefix, ServiceModel};

use std::collections::HashMap;
use tfplug::types::{AttributePath, Diagnostic, Dynamic};
use thiserror::Error;

/// Largest integer magnitude a state number holds exactly
const MAX_EXACT_INTEGER: i64 = 1 << 53;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0} cannot be represented exactly as a state number")]
    NotRepresentable(i64),

    #[error("{0} is not an integer")]
    NotAnInteger(f64),

    #[error("attribute {name}: {source}")]
    Attribute {
        name: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    fn mismatch(expected: &'static str, actual: &Dynamic) -> Self {
        ConversionError::TypeMismatch {
            expected,
            actual: actual.type_name(),
        }
    }

    fn in_attribute(self, name: &str) -> Self {
        ConversionError::Attribute {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

/// A value that has a representation in resource state
pub trait StateValue: Sized {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError>;
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

impl StateValue for String {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::String(self.clone()))
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ConversionError::mismatch("string", value))
    }
}

impl StateValue for bool {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(Dynamic::Bool(*self))
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        value
            .as_bool()
            .ok_or_else(|| ConversionError::mismatch("bool", value))
    }
}

impl StateValue for i64 {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        if self.unsigned_abs() > MAX_EXACT_INTEGER as u64 {
            return Err(ConversionError::NotRepresentable(*self));
        }
        Ok(Dynamic::Number(*self as f64))
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let number = value
            .as_number()
            .ok_or_else(|| ConversionError::mismatch("number", value))?;
        if number.fract() != 0.0 || number.abs() > MAX_EXACT_INTEGER as f64 {
            return Err(ConversionError::NotAnInteger(number));
        }
        Ok(number as i64)
    }
}

impl<T: StateValue> StateValue for Vec<T> {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        self.iter()
            .map(StateValue::to_dynamic)
            .collect::<Result<Vec<_>, _>>()
            .map(Dynamic::List)
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::List(items) => items.iter().map(T::from_dynamic).collect(),
            other => Err(ConversionError::mismatch("list", other)),
        }
    }
}

/// Tri-state attribute value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attr<T> {
    #[default]
    Null,
    Unknown,
    Known(T),
}

impl<T> Attr<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Attr::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Attr::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Unknown becomes null; a value persisted to state must be decided.
    pub fn unknown_as_null(self) -> Self {
        match self {
            Attr::Unknown => Attr::Null,
            other => other,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
            Attr::Known(value) => Attr::Known(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Attr::Null, Attr::Known)
    }
}

impl<T: Clone> Attr<T> {
    /// The known value, if any, as an owned `Option`
    pub fn cloned(&self) -> Option<T> {
        self.known().cloned()
    }
}

impl<T: StateValue> StateValue for Attr<T> {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        match self {
            Attr::Null => Ok(Dynamic::Null),
            Attr::Unknown => Ok(Dynamic::Unknown),
            Attr::Known(value) => value.to_dynamic(),
        }
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Null => Ok(Attr::Null),
            Dynamic::Unknown => Ok(Attr::Unknown),
            known => T::from_dynamic(known).map(Attr::Known),
        }
    }
}

/// Borrow `value` as an object's attribute map
pub(crate) fn as_object(value: &Dynamic) -> Result<&HashMap<String, Dynamic>, ConversionError> {
    match value {
        Dynamic::Map(map) => Ok(map),
        other => Err(ConversionError::mismatch("object", other)),
    }
}

/// Decode one attribute of an object. A missing attribute reads as null.
pub(crate) fn field<T: StateValue>(
    object: &HashMap<String, Dynamic>,
    name: &str,
) -> Result<Attr<T>, ConversionError> {
    match object.get(name) {
        Some(value) => Attr::from_dynamic(value).map_err(|e| e.in_attribute(name)),
        None => Ok(Attr::Null),
    }
}

/// Builds an object value attribute by attribute
#[derive(Default)]
pub(crate) struct ObjectWriter {
    fields: HashMap<String, Dynamic>,
}

impl ObjectWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn field<T: StateValue>(
        mut self,
        name: &str,
        value: &Attr<T>,
    ) -> Result<Self, ConversionError> {
        let encoded = value.to_dynamic().map_err(|e| e.in_attribute(name))?;
        self.fields.insert(name.to_string(), encoded);
        Ok(self)
    }

    pub(crate) fn finish(self) -> Dynamic {
        Dynamic::Map(self.fields)
    }
}

/// Unwrap an encoding result. A failure becomes an error diagnostic on
/// `path` and an unknown value, never a partially built object.
pub fn encode_or_unknown(
    result: Result<Dynamic, ConversionError>,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) -> Dynamic {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(attribute = %path, error = %e, "Failed to encode state value");
            diagnostics.push(
                Diagnostic::error(
                    "Value Conversion Error",
                    format!("Could not convert the value of {}: {}", path, e),
                )
                .with_attribute(path.clone()),
            );
            Dynamic::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_round_trip_through_numbers() {
        let encoded = 55443_i64.to_dynamic().unwrap();
        assert_eq!(encoded, Dynamic::Number(55443.0));
        assert_eq!(i64::from_dynamic(&encoded).unwrap(), 55443);
    }

    #[test]
    fn oversized_integers_are_not_representable() {
        let too_big = (1_i64 << 53) + 1;
        assert_eq!(
            too_big.to_dynamic(),
            Err(ConversionError::NotRepresentable(too_big))
        );
        assert!((1_i64 << 53).to_dynamic().is_ok());
    }

    #[test]
    fn fractional_numbers_are_rejected() {
        assert_eq!(
            i64::from_dynamic(&Dynamic::Number(1.5)),
            Err(ConversionError::NotAnInteger(1.5))
        );
    }

    #[test]
    fn attr_keeps_null_and_unknown() {
        assert_eq!(Attr::<String>::from_dynamic(&Dynamic::Null).unwrap(), Attr::Null);
        assert_eq!(
            Attr::<String>::from_dynamic(&Dynamic::Unknown).unwrap(),
            Attr::Unknown
        );
        assert_eq!(Attr::<bool>::Unknown.to_dynamic().unwrap(), Dynamic::Unknown);
    }

    #[test]
    fn field_errors_name_the_attribute() {
        let object = HashMap::from([("port".to_string(), Dynamic::String("x".to_string()))]);
        let err = field::<i64>(&object, "port").unwrap_err();
        assert!(err.to_string().starts_with("attribute port:"));

        assert_eq!(field::<i64>(&object, "missing").unwrap(), Attr::Null);
    }

    #[test]
    fn encode_failure_yields_unknown_and_diagnostic() {
        let mut diagnostics = Vec::new();
        let path = AttributePath::new("message_vpn");
        let value = encode_or_unknown(
            Err(ConversionError::NotRepresentable(i64::MAX)),
            &path,
            &mut diagnostics,
        );

        assert_eq!(value, Dynamic::Unknown);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some(path));
    }
}
