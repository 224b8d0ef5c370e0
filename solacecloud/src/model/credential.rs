use std::fmt;
use tfplug::types::Dynamic;

use super::{as_object, field, Attr, ConversionError, ObjectWriter, StateValue};
use crate::api::models::LoginCredential;

/// Username and password of one management or messaging role
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BasicAuthCredential {
    pub username: Attr<String>,
    pub password: Attr<String>,
}

impl BasicAuthCredential {
    pub fn from_wire(credential: &LoginCredential) -> Self {
        Self {
            username: credential.username.clone().into(),
            password: credential.password.clone().into(),
        }
    }
}

impl fmt::Debug for BasicAuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = match self.password {
            Attr::Known(_) => "<redacted>",
            Attr::Unknown => "<unknown>",
            Attr::Null => "<null>",
        };
        f.debug_struct("BasicAuthCredential")
            .field("username", &self.username)
            .field("password", &password)
            .finish()
    }
}

impl StateValue for BasicAuthCredential {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(ObjectWriter::new()
            .field("username", &self.username)?
            .field("password", &self.password)?
            .finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        Ok(Self {
            username: field(object, "username")?,
            password: field(object, "password")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_state() {
        let credential = BasicAuthCredential {
            username: Attr::Known("solace-cloud-client".to_string()),
            password: Attr::Known("s3cr3t!".to_string()),
        };

        let decoded =
            BasicAuthCredential::from_dynamic(&credential.to_dynamic().unwrap()).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn debug_output_redacts_password() {
        let credential = BasicAuthCredential::from_wire(&LoginCredential {
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        });

        let printed = format!("{:?}", credential);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn rejects_non_object_state() {
        assert!(BasicAuthCredential::from_dynamic(&Dynamic::String("x".to_string())).is_err());
    }
}
