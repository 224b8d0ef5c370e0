use std::fmt;
use tfplug::types::Dynamic;

use super::{as_object, field, Attr, ConversionError, ObjectWriter, StateValue};
use crate::api::models::Cluster;

/// DMR cluster the service's broker belongs to
#[derive(Clone, PartialEq, Eq, Default)]
pub struct DmrClusterInfo {
    pub name: Attr<String>,
    pub password: Attr<String>,
    pub remote_address: Attr<String>,
    pub primary_router_name: Attr<String>,
    pub supported_authentication_modes: Attr<Vec<String>>,
}

impl DmrClusterInfo {
    pub fn from_wire(cluster: &Cluster) -> Self {
        Self {
            name: cluster.name.clone().into(),
            password: cluster.password.clone().into(),
            remote_address: cluster.remote_address.clone().into(),
            primary_router_name: cluster.primary_router_name.clone().into(),
            supported_authentication_modes: Attr::Known(
                cluster.supported_authentication_mode.clone(),
            ),
        }
    }
}

impl fmt::Debug for DmrClusterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmrClusterInfo")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("remote_address", &self.remote_address)
            .field("primary_router_name", &self.primary_router_name)
            .field(
                "supported_authentication_modes",
                &self.supported_authentication_modes,
            )
            .finish()
    }
}

impl StateValue for DmrClusterInfo {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(ObjectWriter::new()
            .field("name", &self.name)?
            .field("password", &self.password)?
            .field("remote_address", &self.remote_address)?
            .field("primary_router_name", &self.primary_router_name)?
            .field(
                "supported_authentication_modes",
                &self.supported_authentication_modes,
            )?
            .finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        Ok(Self {
            name: field(object, "name")?,
            password: field(object, "password")?,
            remote_address: field(object, "remote_address")?,
            primary_router_name: field(object, "primary_router_name")?,
            supported_authentication_modes: field(object, "supported_authentication_modes")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_cluster_fields() {
        let info = DmrClusterInfo::from_wire(&Cluster {
            name: Some("cluster-a".to_string()),
            password: Some("pw".to_string()),
            remote_address: Some("mr-1.messaging.solace.cloud".to_string()),
            primary_router_name: Some("abcprimarycn99".to_string()),
            supported_authentication_mode: vec!["BASIC".to_string(), "CLIENT_CERT".to_string()],
        });

        let state = info.to_dynamic().unwrap();
        let Dynamic::Map(object) = &state else {
            panic!("expected object");
        };
        assert_eq!(object["name"], Dynamic::String("cluster-a".to_string()));
        assert_eq!(
            object["supported_authentication_modes"],
            Dynamic::List(vec![
                Dynamic::String("BASIC".to_string()),
                Dynamic::String("CLIENT_CERT".to_string()),
            ])
        );

        assert_eq!(DmrClusterInfo::from_dynamic(&state).unwrap(), info);
        assert!(!format!("{:?}", info).contains("\"pw\""));
    }
}
