use tfplug::types::Dynamic;

use super::{as_object, field, Attr, ConversionError, ObjectWriter, ProtocolPorts, StateValue};
use crate::api::models::ServiceConnectionEndpoint;

/// One network ingress of a service. Entirely computed from the API.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionEndpoint {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub access_type: Attr<String>,
    pub k8s_service_type: Attr<String>,
    pub k8s_service_id: Attr<String>,
    /// The first hostname is the preferred one
    pub hostnames: Attr<Vec<String>>,
    pub ports: Attr<ProtocolPorts>,
}

impl ConnectionEndpoint {
    pub fn from_wire(endpoint: &ServiceConnectionEndpoint) -> Self {
        Self {
            id: endpoint.id.clone().into(),
            name: endpoint.name.clone().into(),
            description: endpoint.description.clone().into(),
            access_type: endpoint.access_type.clone().into(),
            k8s_service_type: endpoint.k8s_service_type.clone().into(),
            k8s_service_id: endpoint.k8s_service_id.clone().into(),
            hostnames: Attr::Known(endpoint.host_names.clone()),
            ports: Attr::Known(ProtocolPorts::from_wire(&endpoint.ports)),
        }
    }
}

impl StateValue for ConnectionEndpoint {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(ObjectWriter::new()
            .field("id", &self.id)?
            .field("name", &self.name)?
            .field("description", &self.description)?
            .field("access_type", &self.access_type)?
            .field("k8s_service_type", &self.k8s_service_type)?
            .field("k8s_service_id", &self.k8s_service_id)?
            .field("hostnames", &self.hostnames)?
            .field("ports", &self.ports)?
            .finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        Ok(Self {
            id: field(object, "id")?,
            name: field(object, "name")?,
            description: field(object, "description")?,
            access_type: field(object, "access_type")?,
            k8s_service_type: field(object, "k8s_service_type")?,
            k8s_service_id: field(object, "k8s_service_id")?,
            hostnames: field(object, "hostnames")?,
            ports: field(object, "ports")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::EndpointPort;
    use crate::model::Protocol;

    #[test]
    fn maps_wire_endpoint() {
        let endpoint = ConnectionEndpoint::from_wire(&ServiceConnectionEndpoint {
            id: Some("ep-1".to_string()),
            name: Some("public".to_string()),
            description: None,
            access_type: Some("PUBLIC".to_string()),
            k8s_service_type: Some("LoadBalancer".to_string()),
            k8s_service_id: Some("k8s-1".to_string()),
            host_names: vec!["a.example".to_string(), "b.example".to_string()],
            ports: vec![EndpointPort {
                protocol: "serviceSmfTlsListenPort".to_string(),
                port: Some(55443),
            }],
        });

        assert_eq!(endpoint.description, Attr::Null);
        assert_eq!(
            endpoint.hostnames.known().map(|h| h[0].as_str()),
            Some("a.example")
        );
        assert_eq!(
            endpoint.ports.known().and_then(|p| p.port(Protocol::SmfTls)),
            Some(55443)
        );

        let decoded = ConnectionEndpoint::from_dynamic(&endpoint.to_dynamic().unwrap()).unwrap();
        assert_eq!(decoded, endpoint);
    }
}
