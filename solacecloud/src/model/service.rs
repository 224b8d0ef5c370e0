use std::collections::HashMap;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::{
    as_object, encode_or_unknown, Attr, ConnectionEndpoint, ConversionError, DmrClusterInfo,
    MessageVpn, StateValue,
};
use crate::api::models::{CreateServiceRequest, EventBrokerService};
use crate::errors::ReconcileError;

/// Marker the platform puts between a custom router prefix and the
/// generated part of a primary router name
const CUSTOM_ROUTER_MARKER: &str = "primarycn";

/// Guess the custom router name a service was created with.
///
/// The API does not report the prefix, so it is read back from the primary
/// router name: everything before `primarycn`. A router name without the
/// marker yields `None`. A prefix that happens to contain the marker cannot
/// be told apart, so the result is a best effort only.
pub fn custom_router_prefix(primary_router_name: &str) -> Option<String> {
    primary_router_name
        .split_once(CUSTOM_ROUTER_MARKER)
        .map(|(prefix, _)| prefix.to_string())
}

/// Typed view of a `solacecloud_service` state object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub event_broker_version: Attr<String>,
    pub message_vpn_name: Attr<String>,
    pub max_spool_usage: Attr<i64>,
    pub service_class_id: Attr<String>,
    pub datacenter_id: Attr<String>,
    pub cluster_name: Attr<String>,
    pub owned_by: Attr<String>,
    pub locked: Attr<bool>,
    pub mate_link_encryption: Attr<bool>,
    pub custom_router_name: Attr<String>,
    pub environment_id: Attr<String>,
    pub connection_endpoints: Attr<Vec<ConnectionEndpoint>>,
    pub message_vpn: Attr<MessageVpn>,
    pub dmr_cluster: Attr<DmrClusterInfo>,
}

fn attribute<T: StateValue>(
    object: &HashMap<String, Dynamic>,
    name: &str,
) -> Result<Attr<T>, ReconcileError> {
    let value = object.get(name).unwrap_or(&Dynamic::Null);
    Attr::from_dynamic(value).map_err(|source| ReconcileError::Conversion {
        path: AttributePath::new(name),
        source,
    })
}

impl ServiceModel {
    pub fn from_state(state: &DynamicValue) -> Result<Self, ReconcileError> {
        let object = as_object(&state.value).map_err(|source| ReconcileError::Conversion {
            path: AttributePath::root(),
            source,
        })?;

        Ok(Self {
            id: attribute(object, "id")?,
            name: attribute(object, "name")?,
            event_broker_version: attribute(object, "event_broker_version")?,
            message_vpn_name: attribute(object, "message_vpn_name")?,
            max_spool_usage: attribute(object, "max_spool_usage")?,
            service_class_id: attribute(object, "service_class_id")?,
            datacenter_id: attribute(object, "datacenter_id")?,
            cluster_name: attribute(object, "cluster_name")?,
            owned_by: attribute(object, "owned_by")?,
            locked: attribute(object, "locked")?,
            mate_link_encryption: attribute(object, "mate_link_encryption")?,
            custom_router_name: attribute(object, "custom_router_name")?,
            environment_id: attribute(object, "environment_id")?,
            connection_endpoints: attribute(object, "connection_endpoints")?,
            message_vpn: attribute(object, "message_vpn")?,
            dmr_cluster: attribute(object, "dmr_cluster")?,
        })
    }

    /// Encode into state. An attribute that cannot be encoded becomes
    /// unknown and adds an error diagnostic.
    pub fn to_state(&self, diagnostics: &mut Vec<Diagnostic>) -> DynamicValue {
        let mut object = HashMap::new();
        let mut put = |name: &str, encoded: Result<Dynamic, ConversionError>| {
            let value = encode_or_unknown(encoded, &AttributePath::new(name), diagnostics);
            object.insert(name.to_string(), value);
        };

        put("id", self.id.to_dynamic());
        put("name", self.name.to_dynamic());
        put("event_broker_version", self.event_broker_version.to_dynamic());
        put("message_vpn_name", self.message_vpn_name.to_dynamic());
        put("max_spool_usage", self.max_spool_usage.to_dynamic());
        put("service_class_id", self.service_class_id.to_dynamic());
        put("datacenter_id", self.datacenter_id.to_dynamic());
        put("cluster_name", self.cluster_name.to_dynamic());
        put("owned_by", self.owned_by.to_dynamic());
        put("locked", self.locked.to_dynamic());
        put("mate_link_encryption", self.mate_link_encryption.to_dynamic());
        put("custom_router_name", self.custom_router_name.to_dynamic());
        put("environment_id", self.environment_id.to_dynamic());
        put("connection_endpoints", self.connection_endpoints.to_dynamic());
        put("message_vpn", self.message_vpn.to_dynamic());
        put("dmr_cluster", self.dmr_cluster.to_dynamic());

        DynamicValue::new(Dynamic::Map(object))
    }

    /// Copy with every top-level unknown replaced by null, for state written
    /// after a create that failed part way.
    pub fn without_unknowns(&self) -> Self {
        let model = self.clone();
        Self {
            id: model.id.unknown_as_null(),
            name: model.name.unknown_as_null(),
            event_broker_version: model.event_broker_version.unknown_as_null(),
            message_vpn_name: model.message_vpn_name.unknown_as_null(),
            max_spool_usage: model.max_spool_usage.unknown_as_null(),
            service_class_id: model.service_class_id.unknown_as_null(),
            datacenter_id: model.datacenter_id.unknown_as_null(),
            cluster_name: model.cluster_name.unknown_as_null(),
            owned_by: model.owned_by.unknown_as_null(),
            locked: model.locked.unknown_as_null(),
            mate_link_encryption: model.mate_link_encryption.unknown_as_null(),
            custom_router_name: model.custom_router_name.unknown_as_null(),
            environment_id: model.environment_id.unknown_as_null(),
            connection_endpoints: model.connection_endpoints.unknown_as_null(),
            message_vpn: model.message_vpn.unknown_as_null(),
            dmr_cluster: model.dmr_cluster.unknown_as_null(),
        }
    }

    /// Body of the create call. Only known attributes are sent so the API
    /// applies its own defaults to the rest.
    pub fn create_request(&self) -> Result<CreateServiceRequest, ReconcileError> {
        let name = self
            .name
            .cloned()
            .ok_or(ReconcileError::MissingField("name"))?;
        let datacenter_id = self
            .datacenter_id
            .cloned()
            .ok_or(ReconcileError::MissingField("datacenter_id"))?;

        Ok(CreateServiceRequest {
            name,
            datacenter_id,
            service_class_id: self.service_class_id.cloned(),
            msg_vpn_name: self.message_vpn_name.cloned(),
            max_spool_usage: self.max_spool_usage.cloned(),
            event_broker_version: self.event_broker_version.cloned(),
            cluster_name: self.cluster_name.cloned(),
            custom_router_name: self.custom_router_name.cloned(),
            environment_id: self.environment_id.cloned(),
            locked: self.locked.cloned(),
            redundancy_group_ssl_enabled: self.mate_link_encryption.cloned(),
        })
    }

    /// Overwrite every remotely reported attribute with the expanded
    /// service detail. `id` is left alone. `custom_router_name` only changes
    /// when a prefix can be derived from the primary router name.
    pub fn apply_remote(&mut self, service: &EventBrokerService) -> Result<(), ReconcileError> {
        let broker = service
            .broker
            .as_ref()
            .ok_or(ReconcileError::MissingField("broker"))?;
        let vpn = broker
            .msg_vpns
            .first()
            .ok_or(ReconcileError::MissingField("broker.msgVpns"))?;

        self.name = service.name.clone().into();
        self.datacenter_id = service.datacenter_id.clone().into();
        self.service_class_id = service.service_class_id.clone().into();
        self.event_broker_version = service.event_broker_service_version.clone().into();
        self.owned_by = service.owned_by.clone().into();
        self.locked = service.locked.into();
        self.environment_id = service.environment_id.clone().into();
        self.message_vpn_name = vpn.msg_vpn_name.clone().into();
        self.max_spool_usage = broker.max_spool_usage.into();
        self.mate_link_encryption = broker.redundancy_group_ssl_enabled.into();

        self.message_vpn = Attr::Known(MessageVpn::from_wire(
            vpn,
            broker.management_read_only_login_credential.as_ref(),
        ));

        match &broker.cluster {
            Some(cluster) => {
                self.cluster_name = cluster.name.clone().into();
                self.dmr_cluster = Attr::Known(DmrClusterInfo::from_wire(cluster));
                if let Some(prefix) = cluster
                    .primary_router_name
                    .as_deref()
                    .and_then(custom_router_prefix)
                {
                    self.custom_router_name = Attr::Known(prefix);
                }
            }
            None => {
                self.cluster_name = Attr::Null;
                self.dmr_cluster = Attr::Null;
            }
        }

        self.connection_endpoints = Attr::Known(
            service
                .service_connection_endpoints
                .iter()
                .map(ConnectionEndpoint::from_wire)
                .collect(),
        );

        Ok(())
    }
}
