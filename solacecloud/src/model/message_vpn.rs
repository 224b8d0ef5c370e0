use tfplug::types::Dynamic;

use super::{as_object, field, Attr, BasicAuthCredential, ConversionError, ObjectWriter, StateValue};
use crate::api::models::{LoginCredential, MsgVpn};

/// Message VPN of a service with its limits and role credentials
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageVpn {
    pub name: Attr<String>,
    pub authentication_basic_enabled: Attr<bool>,
    pub authentication_basic_type: Attr<String>,
    pub authentication_client_cert_enabled: Attr<bool>,
    pub authentication_client_cert_validate_date_enabled: Attr<bool>,
    pub max_connection_count: Attr<i64>,
    pub max_egress_flow_count: Attr<i64>,
    pub max_endpoint_count: Attr<i64>,
    pub max_ingress_flow_count: Attr<i64>,
    /// In MB, always 1000 times the service's max spool usage in GB
    pub max_msg_spool_usage: Attr<i64>,
    pub max_subscription_count: Attr<i64>,
    pub max_transacted_session_count: Attr<i64>,
    pub max_transaction_count: Attr<i64>,
    pub truststore_uri: Attr<String>,
    pub manager_management_credential: Attr<BasicAuthCredential>,
    pub editor_management_credential: Attr<BasicAuthCredential>,
    pub viewer_management_credential: Attr<BasicAuthCredential>,
    pub messaging_client_credential: Attr<BasicAuthCredential>,
}

fn credential(source: Option<&LoginCredential>) -> Attr<BasicAuthCredential> {
    source.map(BasicAuthCredential::from_wire).into()
}

impl MessageVpn {
    /// `viewer` is the broker's read-only management credential, reported
    /// outside the VPN itself
    pub fn from_wire(vpn: &MsgVpn, viewer: Option<&LoginCredential>) -> Self {
        let manager = vpn.mission_control_manager_login_credential.as_ref();
        if manager.is_none() {
            tracing::warn!(
                msg_vpn = vpn.msg_vpn_name.as_deref().unwrap_or_default(),
                "Message VPN has no manager credential, leaving it null"
            );
        }

        Self {
            name: vpn.msg_vpn_name.clone().into(),
            authentication_basic_enabled: vpn.authentication_basic_enabled.into(),
            authentication_basic_type: vpn.authentication_basic_type.clone().into(),
            authentication_client_cert_enabled: vpn.authentication_client_cert_enabled.into(),
            authentication_client_cert_validate_date_enabled: vpn
                .authentication_client_cert_validate_date_enabled
                .into(),
            max_connection_count: vpn.max_connection_count.into(),
            max_egress_flow_count: vpn.max_egress_flow_count.into(),
            max_endpoint_count: vpn.max_endpoint_count.into(),
            max_ingress_flow_count: vpn.max_ingress_flow_count.into(),
            max_msg_spool_usage: vpn.max_msg_spool_usage.into(),
            max_subscription_count: vpn.max_subscription_count.into(),
            max_transacted_session_count: vpn.max_transacted_session_count.into(),
            max_transaction_count: vpn.max_transaction_count.into(),
            truststore_uri: vpn.truststore_uri.clone().into(),
            manager_management_credential: credential(manager),
            editor_management_credential: credential(
                vpn.management_admin_login_credential.as_ref(),
            ),
            viewer_management_credential: credential(viewer),
            messaging_client_credential: credential(vpn.service_login_credential.as_ref()),
        }
    }
}

impl StateValue for MessageVpn {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(ObjectWriter::new()
            .field("name", &self.name)?
            .field("authentication_basic_enabled", &self.authentication_basic_enabled)?
            .field("authentication_basic_type", &self.authentication_basic_type)?
            .field(
                "authentication_client_cert_enabled",
                &self.authentication_client_cert_enabled,
            )?
            .field(
                "authentication_client_cert_validate_date_enabled",
                &self.authentication_client_cert_validate_date_enabled,
            )?
            .field("max_connection_count", &self.max_connection_count)?
            .field("max_egress_flow_count", &self.max_egress_flow_count)?
            .field("max_endpoint_count", &self.max_endpoint_count)?
            .field("max_ingress_flow_count", &self.max_ingress_flow_count)?
            .field("max_msg_spool_usage", &self.max_msg_spool_usage)?
            .field("max_subscription_count", &self.max_subscription_count)?
            .field("max_transacted_session_count", &self.max_transacted_session_count)?
            .field("max_transaction_count", &self.max_transaction_count)?
            .field("truststore_uri", &self.truststore_uri)?
            .field(
                "manager_management_credential",
                &self.manager_management_credential,
            )?
            .field(
                "editor_management_credential",
                &self.editor_management_credential,
            )?
            .field(
                "viewer_management_credential",
                &self.viewer_management_credential,
            )?
            .field("messaging_client_credential", &self.messaging_client_credential)?
            .finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        Ok(Self {
            name: field(object, "name")?,
            authentication_basic_enabled: field(object, "authentication_basic_enabled")?,
            authentication_basic_type: field(object, "authentication_basic_type")?,
            authentication_client_cert_enabled: field(
                object,
                "authentication_client_cert_enabled",
            )?,
            authentication_client_cert_validate_date_enabled: field(
                object,
                "authentication_client_cert_validate_date_enabled",
            )?,
            max_connection_count: field(object, "max_connection_count")?,
            max_egress_flow_count: field(object, "max_egress_flow_count")?,
            max_endpoint_count: field(object, "max_endpoint_count")?,
            max_ingress_flow_count: field(object, "max_ingress_flow_count")?,
            max_msg_spool_usage: field(object, "max_msg_spool_usage")?,
            max_subscription_count: field(object, "max_subscription_count")?,
            max_transacted_session_count: field(object, "max_transacted_session_count")?,
            max_transaction_count: field(object, "max_transaction_count")?,
            truststore_uri: field(object, "truststore_uri")?,
            manager_management_credential: field(object, "manager_management_credential")?,
            editor_management_credential: field(object, "editor_management_credential")?,
            viewer_management_credential: field(object, "viewer_management_credential")?,
            messaging_client_credential: field(object, "messaging_client_credential")?,
        })
    }
}
