//! Mission Control wire models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lists come back as `null` as often as they are left out
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Every successful Mission Control body wraps its payload in `data`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    #[serde(alias = "INPROGRESS")]
    InProgress,
    Succeeded,
    Failed,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::InProgress => "IN_PROGRESS",
            OperationStatus::Succeeded => "SUCCEEDED",
            OperationStatus::Failed => "FAILED",
            OperationStatus::Other => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Long-running operation returned by mutating calls
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: Option<String>,
    pub operation_type: Option<String>,
    pub resource_id: Option<String>,
    pub status: Option<OperationStatus>,
    pub created_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreationState {
    #[serde(alias = "INPROGRESS")]
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for CreationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CreationState::InProgress => "IN_PROGRESS",
            CreationState::Completed => "COMPLETED",
            CreationState::Failed => "FAILED",
            CreationState::Other => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBrokerService {
    pub id: Option<String>,
    pub name: Option<String>,
    pub datacenter_id: Option<String>,
    pub service_class_id: Option<String>,
    pub event_broker_service_version: Option<String>,
    pub owned_by: Option<String>,
    pub locked: Option<bool>,
    pub environment_id: Option<String>,
    pub creation_state: Option<CreationState>,
    pub msg_vpn_name: Option<String>,
    pub broker: Option<Broker>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub service_connection_endpoints: Vec<ServiceConnectionEndpoint>,
    pub message_spool_details: Option<MessageSpoolDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub max_spool_usage: Option<i64>,
    pub redundancy_group_ssl_enabled: Option<bool>,
    pub cluster: Option<Cluster>,
    pub management_read_only_login_credential: Option<LoginCredential>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub msg_vpns: Vec<MsgVpn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: Option<String>,
    pub password: Option<String>,
    pub remote_address: Option<String>,
    pub primary_router_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub supported_authentication_mode: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpn {
    pub msg_vpn_name: Option<String>,
    pub authentication_basic_enabled: Option<bool>,
    pub authentication_basic_type: Option<String>,
    pub authentication_client_cert_enabled: Option<bool>,
    pub authentication_client_cert_validate_date_enabled: Option<bool>,
    pub max_connection_count: Option<i64>,
    pub max_egress_flow_count: Option<i64>,
    pub max_endpoint_count: Option<i64>,
    pub max_ingress_flow_count: Option<i64>,
    pub max_msg_spool_usage: Option<i64>,
    pub max_subscription_count: Option<i64>,
    pub max_transacted_session_count: Option<i64>,
    pub max_transaction_count: Option<i64>,
    pub truststore_uri: Option<String>,
    pub mission_control_manager_login_credential: Option<LoginCredential>,
    pub management_admin_login_credential: Option<LoginCredential>,
    pub service_login_credential: Option<LoginCredential>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredential {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for LoginCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConnectionEndpoint {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub access_type: Option<String>,
    pub k8s_service_type: Option<String>,
    pub k8s_service_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub host_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ports: Vec<EndpointPort>,
}

/// One protocol slot of a connection endpoint, keyed by its wire name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPort {
    pub protocol: String,
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSpoolDetails {
    pub default_gb_size: Option<i64>,
    pub total_gb_size: Option<i64>,
}

/// Body of `POST /eventBrokerServices`. Fields left as `None` are omitted
/// so the service applies its own defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub datacenter_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_spool_usage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_broker_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_router_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_group_ssl_enabled: Option<bool>,
}

/// Body of `PATCH /eventBrokerServices/{id}`, carrying only changed fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl UpdateServiceRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.owned_by.is_none() && self.locked.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateMessageSpoolRequest {
    #[serde(rename = "messageSpoolSizeInGB")]
    pub message_spool_size_in_gb: i64,
}
