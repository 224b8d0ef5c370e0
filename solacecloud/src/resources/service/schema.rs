//! Schema of the `solacecloud_service` resource

use std::collections::HashMap;
use std::sync::OnceLock;

use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder, Validator,
    ValidatorRequest, ValidatorResponse,
};
use tfplug::types::Diagnostic;
use tfplug::validator::{
    NumberRangeValidator, StringLengthValidator, StringOneOfValidator, StringPatternValidator,
};
use tfplug::UseStateForUnknown;

use super::plan_modifiers::{DerivedSpoolUsage, Immutable, WriteOnce};
use crate::model::Protocol;

pub const SERVICE_CLASSES: [&str; 13] = [
    "DEVELOPER",
    "ENTERPRISE_250_HIGHAVAILABILITY",
    "ENTERPRISE_1K_HIGHAVAILABILITY",
    "ENTERPRISE_5K_HIGHAVAILABILITY",
    "ENTERPRISE_10K_HIGHAVAILABILITY",
    "ENTERPRISE_50K_HIGHAVAILABILITY",
    "ENTERPRISE_100K_HIGHAVAILABILITY",
    "ENTERPRISE_250_STANDALONE",
    "ENTERPRISE_1K_STANDALONE",
    "ENTERPRISE_5K_STANDALONE",
    "ENTERPRISE_10K_STANDALONE",
    "ENTERPRISE_50K_STANDALONE",
    "ENTERPRISE_100K_STANDALONE",
];

pub const DEFAULT_SERVICE_CLASS: &str = "DEVELOPER";

/// Rejects `default` in any letter case
pub struct NameNotDefault;

impl NameNotDefault {
    pub fn create() -> Box<dyn Validator> {
        Box::new(Self)
    }
}

impl Validator for NameNotDefault {
    fn description(&self) -> String {
        "Validates that the string is not 'default'".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(name) = request.config_value.value.as_str() {
            if name.eq_ignore_ascii_case("default") {
                diagnostics.push(
                    Diagnostic::error("Invalid Name", "Name cannot be 'default'")
                        .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Object type matching a set of nested attributes
fn object_type(attributes: &[Attribute]) -> AttributeType {
    AttributeType::Object(
        attributes
            .iter()
            .map(|a| (a.name.clone(), a.r#type.clone()))
            .collect::<HashMap<_, _>>(),
    )
}

fn single_nested(name: &str, attributes: Vec<Attribute>) -> AttributeBuilder {
    AttributeBuilder::new(name, object_type(&attributes))
        .nested_type(NestedType::single(attributes))
}

fn list_nested(name: &str, attributes: Vec<Attribute>) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::List(Box::new(object_type(&attributes))))
        .nested_type(NestedType::list(attributes))
}

fn computed_string(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

fn computed_number(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Number)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

fn computed_bool(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Bool)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

/// Validators shared by the message VPN name and the cluster name
fn broker_name(builder: AttributeBuilder, max_len: usize) -> AttributeBuilder {
    builder
        .validator(StringLengthValidator::between(1, max_len))
        .validator(StringPatternValidator::create(
            r"^[A-Za-z0-9\-_]*$",
            "may only contain alphanumeric, - or _ characters",
        ))
        .validator(StringPatternValidator::create(
            r"^[a-zA-Z_].*",
            "must begin with alphabetic or _ characters",
        ))
        .validator(NameNotDefault::create())
}

fn credential(name: &str, description: &str) -> Attribute {
    single_nested(
        name,
        vec![
            computed_string("username", "The username"),
            AttributeBuilder::new("password", AttributeType::String)
                .description("The password")
                .computed()
                .sensitive()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        ],
    )
    .description(description)
    .computed()
    .sensitive()
    .plan_modifier(UseStateForUnknown::create())
    .build()
}

fn message_vpn() -> Attribute {
    single_nested(
        "message_vpn",
        vec![
            computed_string("name", "The name of the message VPN"),
            computed_bool(
                "authentication_basic_enabled",
                "Whether basic authentication is enabled",
            ),
            AttributeBuilder::new("authentication_basic_type", AttributeType::String)
                .description("The basic authentication type")
                .computed()
                .validator(StringOneOfValidator::create(&[
                    "INTERNAL", "LDAP", "RADIUS", "NONE",
                ]))
                .plan_modifier(UseStateForUnknown::create())
                .build(),
            computed_bool(
                "authentication_client_cert_enabled",
                "Whether client certificate authentication is enabled",
            ),
            computed_bool(
                "authentication_client_cert_validate_date_enabled",
                "Whether the validity dates of client certificates are checked",
            ),
            computed_number("max_connection_count", "Maximum number of client connections"),
            computed_number("max_egress_flow_count", "Maximum number of egress flows"),
            computed_number("max_endpoint_count", "Maximum number of queues and topic endpoints"),
            computed_number("max_ingress_flow_count", "Maximum number of ingress flows"),
            AttributeBuilder::new("max_msg_spool_usage", AttributeType::Number)
                .description("Maximum message spool usage in MB")
                .computed()
                .plan_modifier(DerivedSpoolUsage::create())
                .build(),
            computed_number("max_subscription_count", "Maximum number of subscriptions"),
            computed_number(
                "max_transacted_session_count",
                "Maximum number of transacted sessions",
            ),
            computed_number("max_transaction_count", "Maximum number of transactions"),
            computed_string("truststore_uri", "URI of the trust store"),
            credential(
                "manager_management_credential",
                "Credential of the manager management role",
            ),
            credential(
                "editor_management_credential",
                "Credential of the editor management role",
            ),
            credential(
                "viewer_management_credential",
                "Credential of the read-only management role",
            ),
            credential(
                "messaging_client_credential",
                "Credential of the messaging client",
            ),
        ],
    )
    .description("The message VPN of the service")
    .computed()
    .plan_modifier(UseStateForUnknown::create())
    .build()
}

fn dmr_cluster() -> Attribute {
    single_nested(
        "dmr_cluster",
        vec![
            computed_string("name", "The name of the DMR cluster"),
            AttributeBuilder::new("password", AttributeType::String)
                .description("The password of the DMR cluster")
                .computed()
                .sensitive()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
            computed_string("remote_address", "The remote address of the DMR cluster"),
            computed_string("primary_router_name", "The primary router name"),
            AttributeBuilder::new(
                "supported_authentication_modes",
                AttributeType::List(Box::new(AttributeType::String)),
            )
            .description("Authentication modes the DMR cluster supports")
            .computed()
            .plan_modifier(UseStateForUnknown::create())
            .build(),
        ],
    )
    .description("The DMR cluster the service belongs to")
    .computed()
    .build()
}

fn connection_endpoints() -> Attribute {
    let ports = Protocol::ALL
        .into_iter()
        .map(|protocol| {
            single_nested(
                protocol.attribute_name(),
                vec![AttributeBuilder::new("port", AttributeType::Number)
                    .description("The port number")
                    .computed()
                    .build()],
            )
            .computed()
            .build()
        })
        .collect();

    list_nested(
        "connection_endpoints",
        vec![
            computed_string("id", "The identifier of the connection endpoint"),
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the connection endpoint")
                .computed()
                .validator(StringLengthValidator::between(1, 50))
                .build(),
            AttributeBuilder::new("description", AttributeType::String)
                .description("The description of the connection endpoint")
                .computed()
                .build(),
            AttributeBuilder::new("access_type", AttributeType::String)
                .description("Whether the endpoint is PRIVATE or PUBLIC")
                .computed()
                .validator(StringOneOfValidator::create(&["PRIVATE", "PUBLIC"]))
                .build(),
            AttributeBuilder::new("k8s_service_type", AttributeType::String)
                .description("The Kubernetes service type of the endpoint")
                .computed()
                .validator(StringOneOfValidator::create(&[
                    "NodePort",
                    "LoadBalancer",
                    "ClusterIP",
                ]))
                .build(),
            AttributeBuilder::new("k8s_service_id", AttributeType::String)
                .description("The Kubernetes service identifier")
                .computed()
                .build(),
            AttributeBuilder::new("hostnames", AttributeType::List(Box::new(AttributeType::String)))
                .description("Hostnames of the endpoint, preferred first")
                .computed()
                .build(),
            single_nested("ports", ports)
                .description("Enabled protocols and their ports")
                .computed()
                .build(),
        ],
    )
    .description("The connection endpoints of the service")
    .computed()
    .plan_modifier(UseStateForUnknown::create())
    .build()
}

fn build_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("An event broker service in Solace Cloud")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .description("The identifier of the service")
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the service")
                .required()
                .validator(StringLengthValidator::between(1, 50))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("event_broker_version", AttributeType::String)
                .description("The event broker version, resolved by Solace Cloud when not set")
                .optional()
                .computed()
                .validator(StringPatternValidator::create(
                    r"^\d+\.\d+\.\d+\.\d+-\d+$",
                    "event broker version format is major.minor.load.build-cloudRevision",
                ))
                .plan_modifier(UseStateForUnknown::create())
                .plan_modifier(Immutable::create())
                .build(),
        )
        .attribute(
            broker_name(
                AttributeBuilder::new("message_vpn_name", AttributeType::String)
                    .description("The name of the message VPN")
                    .optional()
                    .computed(),
                26,
            )
            .plan_modifier(UseStateForUnknown::create())
            .plan_modifier(Immutable::create())
            .build(),
        )
        .attribute(
            AttributeBuilder::new("max_spool_usage", AttributeType::Number)
                .description("The maximum message spool usage in GB")
                .optional()
                .computed()
                .validator(NumberRangeValidator::between(10.0, 6000.0))
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("service_class_id", AttributeType::String)
                .description("The class of the service")
                .optional()
                .computed()
                .validator(StringOneOfValidator::create(&SERVICE_CLASSES))
                .default(StaticDefault::string(DEFAULT_SERVICE_CLASS))
                .plan_modifier(UseStateForUnknown::create())
                .plan_modifier(Immutable::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("datacenter_id", AttributeType::String)
                .description("The datacenter the service runs in")
                .required()
                .validator(StringLengthValidator::between(1, 50))
                .plan_modifier(Immutable::create())
                .build(),
        )
        .attribute(
            broker_name(
                AttributeBuilder::new("cluster_name", AttributeType::String)
                    .description("The name of the DMR cluster")
                    .optional()
                    .computed(),
                64,
            )
            .plan_modifier(UseStateForUnknown::create())
            .plan_modifier(Immutable::create())
            .build(),
        )
        .attribute(
            AttributeBuilder::new("owned_by", AttributeType::String)
                .description("The identifier of the owning user")
                .optional()
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("locked", AttributeType::Bool)
                .description("Whether the service is protected from deletion")
                .optional()
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("mate_link_encryption", AttributeType::Bool)
                .description("Whether traffic between redundancy group members is encrypted")
                .optional()
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(connection_endpoints())
        .attribute(
            AttributeBuilder::new("custom_router_name", AttributeType::String)
                .description("Prefix of the router names. Only used at creation.")
                .optional()
                .plan_modifier(WriteOnce::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("environment_id", AttributeType::String)
                .description("The environment the service belongs to")
                .optional()
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .plan_modifier(Immutable::create())
                .build(),
        )
        .attribute(message_vpn())
        .attribute(dmr_cluster())
        .build()
}

/// The resource schema, built on first use
pub fn service_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}
