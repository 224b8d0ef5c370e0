#![allow(clippy::disallowed_methods)]

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ModifyPlanRequest, ReadResourceRequest, Resource,
    ResourceWithConfigure, ResourceWithImportState, ResourceWithModifyPlan,
    UpdateResourceRequest, ValidateResourceConfigRequest,
};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

use super::{ReconcileSettings, ServiceReconciler, ServiceResource};
use crate::api::test_helpers::{
    error_body, operation_body, service_body, Call, FakeServiceApi,
};
use crate::model::{Attr, ServiceModel};
use crate::SolaceCloudProviderData;

fn settings() -> ReconcileSettings {
    ReconcileSettings {
        polling_interval: Duration::from_millis(1),
        spool_operation_timeout: Duration::from_secs(5),
    }
}

fn resource(api: &Arc<FakeServiceApi>) -> ServiceResource {
    ServiceResource::with_reconciler(ServiceReconciler::new(api.clone(), settings()))
}

fn path(name: &str) -> AttributePath {
    AttributePath::new(name)
}

fn string(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

fn planned_state() -> DynamicValue {
    let plan = ServiceModel {
        id: Attr::Unknown,
        name: Attr::Known("demo-service".to_string()),
        datacenter_id: Attr::Known("aks-canadacentral".to_string()),
        service_class_id: Attr::Known("DEVELOPER".to_string()),
        message_vpn_name: Attr::Unknown,
        max_spool_usage: Attr::Unknown,
        event_broker_version: Attr::Unknown,
        owned_by: Attr::Unknown,
        locked: Attr::Unknown,
        mate_link_encryption: Attr::Unknown,
        cluster_name: Attr::Unknown,
        environment_id: Attr::Unknown,
        connection_endpoints: Attr::Unknown,
        message_vpn: Attr::Unknown,
        dmr_cluster: Attr::Unknown,
        custom_router_name: Attr::Null,
    };
    plan.to_state(&mut Vec::new())
}

/// State of service "R" as a read reports it
async fn remote_state() -> DynamicValue {
    let api = Arc::new(FakeServiceApi::new().on_get(200, service_body("R", "COMPLETED")));
    let mut model = ServiceModel {
        id: Attr::Known("R".to_string()),
        ..Default::default()
    };
    ServiceReconciler::new(api, settings())
        .refresh(&Context::new(), &mut model)
        .await
        .unwrap();
    model.to_state(&mut Vec::new())
}

fn with(state: &DynamicValue, name: &str, value: Dynamic) -> DynamicValue {
    let mut state = state.clone();
    state.set_value(&path(name), value).unwrap();
    state
}

#[tokio::test]
async fn create_records_service_state() {
    let api = Arc::new(
        FakeServiceApi::new()
            .on_create(202, operation_body("op-1", "R", "PENDING"))
            .on_poll(200, service_body("R", "IN_PROGRESS"))
            .on_poll(200, service_body("R", "COMPLETED"))
            .on_get(200, service_body("R", "COMPLETED")),
    );

    let response = resource(&api)
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "solacecloud_service".to_string(),
                planned_state: planned_state(),
                config: DynamicValue::null(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert_eq!(state.get(&path("id")), string("R"));
    assert_eq!(state.get(&path("cluster_name")), string("demo-cluster"));
    assert_eq!(
        state.get(&path("message_vpn").attribute("max_msg_spool_usage")),
        Dynamic::Number(20000.0)
    );
    assert_eq!(
        state.get(&path("message_vpn").attribute("manager_management_credential").attribute("password")),
        string("manager-secret")
    );
    assert_eq!(api.count(|c| matches!(c, Call::Poll(_))), 2);
}

#[tokio::test]
async fn failed_creation_keeps_id_in_state() {
    let api = Arc::new(
        FakeServiceApi::new()
            .on_create(202, operation_body("op-1", "R", "PENDING"))
            .on_poll(200, service_body("R", "FAILED")),
    );

    let response = resource(&api)
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "solacecloud_service".to_string(),
                planned_state: planned_state(),
                config: DynamicValue::null(),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Resource Creation FAILED");
    assert_eq!(response.new_state.get(&path("id")), string("R"));
    assert_eq!(response.new_state.get(&path("message_vpn")), Dynamic::Null);
}

#[tokio::test]
async fn rejected_creation_leaves_no_state() {
    let api = Arc::new(FakeServiceApi::new().on_create(403, error_body("not allowed")));

    let response = resource(&api)
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "solacecloud_service".to_string(),
                planned_state: planned_state(),
                config: DynamicValue::null(),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Forbidden");
    assert_eq!(response.diagnostics[0].detail, "not allowed");
    assert!(response.new_state.is_null());
}

#[tokio::test]
async fn read_removes_vanished_service() {
    let api = Arc::new(FakeServiceApi::new().on_get(404, error_body("Could not find service R")));

    let response = resource(&api)
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "solacecloud_service".to_string(),
                current_state: remote_state().await,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.new_state.is_none());
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn read_failure_keeps_state() {
    let api = Arc::new(FakeServiceApi::new().on_get_transport_error("connection reset"));
    let current = remote_state().await;

    let response = resource(&api)
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "solacecloud_service".to_string(),
                current_state: current.clone(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert_eq!(response.new_state, Some(current));
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Error Reading Service");
}

#[tokio::test]
async fn import_then_read_fills_state() {
    let api = Arc::new(FakeServiceApi::new().on_get(200, service_body("R", "COMPLETED")));
    let resource = resource(&api);

    let imported = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "solacecloud_service".to_string(),
                id: "R".to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty());
    assert_eq!(imported.imported_resources.len(), 1);

    let state = imported.imported_resources[0].state.clone();
    assert_eq!(state.get(&path("id")), string("R"));

    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "solacecloud_service".to_string(),
                current_state: state,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    let state = response.new_state.unwrap();
    assert_eq!(state.get(&path("name")), string("demo-service"));
    assert_eq!(state.get(&path("custom_router_name")), string("myrouter"));
}

#[tokio::test]
async fn update_patches_locked_and_rereads() {
    let api = Arc::new(
        FakeServiceApi::new()
            .on_update(200, service_body("R", "COMPLETED"))
            .on_get(200, service_body("R", "COMPLETED")),
    );
    let prior = remote_state().await;
    let planned = with(&prior, "locked", Dynamic::Bool(true));

    let response = resource(&api)
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "solacecloud_service".to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(api.count(|c| matches!(c, Call::Update(..))), 1);
    assert_eq!(api.count(|c| matches!(c, Call::Spool(..))), 0);
    assert_eq!(api.count(|c| matches!(c, Call::Get(_))), 1);
    assert_eq!(response.new_state.get(&path("id")), string("R"));
}

#[tokio::test]
async fn failed_update_returns_prior_state() {
    let api = Arc::new(FakeServiceApi::new().on_update(400, error_body("Name already taken")));
    let prior = remote_state().await;
    let planned = with(&prior, "name", string("renamed"));

    let response = resource(&api)
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "solacecloud_service".to_string(),
                prior_state: prior.clone(),
                planned_state: planned.clone(),
                config: planned,
            },
        )
        .await;

    assert_eq!(response.new_state, prior);
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].detail, "Name already taken");
}

#[tokio::test]
async fn delete_of_locked_service_reports_remote_message() {
    let detail = "Service is locked and cannot be deleted.";
    let api = Arc::new(FakeServiceApi::new().on_delete(400, error_body(detail)));

    let response = resource(&api)
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "solacecloud_service".to_string(),
                prior_state: remote_state().await,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Bad Request");
    assert_eq!(response.diagnostics[0].detail, detail);
}

#[tokio::test]
async fn unconfigured_resource_reports_once() {
    let response = ServiceResource::new()
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "solacecloud_service".to_string(),
                prior_state: remote_state().await,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Provider not configured");
}

#[tokio::test]
async fn configure_accepts_provider_data() {
    let api = FakeServiceApi::new().on_delete(202, operation_body("op-2", "R", "PENDING"));
    let data: Arc<dyn Any + Send + Sync> =
        Arc::new(SolaceCloudProviderData::new(api, settings()));

    let mut resource = ServiceResource::new();
    let configured = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty());

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "solacecloud_service".to_string(),
                prior_state: remote_state().await,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn configure_rejects_foreign_provider_data() {
    let data: Arc<dyn Any + Send + Sync> = Arc::new("not provider data");

    let configured = ServiceResource::new()
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;

    assert_eq!(configured.diagnostics.len(), 1);
    assert_eq!(
        configured.diagnostics[0].summary,
        "Unexpected Resource Configure Type"
    );
}

#[tokio::test]
async fn plan_rejects_immutable_change() {
    let prior = remote_state().await;
    let proposed = with(&prior, "cluster_name", string("other-cluster"));

    let response = ServiceResource::new()
        .modify_plan(
            Context::new(),
            ModifyPlanRequest {
                type_name: "solacecloud_service".to_string(),
                config: proposed.clone(),
                prior_state: prior,
                proposed_new_state: proposed,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Immutable Attribute Change");
    assert_eq!(response.diagnostics[0].attribute, Some(path("cluster_name")));
    assert_eq!(
        response.planned_state.get(&path("cluster_name")),
        string("demo-cluster")
    );
}

#[tokio::test]
async fn plan_derives_vpn_spool_from_service_spool() {
    let prior = remote_state().await;
    let proposed = with(&prior, "max_spool_usage", Dynamic::Number(40.0));
    let config = DynamicValue::new(Dynamic::object([
        ("name", string("demo-service")),
        ("datacenter_id", string("aks-canadacentral")),
        ("max_spool_usage", Dynamic::Number(40.0)),
    ]));

    let response = ServiceResource::new()
        .modify_plan(
            Context::new(),
            ModifyPlanRequest {
                type_name: "solacecloud_service".to_string(),
                config,
                prior_state: prior,
                proposed_new_state: proposed,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .planned_state
            .get(&path("message_vpn").attribute("max_msg_spool_usage")),
        Dynamic::Number(40000.0)
    );
}

#[tokio::test]
async fn plan_for_new_service_fills_default_class() {
    let config = DynamicValue::new(Dynamic::object([
        ("name", string("demo-service")),
        ("datacenter_id", string("aks-canadacentral")),
        ("service_class_id", Dynamic::Null),
    ]));
    let proposed = with(&planned_state(), "service_class_id", Dynamic::Unknown);

    let response = ServiceResource::new()
        .modify_plan(
            Context::new(),
            ModifyPlanRequest {
                type_name: "solacecloud_service".to_string(),
                config,
                prior_state: DynamicValue::null(),
                proposed_new_state: proposed,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(
        response.planned_state.get(&path("service_class_id")),
        string("DEVELOPER")
    );
    assert!(response.planned_state.get(&path("id")).is_unknown());
}

#[tokio::test]
async fn validate_rejects_default_vpn_name() {
    let config = DynamicValue::new(Dynamic::object([
        ("name", string("demo-service")),
        ("datacenter_id", string("aks-canadacentral")),
        ("message_vpn_name", string("default")),
    ]));

    let response = ServiceResource::new()
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: "solacecloud_service".to_string(),
                config,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].attribute,
        Some(path("message_vpn_name"))
    );
}
