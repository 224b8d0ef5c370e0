//! Scripted in-memory [`ServiceApi`] for reconciler tests

#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Mutex;
use tfplug::Context;

use super::error::ApiError;
use super::models::{
    CreateServiceRequest, EventBrokerService, Operation, UpdateMessageSpoolRequest,
    UpdateServiceRequest,
};
use super::{
    build_response, ApiResponse, Endpoint, ServiceApi, CREATE_SERVICE, DELETE_SERVICE,
    GET_SERVICE, GET_SERVICE_OPERATION, UPDATE_MESSAGE_SPOOL, UPDATE_SERVICE,
};

/// A recorded call against the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(String),
    Poll(String),
    Get(String),
    Delete(String),
    Update(String, UpdateServiceRequest),
    Spool(String, i64),
    Operation(String, String),
}

/// Scripted reply: either a status and body run through the normal
/// response mapping, or a transport failure
#[derive(Debug, Clone)]
enum Reply {
    Http(u16, String),
    Transport(String),
}

#[derive(Default)]
struct Script {
    create: VecDeque<Reply>,
    poll: VecDeque<Reply>,
    get: VecDeque<Reply>,
    delete: VecDeque<Reply>,
    update: VecDeque<Reply>,
    spool: VecDeque<Reply>,
    operation: VecDeque<Reply>,
}

/// Each method pops its next scripted reply. The last reply of a queue
/// repeats, so a single entry answers every call.
#[derive(Default)]
pub struct FakeServiceApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl FakeServiceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.create, Reply::Http(status, body.into()))
    }

    /// Replies to unexpanded GETs, as issued while waiting for creation
    pub fn on_poll(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.poll, Reply::Http(status, body.into()))
    }

    /// Replies to expanded GETs, as issued by reads
    pub fn on_get(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.get, Reply::Http(status, body.into()))
    }

    pub fn on_get_transport_error(self, message: &str) -> Self {
        self.push(|s| &mut s.get, Reply::Transport(message.to_string()))
    }

    pub fn on_delete(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.delete, Reply::Http(status, body.into()))
    }

    pub fn on_delete_transport_error(self, message: &str) -> Self {
        self.push(|s| &mut s.delete, Reply::Transport(message.to_string()))
    }

    pub fn on_update(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.update, Reply::Http(status, body.into()))
    }

    pub fn on_spool(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.spool, Reply::Http(status, body.into()))
    }

    pub fn on_operation(self, status: u16, body: impl Into<String>) -> Self {
        self.push(|s| &mut s.operation, Reply::Http(status, body.into()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(*c)).count()
    }

    fn push(self, queue: impl FnOnce(&mut Script) -> &mut VecDeque<Reply>, reply: Reply) -> Self {
        queue(&mut self.script.lock().unwrap()).push_back(reply);
        self
    }

    fn reply<T: DeserializeOwned>(
        &self,
        call: Call,
        endpoint: Endpoint,
        queue: impl FnOnce(&mut Script) -> &mut VecDeque<Reply>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.calls.lock().unwrap().push(call.clone());

        let reply = {
            let mut script = self.script.lock().unwrap();
            let queue = queue(&mut script);
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match reply {
            Some(Reply::Http(status, body)) => build_response(endpoint, status, body),
            Some(Reply::Transport(message)) => Err(ApiError::ParseError(message)),
            None => panic!("no scripted reply for {:?}", call),
        }
    }
}

#[async_trait]
impl ServiceApi for FakeServiceApi {
    async fn create_service(
        &self,
        _ctx: &Context,
        request: &CreateServiceRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        let body = serde_json::to_string(request).unwrap();
        self.reply(Call::Create(body), CREATE_SERVICE, |s| &mut s.create)
    }

    async fn get_service(
        &self,
        _ctx: &Context,
        id: &str,
        expand: bool,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        if expand {
            self.reply(Call::Get(id.to_string()), GET_SERVICE, |s| &mut s.get)
        } else {
            self.reply(Call::Poll(id.to_string()), GET_SERVICE, |s| &mut s.poll)
        }
    }

    async fn delete_service(
        &self,
        _ctx: &Context,
        id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        self.reply(Call::Delete(id.to_string()), DELETE_SERVICE, |s| {
            &mut s.delete
        })
    }

    async fn update_service(
        &self,
        _ctx: &Context,
        id: &str,
        request: &UpdateServiceRequest,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        self.reply(
            Call::Update(id.to_string(), request.clone()),
            UPDATE_SERVICE,
            |s| &mut s.update,
        )
    }

    async fn update_message_spool(
        &self,
        _ctx: &Context,
        id: &str,
        request: &UpdateMessageSpoolRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        self.reply(
            Call::Spool(id.to_string(), request.message_spool_size_in_gb),
            UPDATE_MESSAGE_SPOOL,
            |s| &mut s.spool,
        )
    }

    async fn get_service_operation(
        &self,
        _ctx: &Context,
        service_id: &str,
        operation_id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        self.reply(
            Call::Operation(service_id.to_string(), operation_id.to_string()),
            GET_SERVICE_OPERATION,
            |s| &mut s.operation,
        )
    }
}

/// An expanded service body with one endpoint and full credentials
pub fn service_body(id: &str, creation_state: &str) -> String {
    serde_json::json!({
        "data": {
            "id": id,
            "name": "demo-service",
            "datacenterId": "aks-canadacentral",
            "serviceClassId": "DEVELOPER",
            "eventBrokerServiceVersion": "10.8.1.152-7",
            "ownedBy": "user-1",
            "locked": false,
            "environmentId": "env-1",
            "creationState": creation_state,
            "msgVpnName": "demo-vpn",
            "broker": {
                "maxSpoolUsage": 20,
                "redundancyGroupSslEnabled": false,
                "cluster": {
                    "name": "demo-cluster",
                    "password": "cluster-secret",
                    "remoteAddress": "mr-connection-abc.messaging.solace.cloud",
                    "primaryRouterName": "myrouterprimarycn1234",
                    "supportedAuthenticationMode": ["BASIC"]
                },
                "managementReadOnlyLoginCredential": {
                    "username": "viewer",
                    "password": "viewer-secret"
                },
                "msgVpns": [{
                    "msgVpnName": "demo-vpn",
                    "authenticationBasicEnabled": true,
                    "authenticationBasicType": "INTERNAL",
                    "authenticationClientCertEnabled": false,
                    "authenticationClientCertValidateDateEnabled": false,
                    "maxConnectionCount": 100,
                    "maxEgressFlowCount": 100,
                    "maxEndpointCount": 100,
                    "maxIngressFlowCount": 100,
                    "maxMsgSpoolUsage": 20000,
                    "maxSubscriptionCount": 5000,
                    "maxTransactedSessionCount": 100,
                    "maxTransactionCount": 100,
                    "truststoreUri": "https://truststore.example",
                    "missionControlManagerLoginCredential": {
                        "username": "manager",
                        "password": "manager-secret"
                    },
                    "managementAdminLoginCredential": {
                        "username": "editor",
                        "password": "editor-secret"
                    },
                    "serviceLoginCredential": {
                        "username": "client",
                        "password": "client-secret"
                    }
                }]
            },
            "serviceConnectionEndpoints": [{
                "id": "ep-1",
                "name": "public",
                "description": "Public endpoint",
                "accessType": "PUBLIC",
                "k8sServiceType": "LoadBalancer",
                "k8sServiceId": "k8s-1",
                "hostNames": ["demo.messaging.solace.cloud"],
                "ports": [
                    {"protocol": "serviceSmfTlsListenPort", "port": 55443},
                    {"protocol": "serviceSmfPlainTextListenPort", "port": 0},
                    {"protocol": "managementSshTlsListenPort", "port": 22},
                    {"protocol": "serviceFutureProtocolListenPort", "port": 9999}
                ]
            }]
        }
    })
    .to_string()
}

pub fn operation_body(id: &str, resource_id: &str, status: &str) -> String {
    serde_json::json!({
        "data": {
            "id": id,
            "operationType": "updateMessageSpool",
            "resourceId": resource_id,
            "status": status
        }
    })
    .to_string()
}

pub fn error_body(message: &str) -> String {
    serde_json::json!({"message": message, "errorId": "test-error"}).to_string()
}
