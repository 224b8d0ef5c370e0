use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tfplug::Context;
use url::Url;

use super::error::ApiError;
use super::models::{
    CreateServiceRequest, EventBrokerService, Operation, UpdateMessageSpoolRequest,
    UpdateServiceRequest,
};
use super::{
    build_response, ApiResponse, Endpoint, ServiceApi, CREATE_SERVICE, DELETE_SERVICE,
    GET_SERVICE, GET_SERVICE_OPERATION, UPDATE_MESSAGE_SPOOL, UPDATE_SERVICE,
};

const API_PREFIX: &str = "/api/v2/missionControl";
const SERVICE_EXPAND: &str = "broker,serviceConnectionEndpoints,messageSpoolDetails";
const ISSUER: &str = "terraform-provider-solacecloud";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Mission Control API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl Client {
    /// Create a new API client authenticating with a bearer token
    pub fn new(base_url: &Url, api_token: &str) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                auth_header: format!("Bearer {}", api_token),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!(
            "{}{}{}",
            self.inner.base_url, API_PREFIX, path
        ))?)
    }

    fn service_path(id: &str) -> String {
        format!("/eventBrokerServices/{}", urlencoding::encode(id))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(ACCEPT, "application/json")
            .header("x-issuer", ISSUER)
    }

    /// Send `request` unless `ctx` is cancelled first, then map the
    /// response through the endpoint's status contract
    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(ApiError::Cancelled),
            result = exchange => result?,
        };

        tracing::debug!(status, "Response received");
        build_response(endpoint, status, body)
    }
}

#[async_trait]
impl ServiceApi for Client {
    async fn create_service(
        &self,
        ctx: &Context,
        request: &CreateServiceRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        let url = self.url("/eventBrokerServices")?;
        tracing::debug!("POST request to: {}", url);

        let builder = self.request(reqwest::Method::POST, url).json(request);
        self.execute(ctx, CREATE_SERVICE, builder).await
    }

    async fn get_service(
        &self,
        ctx: &Context,
        id: &str,
        expand: bool,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        let mut url = self.url(&Self::service_path(id))?;
        if expand {
            url.query_pairs_mut().append_pair("expand", SERVICE_EXPAND);
        }
        tracing::debug!("GET request to: {}", url);

        let builder = self.request(reqwest::Method::GET, url);
        self.execute(ctx, GET_SERVICE, builder).await
    }

    async fn delete_service(
        &self,
        ctx: &Context,
        id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        let url = self.url(&Self::service_path(id))?;
        tracing::debug!("DELETE request to: {}", url);

        let builder = self.request(reqwest::Method::DELETE, url);
        self.execute(ctx, DELETE_SERVICE, builder).await
    }

    async fn update_service(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateServiceRequest,
    ) -> Result<ApiResponse<EventBrokerService>, ApiError> {
        let url = self.url(&Self::service_path(id))?;
        tracing::debug!("PATCH request to: {}", url);

        let builder = self.request(reqwest::Method::PATCH, url).json(request);
        self.execute(ctx, UPDATE_SERVICE, builder).await
    }

    async fn update_message_spool(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateMessageSpoolRequest,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        let url = self.url(&format!("{}/messageSpool", Self::service_path(id)))?;
        tracing::debug!("PATCH request to: {}", url);

        let builder = self.request(reqwest::Method::PATCH, url).json(request);
        self.execute(ctx, UPDATE_MESSAGE_SPOOL, builder).await
    }

    async fn get_service_operation(
        &self,
        ctx: &Context,
        service_id: &str,
        operation_id: &str,
    ) -> Result<ApiResponse<Operation>, ApiError> {
        let url = self.url(&format!(
            "{}/operations/{}",
            Self::service_path(service_id),
            urlencoding::encode(operation_id)
        ))?;
        tracing::debug!("GET request to: {}", url);

        let builder = self.request(reqwest::Method::GET, url);
        self.execute(ctx, GET_SERVICE_OPERATION, builder).await
    }
}
