//! `solacecloud_service` resource
//!
//! Translates framework requests into [`ServiceModel`]s and hands them to
//! the [`ServiceReconciler`]. Every failure is reported as exactly one
//! diagnostic.

pub mod plan_modifiers;
pub mod reconciler;
pub mod schema;

#[cfg(test)]
mod tests;

pub use reconciler::{CreateFailure, ReconcileSettings, ServiceReconciler};
pub use schema::service_schema;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import_state_passthrough_id;
use tfplug::plan_modifier::apply_schema_plan;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceMetadataRequest, ResourceMetadataResponse, ResourceSchemaRequest,
    ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    ResourceWithModifyPlan, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::validate_config;

use crate::model::ServiceModel;
use crate::SolaceCloudProviderData;

pub const TYPE_NAME: &str = "solacecloud_service";

fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "The solacecloud provider must be configured before the service resource is used",
    )
}

#[derive(Default)]
pub struct ServiceResource {
    reconciler: Option<ServiceReconciler>,
}

impl ServiceResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reconciler(reconciler: ServiceReconciler) -> Self {
        Self {
            reconciler: Some(reconciler),
        }
    }

    /// Factory registered with the provider
    pub fn factory() -> Box<dyn ResourceWithConfigure> {
        Box::new(Self::new())
    }
}

#[async_trait]
impl Resource for ServiceResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: service_schema().clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: validate_config(service_schema(), &request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(reconciler) = &self.reconciler else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics,
            };
        };

        let plan = match ServiceModel::from_state(&request.planned_state) {
            Ok(plan) => plan,
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let new_state = match reconciler.create(&ctx, &plan).await {
            Ok(model) => model.to_state(&mut diagnostics),
            Err(CreateFailure { tracked, error }) => {
                tracing::error!(error = %error, "Service creation failed");
                diagnostics.push(error.to_diagnostic());
                match tracked {
                    Some(model) => model.to_state(&mut diagnostics),
                    None => DynamicValue::null(),
                }
            }
        };

        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(reconciler) = &self.reconciler else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        let mut model = match ServiceModel::from_state(&request.current_state) {
            Ok(model) => model,
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        match reconciler.refresh(&ctx, &mut model).await {
            Ok(()) => ReadResourceResponse {
                new_state: Some(model.to_state(&mut diagnostics)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    service_id = model.id.known().map(String::as_str).unwrap_or_default(),
                    "Service no longer exists, removing it from state"
                );
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(reconciler) = &self.reconciler else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let models = ServiceModel::from_state(&request.prior_state)
            .and_then(|prior| Ok((prior, ServiceModel::from_state(&request.planned_state)?)));
        let (prior, plan) = match models {
            Ok(models) => models,
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = reconciler.update(&ctx, &prior, &plan).await {
            diagnostics.push(e.to_diagnostic());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        // The plan's unknowns are filled from the service as it now is
        let mut model = ServiceModel {
            id: prior.id.clone(),
            ..plan
        };
        match reconciler.refresh(&ctx, &mut model).await {
            Ok(()) => UpdateResourceResponse {
                new_state: model.to_state(&mut diagnostics),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(reconciler) = &self.reconciler else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let result = match ServiceModel::from_state(&request.prior_state) {
            Ok(model) => reconciler.delete(&ctx, &model).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            diagnostics.push(e.to_diagnostic());
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ServiceResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        // Without provider data the provider is not configured yet;
        // operations report it when called
        if let Some(data) = request.provider_data {
            match data.downcast_ref::<SolaceCloudProviderData>() {
                Some(provider_data) => {
                    self.reconciler = Some(ServiceReconciler::new(
                        provider_data.api.clone(),
                        provider_data.settings.clone(),
                    ));
                }
                None => diagnostics.push(Diagnostic::error(
                    "Unexpected Resource Configure Type",
                    "Expected SolaceCloudProviderData in the provider data",
                )),
            }
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithModifyPlan for ServiceResource {
    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let outcome = apply_schema_plan(
            service_schema(),
            &request.config,
            &request.prior_state,
            request.proposed_new_state,
        );

        ModifyPlanResponse {
            planned_state: outcome.planned_state,
            requires_replace: outcome.requires_replace,
            diagnostics: outcome.diagnostics,
        }
    }
}

#[async_trait]
impl ResourceWithImportState for ServiceResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
