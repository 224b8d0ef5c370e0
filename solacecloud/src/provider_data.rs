//! Provider data handed to every resource

use std::sync::Arc;

use crate::api::ServiceApi;
use crate::resources::service::ReconcileSettings;

#[derive(Clone)]
pub struct SolaceCloudProviderData {
    pub api: Arc<dyn ServiceApi>,
    pub settings: ReconcileSettings,
}

impl SolaceCloudProviderData {
    pub fn new(api: impl ServiceApi + 'static, settings: ReconcileSettings) -> Self {
        Self {
            api: Arc::new(api),
            settings,
        }
    }
}
