//! Plan modifiers specific to event broker services

use tfplug::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::model::StateValue;

/// MB of message VPN spool per GB of service spool
pub const SPOOL_MB_PER_GB: i64 = 1000;

fn immutable_change(request: &PlanModifierRequest) -> Diagnostic {
    Diagnostic::error(
        "Immutable Attribute Change",
        format!(
            "You cannot change this attribute after resource creation. State value: {}, Planned value: {}",
            request.state_value.value, request.plan_value.value
        ),
    )
    .with_attribute(request.path.clone())
}

/// Rejects changing an attribute once it has a value in state and keeps
/// the state value in the plan.
pub struct Immutable;

impl Immutable {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for Immutable {
    fn description(&self) -> String {
        "prevents changes to attribute after resource creation".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if request.state_value.is_null()
            || request.plan_value.is_null()
            || request.plan_value.is_unknown()
            || request.plan_value.value == request.state_value.value
        {
            return PlanModifierResponse::unchanged(request);
        }

        let diagnostic = immutable_change(&request);
        tracing::debug!(attribute = %request.path, "Rejecting change to immutable attribute");

        PlanModifierResponse {
            plan_value: request.state_value,
            requires_replace: false,
            diagnostics: vec![diagnostic],
        }
    }
}

/// Rejects any change to an attribute that is only sent at creation. The
/// plan is left as configured.
pub struct WriteOnce;

impl WriteOnce {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for WriteOnce {
    fn description(&self) -> String {
        "prevents changes to attribute after resource creation".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if request.prior_state.is_null()
            || request.plan.is_null()
            || request.plan_value.value == request.state_value.value
        {
            return PlanModifierResponse::unchanged(request);
        }

        let diagnostic = immutable_change(&request);
        PlanModifierResponse {
            diagnostics: vec![diagnostic],
            ..PlanModifierResponse::unchanged(request)
        }
    }
}

/// Plans the message VPN spool size (MB) from a changed service
/// `max_spool_usage` (GB).
pub struct DerivedSpoolUsage {
    source: AttributePath,
}

impl DerivedSpoolUsage {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self {
            source: AttributePath::new("max_spool_usage"),
        })
    }
}

impl PlanModifier for DerivedSpoolUsage {
    fn description(&self) -> String {
        "Updates the message VPN spool usage when max_spool_usage changes".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if request.config_value.is_unknown() || request.prior_state.is_null() {
            return PlanModifierResponse::unchanged(request);
        }

        let prior = request.prior_state.get(&self.source);
        let planned = request.plan.get(&self.source);
        if !planned.is_known() || planned == prior {
            return PlanModifierResponse::unchanged(request);
        }

        let derived = i64::from_dynamic(&planned)
            .ok()
            .and_then(|gb| gb.checked_mul(SPOOL_MB_PER_GB))
            .and_then(|mb| mb.to_dynamic().ok());

        match derived {
            Some(value) => PlanModifierResponse {
                plan_value: DynamicValue::new(value),
                requires_replace: false,
                diagnostics: Vec::new(),
            },
            None => {
                let diagnostic = Diagnostic::error(
                    "Invalid Spool Usage",
                    format!(
                        "Cannot derive the message VPN spool usage from max_spool_usage {}",
                        planned
                    ),
                )
                .with_attribute(request.path.clone());
                PlanModifierResponse {
                    diagnostics: vec![diagnostic],
                    ..PlanModifierResponse::unchanged(request)
                }
            }
        }
    }
}
