use crate::schema::{
    Attribute, DefaultRequest, ObjectNestingMode, PlanModifier, PlanModifierRequest,
    PlanModifierResponse, Schema,
};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// A plan modifier that uses the prior state value when the planned value is unknown
///
/// This is particularly useful for computed attributes that should retain their value
/// during planning when Terraform doesn't know what the new value will be.
pub struct UseStateForUnknown;

impl UseStateForUnknown {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change.".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        // Nothing to carry forward on create or when the plan is already known
        if request.prior_state.is_null()
            || request.state_value.is_null()
            || !request.plan_value.is_unknown()
        {
            return PlanModifierResponse::unchanged(request);
        }

        // A configured unknown means the user will supply the value later
        if request.config_value.is_unknown() {
            return PlanModifierResponse::unchanged(request);
        }

        PlanModifierResponse {
            plan_value: request.state_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Outcome of running schema defaults and plan modifiers over a proposed plan
pub struct PlanOutcome {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Apply attribute defaults and plan modifiers declared in `schema`.
///
/// Attributes are visited in declaration order and single nested attributes
/// are visited after their parent, so a parent modifier that fills an object
/// from prior state runs before the modifiers of its children. Attributes
/// nested in lists are not visited. A null proposed state means the resource
/// is being destroyed and is returned untouched.
pub fn apply_schema_plan(
    schema: &Schema,
    config: &DynamicValue,
    prior_state: &DynamicValue,
    proposed_new_state: DynamicValue,
) -> PlanOutcome {
    let mut outcome = PlanOutcome {
        planned_state: proposed_new_state,
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };

    if outcome.planned_state.is_null() {
        return outcome;
    }

    plan_attributes(
        &schema.attributes,
        &AttributePath::root(),
        config,
        prior_state,
        &mut outcome,
    );

    outcome
}

fn plan_attributes(
    attributes: &[Attribute],
    parent: &AttributePath,
    config: &DynamicValue,
    prior_state: &DynamicValue,
    outcome: &mut PlanOutcome,
) {
    for attr in attributes {
        let path = parent.clone().attribute(&attr.name);

        if let Some(default) = &attr.default {
            let planned = outcome.planned_state.get(&path);
            if config.get(&path).is_null() && !planned.is_known() {
                let value = default
                    .default_value(DefaultRequest { path: path.clone() })
                    .value
                    .value;
                set_planned(outcome, &path, value);
            }
        }

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: DynamicValue::new(config.get(&path)),
                state_value: DynamicValue::new(prior_state.get(&path)),
                plan_value: DynamicValue::new(outcome.planned_state.get(&path)),
                path: path.clone(),
                prior_state: prior_state.clone(),
                plan: outcome.planned_state.clone(),
            });

            if response.requires_replace {
                outcome.requires_replace.push(path.clone());
            }
            outcome.diagnostics.extend(response.diagnostics);
            set_planned(outcome, &path, response.plan_value.value);
        }

        if let Some(nested) = &attr.nested_type {
            if nested.nesting == ObjectNestingMode::Single
                && matches!(outcome.planned_state.get(&path), Dynamic::Map(_))
            {
                plan_attributes(&nested.attributes, &path, config, prior_state, outcome);
            }
        }
    }
}

fn set_planned(outcome: &mut PlanOutcome, path: &AttributePath, value: Dynamic) {
    if outcome.planned_state.get(path) == value {
        return;
    }
    if let Err(e) = outcome.planned_state.set_value(path, value) {
        outcome.diagnostics.push(
            Diagnostic::error("Failed to update planned value", e.to_string())
                .with_attribute(path.clone()),
        );
    }
}
