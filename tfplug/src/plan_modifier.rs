//! Built-in plan modifiers
//!
//! Plan modifiers run after the framework has applied defaults and marked
//! computed attributes unknown, and may rewrite the planned value.

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};

/// Keeps the prior state value when the planned value is unknown
///
/// Used for computed attributes the remote system never changes after
/// creation, so updates don't show them as "(known after apply)".
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
        // Nothing to reuse on create, and an explicit config value wins
        let keep_state = request.plan_value.is_unknown()
            && !request.state_value.is_null()
            && request.config_value.is_null();

        let plan_value = if keep_state {
            request.state_value
        } else {
            request.plan_value
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, Dynamic, DynamicValue};

    fn request(state: Dynamic, plan: Dynamic, config: Dynamic) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: DynamicValue::new(config),
            state_value: DynamicValue::new(state),
            plan_value: DynamicValue::new(plan),
            path: AttributePath::new("id"),
        }
    }

    #[test]
    fn use_state_for_unknown_restores_prior_value() {
        let response = UseStateForUnknown.modify(request(
            Dynamic::String("1001".to_string()),
            Dynamic::Unknown,
            Dynamic::Null,
        ));

        assert_eq!(
            response.plan_value.value,
            Dynamic::String("1001".to_string())
        );
        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_leaves_create_unknown() {
        let response =
            UseStateForUnknown.modify(request(Dynamic::Null, Dynamic::Unknown, Dynamic::Null));

        assert!(response.plan_value.is_unknown());
    }
}
