//! Auto-fake property rule.
//!
//! When a property getter whose return type is fakeable is read and no
//! configured rule answered it, produce a nested fake via the attached
//! factory and memoize it, so repeated reads return the same value.

use decoy_core::{CallDescriptor, MethodKind};
use serde_json::Value;

use super::{CallRule, PropertyValueRule, RuleContext};
use crate::errors::EngineError;

/// Collaborator that produces nested fake values.
///
/// Implemented by the proxy backend; the engine only asks for a value
/// representing a fresh fake of the named type.
pub trait NestedFakeFactory {
    /// Produce the value standing in for a new fake of `type_name`.
    fn create(&self, type_name: &str) -> Value;
}

/// Built-in rule lazily faking fakeable property types on first read.
#[derive(Debug, Default)]
pub struct AutoFakePropertyRule;

impl CallRule for AutoFakePropertyRule {
    fn description(&self) -> String {
        "auto-fake fakeable property types on first read".to_string()
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        ctx.nested_fakes.is_some()
            && matches!(
                ctx.types.method_kind(call.method()),
                MethodKind::PropertyGet { .. }
            )
            && ctx
                .types
                .return_type(call.method())
                .is_some_and(|return_type| ctx.types.is_fakeable(return_type))
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        let (Some(factory), Some(return_type)) =
            (ctx.nested_fakes, ctx.types.return_type(call.method()))
        else {
            // Applicability guarantees both; complete the call regardless.
            call.set_return(Value::Null);
            return Ok(());
        };
        let value = factory.create(return_type);
        call.set_return(value.clone());
        ctx.actions
            .add_rule_front(Box::new(PropertyValueRule::new(call.method().clone(), value)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{ContextParts, plain_call};
    use decoy_core::{CallOutcome, MethodDescriptor, MethodRef, TypeDescriptor, TypeRegistry};
    use serde_json::json;

    struct StubFactory;

    impl NestedFakeFactory for StubFactory {
        fn create(&self, type_name: &str) -> Value {
            json!({"$fake": format!("nested-{type_name}")})
        }
    }

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register_type(
            TypeDescriptor::new("Widget")
                .with_method(MethodDescriptor::getter("Widget", "child", "IWidget"))
                .with_method(MethodDescriptor::getter("Widget", "label", "string")),
        );
        types.register_fakeable("IWidget");
        types
    }

    #[test]
    fn test_applies_only_to_fakeable_getters_with_factory() {
        let rule = AutoFakePropertyRule;
        let mut parts = ContextParts::new(registry()).with_nested_fakes(Box::new(StubFactory));
        let fakeable = plain_call(MethodRef::new("Widget", "child", 0), vec![]);
        let scalar = plain_call(MethodRef::new("Widget", "label", 0), vec![]);
        assert!(rule.is_applicable(&fakeable, &mut parts.ctx()));
        assert!(!rule.is_applicable(&scalar, &mut parts.ctx()));
    }

    #[test]
    fn test_not_applicable_without_factory() {
        let rule = AutoFakePropertyRule;
        let mut parts = ContextParts::new(registry());
        let fakeable = plain_call(MethodRef::new("Widget", "child", 0), vec![]);
        assert!(!rule.is_applicable(&fakeable, &mut parts.ctx()));
    }

    #[test]
    fn test_returns_factory_value_and_queues_memo_rule() {
        let mut rule = AutoFakePropertyRule;
        let mut parts = ContextParts::new(registry()).with_nested_fakes(Box::new(StubFactory));
        let mut call = plain_call(MethodRef::new("Widget", "child", 0), vec![]);
        rule.apply(&mut call, &mut parts.ctx()).unwrap();
        assert_eq!(
            call.outcome(),
            &CallOutcome::Returned {
                value: json!({"$fake": "nested-IWidget"})
            }
        );
        // One memo rule queued for the front of the user tier.
        assert_eq!(parts.actions().drain().len(), 1);
    }
}
