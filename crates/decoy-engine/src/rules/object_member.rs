//! Object-member rule: identity-method fallbacks.
//!
//! Gives faked objects sane `equals`, `hash_code`, and `to_string`
//! behavior without any configuration: reference equality against the
//! fake's own identity, a stable hash of that identity, and a
//! "faked {type}" rendering.

use std::hash::{DefaultHasher, Hash, Hasher};

use decoy_core::{CallDescriptor, fake_ref};
use serde_json::Value;

use super::{CallRule, RuleContext};
use crate::errors::EngineError;

/// Built-in fallback for the identity methods every object carries.
#[derive(Debug, Default)]
pub struct ObjectMemberRule;

impl ObjectMemberRule {
    fn is_identity_method(call: &CallDescriptor) -> bool {
        let method = call.method();
        matches!(
            (method.name.as_str(), method.arity),
            ("equals", 1) | ("hash_code", 0) | ("to_string", 0)
        )
    }
}

impl CallRule for ObjectMemberRule {
    fn description(&self) -> String {
        "identity method fallbacks (equals, hash_code, to_string)".to_string()
    }

    fn is_applicable(&self, call: &CallDescriptor, _ctx: &mut RuleContext<'_>) -> bool {
        Self::is_identity_method(call)
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        let value = match (call.method().name.as_str(), call.method().arity) {
            ("equals", 1) => {
                let own = fake_ref(call.fake());
                Value::Bool(call.arguments().value_at(0) == Some(&own))
            }
            ("hash_code", 0) => {
                let mut hasher = DefaultHasher::new();
                call.fake().as_str().hash(&mut hasher);
                Value::from(hasher.finish())
            }
            ("to_string", 0) => Value::from(format!("faked {}", call.concrete_type())),
            _ => Value::Null,
        };
        call.set_return(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{ContextParts, plain_call};
    use decoy_core::{CallOutcome, FakeId, MethodRef, TypeRegistry};
    use serde_json::json;

    #[test]
    fn test_applies_only_to_identity_methods() {
        let rule = ObjectMemberRule;
        let mut parts = ContextParts::new(TypeRegistry::new());
        let equals = plain_call(MethodRef::new("Widget", "equals", 1), vec![("other", json!(1))]);
        let resize = plain_call(MethodRef::new("Widget", "resize", 2), vec![]);
        // Wrong arity does not count as an identity method.
        let equals_no_args = plain_call(MethodRef::new("Widget", "equals", 0), vec![]);
        assert!(rule.is_applicable(&equals, &mut parts.ctx()));
        assert!(!rule.is_applicable(&resize, &mut parts.ctx()));
        assert!(!rule.is_applicable(&equals_no_args, &mut parts.ctx()));
    }

    #[test]
    fn test_equals_compares_fake_identity() {
        let mut rule = ObjectMemberRule;
        let mut parts = ContextParts::new(TypeRegistry::new());
        let own_ref = fake_ref(&FakeId::from("fake-1"));

        let mut same = plain_call(MethodRef::new("Widget", "equals", 1), vec![("other", own_ref)]);
        rule.apply(&mut same, &mut parts.ctx()).unwrap();
        assert_eq!(same.outcome(), &CallOutcome::Returned { value: json!(true) });

        let mut other = plain_call(
            MethodRef::new("Widget", "equals", 1),
            vec![("other", fake_ref(&FakeId::from("fake-2")))],
        );
        rule.apply(&mut other, &mut parts.ctx()).unwrap();
        assert_eq!(other.outcome(), &CallOutcome::Returned { value: json!(false) });
    }

    #[test]
    fn test_hash_code_is_stable_per_fake() {
        let mut rule = ObjectMemberRule;
        let mut parts = ContextParts::new(TypeRegistry::new());
        let mut first = plain_call(MethodRef::new("Widget", "hash_code", 0), vec![]);
        let mut second = plain_call(MethodRef::new("Widget", "hash_code", 0), vec![]);
        rule.apply(&mut first, &mut parts.ctx()).unwrap();
        rule.apply(&mut second, &mut parts.ctx()).unwrap();
        assert_eq!(first.outcome(), second.outcome());
    }

    #[test]
    fn test_to_string_names_concrete_type() {
        let mut rule = ObjectMemberRule;
        let mut parts = ContextParts::new(TypeRegistry::new());
        let mut call = plain_call(MethodRef::new("Widget", "to_string", 0), vec![]);
        rule.apply(&mut call, &mut parts.ctx()).unwrap();
        assert_eq!(
            call.outcome(),
            &CallOutcome::Returned {
                value: json!("faked Widget")
            }
        );
    }
}
