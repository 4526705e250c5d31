//! The per-fake router.
//!
//! Composition point for one faked object: receives a live call from the
//! proxy backend, selects and applies a rule, drains any rules the applied
//! rule queued, freezes the call, and records it through the scope stack.

use std::fmt;

use decoy_core::{CallDescriptor, CompletedCall, FakeId, RuleId, TypeRegistry};
use tracing::debug;

use crate::errors::EngineError;
use crate::registry::RuleRegistry;
use crate::resolver::MethodIdentityResolver;
use crate::rules::{
    CallRule, EventListeners, NestedFakeFactory, RuleActions, RuleContext, RuleMetadata,
};
use crate::scope::ScopeStack;
use crate::settings::ReorderPolicy;

/// Routes calls for one fake object.
pub struct FakeRouter {
    fake: FakeId,
    concrete_type: String,
    registry: RuleRegistry,
    listeners: EventListeners,
    nested_fakes: Option<Box<dyn NestedFakeFactory>>,
    sequence: u64,
}

impl FakeRouter {
    /// Create a router for a fake of `concrete_type`.
    #[must_use]
    pub fn new(fake: FakeId, concrete_type: impl Into<String>, policy: ReorderPolicy) -> Self {
        Self {
            fake,
            concrete_type: concrete_type.into(),
            registry: RuleRegistry::new(policy),
            listeners: EventListeners::new(),
            nested_fakes: None,
            sequence: 0,
        }
    }

    /// Attach the nested-fake factory used by the auto-fake property rule.
    pub fn set_nested_fakes(&mut self, factory: Box<dyn NestedFakeFactory>) {
        self.nested_fakes = Some(factory);
    }

    /// The fake this router serves.
    #[must_use]
    pub fn fake(&self) -> &FakeId {
        &self.fake
    }

    /// Concrete type name of the faked object.
    #[must_use]
    pub fn concrete_type(&self) -> &str {
        &self.concrete_type
    }

    /// The user rule chain, in selection order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.registry.user_rules()
    }

    /// Event listeners captured by the subscription bookkeeping rule.
    #[must_use]
    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    /// Register a user rule at the front of the chain, noting it with every
    /// open scope.
    pub fn add_rule(&mut self, rule: Box<dyn CallRule>, scopes: &mut ScopeStack) -> RuleId {
        let id = RuleId::new();
        scopes.note_rule(&self.fake, &id);
        self.registry
            .add_user_rule_front(RuleMetadata::new(id.clone(), rule));
        id
    }

    /// Remove the user rules with the given IDs.
    pub fn remove_rules(&mut self, ids: &[RuleId]) {
        self.registry.remove_user_rules(ids);
    }

    /// Route one live call: select and apply a rule, drain queued rules into
    /// the front of the user tier, freeze, and record.
    pub fn intercept(
        &mut self,
        mut call: CallDescriptor,
        scopes: &mut ScopeStack,
        resolver: &mut MethodIdentityResolver,
        types: &TypeRegistry,
    ) -> Result<CompletedCall, EngineError> {
        let mut actions = RuleActions::new();
        {
            let mut ctx = RuleContext {
                types,
                resolver,
                actions: &mut actions,
                listeners: &mut self.listeners,
                nested_fakes: self.nested_fakes.as_deref(),
            };
            self.registry.select_and_apply(&mut call, &mut ctx)?;
        }

        for rule in actions.drain() {
            let id = RuleId::new();
            debug!(fake = %self.fake, rule = %rule.description(), "Installing queued rule");
            scopes.note_rule(&self.fake, &id);
            self.registry
                .add_user_rule_front(RuleMetadata::new(id, rule));
        }

        self.sequence += 1;
        let completed = call.freeze(self.sequence);
        scopes.record(&self.fake, &completed);
        Ok(completed)
    }
}

impl fmt::Debug for FakeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeRouter")
            .field("fake", &self.fake)
            .field("concrete_type", &self.concrete_type)
            .field("registry", &self.registry)
            .field("sequence", &self.sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AnyCallRule, Behavior};
    use decoy_core::{ArgumentCollection, CallOutcome, MethodRef};
    use serde_json::json;
    use std::sync::Arc;

    fn call(router: &FakeRouter, method: MethodRef) -> CallDescriptor {
        CallDescriptor::new(
            router.fake().clone(),
            router.concrete_type(),
            method,
            ArgumentCollection::empty(),
        )
    }

    fn setup() -> (FakeRouter, ScopeStack, MethodIdentityResolver, Arc<TypeRegistry>) {
        let types = Arc::new(TypeRegistry::new());
        (
            FakeRouter::new(FakeId::from("fake-1"), "Widget", ReorderPolicy::KeepOrder),
            ScopeStack::new(None),
            MethodIdentityResolver::new(Arc::clone(&types)),
            types,
        )
    }

    #[test]
    fn test_intercept_records_in_program_order() {
        let (mut router, mut scopes, mut resolver, types) = setup();
        for _ in 0..3 {
            let descriptor = call(&router, MethodRef::new("Widget", "poke", 0));
            let _ = router
                .intercept(descriptor, &mut scopes, &mut resolver, &types)
                .unwrap();
        }
        let sequences: Vec<u64> = scopes
            .root()
            .calls_for(&FakeId::from("fake-1"))
            .iter()
            .map(|c| c.sequence)
            .collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_intercept_applies_first_matching_user_rule() {
        let (mut router, mut scopes, mut resolver, types) = setup();
        let _ = router.add_rule(
            Box::new(AnyCallRule::new(Behavior::Return(json!("configured")))),
            &mut scopes,
        );
        let descriptor = call(&router, MethodRef::new("Widget", "poke", 0));
        let completed = router
            .intercept(descriptor, &mut scopes, &mut resolver, &types)
            .unwrap();
        assert_eq!(completed.returned(), Some(&json!("configured")));
    }

    #[test]
    fn test_unconfigured_call_falls_through_to_default() {
        let (mut router, mut scopes, mut resolver, types) = setup();
        let descriptor = call(&router, MethodRef::new("Widget", "poke", 0));
        let completed = router
            .intercept(descriptor, &mut scopes, &mut resolver, &types)
            .unwrap();
        assert_matches::assert_matches!(
            completed.outcome,
            CallOutcome::Returned { value: serde_json::Value::Null }
        );
    }

    #[test]
    fn test_add_rule_is_visible_in_rules_iterator() {
        let (mut router, mut scopes, _, _) = setup();
        let id = router.add_rule(
            Box::new(AnyCallRule::new(Behavior::Return(json!(1)))),
            &mut scopes,
        );
        let listed: Vec<&RuleId> = router.rules().map(RuleMetadata::id).collect();
        assert_eq!(listed, vec![&id]);
    }

    #[test]
    fn test_remove_rules() {
        let (mut router, mut scopes, _, _) = setup();
        let id = router.add_rule(
            Box::new(AnyCallRule::new(Behavior::Return(json!(1)))),
            &mut scopes,
        );
        router.remove_rules(&[id]);
        assert_eq!(router.rules().count(), 0);
    }
}
