//! Call rules.
//!
//! A rule pairs an applicability predicate with a side-effecting behavior
//! and an optional invocation budget. User-configured rules
//! ([`SpecificationRule`], [`AnyCallRule`], [`RecordingRule`]) sit between
//! two fixed tiers of built-ins: the event-subscription bookkeeping rule
//! runs before them, and the object-member, auto-fake-property,
//! property-setter, and default-value rules run after.

mod any_call;
mod auto_property;
mod default_value;
mod events;
mod object_member;
mod property_setter;
mod property_value;
mod recording;
mod specification;

use decoy_core::{CallDescriptor, RuleId, TypeRegistry};

pub use any_call::AnyCallRule;
pub use auto_property::{AutoFakePropertyRule, NestedFakeFactory};
pub use default_value::DefaultValueRule;
pub use events::{EventListeners, EventSubscriptionRule};
pub use object_member::ObjectMemberRule;
pub use property_setter::PropertySetterRule;
pub use property_value::PropertyValueRule;
pub use recording::RecordingRule;
pub use specification::{Behavior, SpecificationRule};

use crate::errors::EngineError;
use crate::resolver::MethodIdentityResolver;

/// Collaborators a rule can reach while deciding applicability or applying
/// itself. Threaded explicitly by the router; there is no ambient state.
pub struct RuleContext<'a> {
    /// The type registry (kinds, return types, zero values, fakeability).
    pub types: &'a TypeRegistry,
    /// Identity resolution with its memo cache.
    pub resolver: &'a mut MethodIdentityResolver,
    /// Collector for rules to insert at the front of the user tier after
    /// routing completes.
    pub actions: &'a mut RuleActions,
    /// Per-fake event listener bookkeeping.
    pub listeners: &'a mut EventListeners,
    /// Collaborator that produces nested fake values, when attached.
    pub nested_fakes: Option<&'a dyn NestedFakeFactory>,
}

/// A unit of configured or built-in behavior.
pub trait CallRule {
    /// Human-readable description for diagnostics.
    fn description(&self) -> String;

    /// Whether this rule applies to `call`.
    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool;

    /// Apply the rule's behavior to `call`.
    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError>;

    /// Invocation budget: `Some(n)` for finite, `None` for unbounded.
    fn budget(&self) -> Option<u64> {
        None
    }
}

/// Deferred rule insertions queued during [`CallRule::apply`].
///
/// Rules cannot mutate the registry that is iterating them; they queue
/// follow-ups here and the router drains the queue after selection.
#[derive(Default)]
pub struct RuleActions {
    front_rules: Vec<Box<dyn CallRule>>,
}

impl RuleActions {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a rule for insertion at the front of the user tier.
    pub fn add_rule_front(&mut self, rule: Box<dyn CallRule>) {
        self.front_rules.push(rule);
    }

    /// Take the queued rules, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Box<dyn CallRule>> {
        std::mem::take(&mut self.front_rules)
    }

    /// Whether anything is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front_rules.is_empty()
    }
}

/// A registered rule with its identity and invocation counter.
pub struct RuleMetadata {
    id: RuleId,
    rule: Box<dyn CallRule>,
    calls: u64,
}

impl RuleMetadata {
    /// Wrap a rule with a fresh counter.
    #[must_use]
    pub fn new(id: RuleId, rule: Box<dyn CallRule>) -> Self {
        Self { id, rule, calls: 0 }
    }

    /// The rule's identity.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// How many times the rule has been applied.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Whether the rule has remaining budget.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.rule.budget().is_none_or(|budget| self.calls < budget)
    }

    /// Count one application. The counter never passes a finite budget
    /// because exhausted rules are no longer selected.
    pub fn record_call(&mut self) {
        self.calls += 1;
    }

    /// The wrapped rule.
    #[must_use]
    pub fn rule(&self) -> &dyn CallRule {
        self.rule.as_ref()
    }

    /// The wrapped rule, mutably.
    pub fn rule_mut(&mut self) -> &mut dyn CallRule {
        self.rule.as_mut()
    }
}

impl std::fmt::Debug for RuleMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleMetadata")
            .field("id", &self.id)
            .field("description", &self.rule.description())
            .field("calls", &self.calls)
            .field("budget", &self.rule.budget())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use decoy_core::TypeRegistry;

    use super::{EventListeners, NestedFakeFactory, RuleActions, RuleContext};
    use crate::resolver::MethodIdentityResolver;

    /// Owns everything a [`RuleContext`] borrows, so rule tests can build
    /// contexts without a router.
    pub(crate) struct ContextParts {
        types: Arc<TypeRegistry>,
        resolver: MethodIdentityResolver,
        actions: RuleActions,
        listeners: EventListeners,
        nested_fakes: Option<Box<dyn NestedFakeFactory>>,
    }

    impl ContextParts {
        pub(crate) fn new(types: TypeRegistry) -> Self {
            let types = Arc::new(types);
            Self {
                resolver: MethodIdentityResolver::new(Arc::clone(&types)),
                types,
                actions: RuleActions::new(),
                listeners: EventListeners::new(),
                nested_fakes: None,
            }
        }

        pub(crate) fn with_nested_fakes(mut self, factory: Box<dyn NestedFakeFactory>) -> Self {
            self.nested_fakes = Some(factory);
            self
        }

        pub(crate) fn ctx(&mut self) -> RuleContext<'_> {
            RuleContext {
                types: &self.types,
                resolver: &mut self.resolver,
                actions: &mut self.actions,
                listeners: &mut self.listeners,
                nested_fakes: self.nested_fakes.as_deref(),
            }
        }

        pub(crate) fn actions(&mut self) -> &mut RuleActions {
            &mut self.actions
        }

        pub(crate) fn listeners(&self) -> &EventListeners {
            &self.listeners
        }
    }

    /// A plain call against a faked `Widget`.
    pub(crate) fn plain_call(
        method: decoy_core::MethodRef,
        args: Vec<(&str, serde_json::Value)>,
    ) -> decoy_core::CallDescriptor {
        decoy_core::CallDescriptor::new(
            decoy_core::FakeId::from("fake-1"),
            "Widget",
            method,
            decoy_core::ArgumentCollection::from_pairs(args),
        )
    }
}
