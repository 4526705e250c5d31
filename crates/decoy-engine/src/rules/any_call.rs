//! Any-call rule: applies a behavior to every call against the fake.

use std::fmt;

use decoy_core::CallDescriptor;

use super::{Behavior, CallRule, RuleContext};
use crate::errors::EngineError;

/// Matches every call, applying one configured behavior.
///
/// Used for "whatever is called, do this" configuration.
pub struct AnyCallRule {
    behavior: Behavior,
    budget: Option<u64>,
}

impl AnyCallRule {
    /// Create a rule applying `behavior` to every call.
    #[must_use]
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            budget: None,
        }
    }

    /// Limit the rule to `budget` applications.
    #[must_use]
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }
}

impl CallRule for AnyCallRule {
    fn description(&self) -> String {
        format!("any call -> {:?}", self.behavior)
    }

    fn is_applicable(&self, _call: &CallDescriptor, _ctx: &mut RuleContext<'_>) -> bool {
        true
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        self.behavior.execute(call)
    }

    fn budget(&self) -> Option<u64> {
        self.budget
    }
}

impl fmt::Debug for AnyCallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCallRule")
            .field("behavior", &self.behavior)
            .field("budget", &self.budget)
            .finish()
    }
}
