//! Property-value rule: answers a getter with a stored value.
//!
//! Queued at the front of the user tier by the setter-capture and
//! auto-fake-property rules.

use std::fmt;

use decoy_core::{CallDescriptor, MethodRef};
use serde_json::Value;

use super::{CallRule, RuleContext};
use crate::errors::EngineError;

/// Returns a stored value for calls resolving to one getter.
pub struct PropertyValueRule {
    getter: MethodRef,
    value: Value,
    budget: Option<u64>,
}

impl PropertyValueRule {
    /// Create an unbounded rule answering `getter` with `value`.
    #[must_use]
    pub fn new(getter: MethodRef, value: Value) -> Self {
        Self {
            getter,
            value,
            budget: None,
        }
    }

    /// Limit the rule to a single application.
    #[must_use]
    pub fn single_shot(mut self) -> Self {
        self.budget = Some(1);
        self
    }
}

impl CallRule for PropertyValueRule {
    fn description(&self) -> String {
        format!("{} returns stored value", self.getter)
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        call.arguments().is_empty()
            && ctx
                .resolver
                .resolves_to_same_method(call.concrete_type(), call.method(), &self.getter)
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        call.set_return(self.value.clone());
        Ok(())
    }

    fn budget(&self) -> Option<u64> {
        self.budget
    }
}

impl fmt::Debug for PropertyValueRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValueRule")
            .field("getter", &self.getter)
            .field("value", &self.value)
            .field("budget", &self.budget)
            .finish()
    }
}
