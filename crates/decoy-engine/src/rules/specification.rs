//! Specification rule: the standard user-configured rule.
//!
//! Matches calls against a built [`CallSpecification`] and applies a
//! configured [`Behavior`], optionally limited by an invocation budget.

use std::fmt;
use std::sync::Arc;

use decoy_core::{ArgumentCollection, CallDescriptor};
use serde_json::Value;

use super::{CallRule, RuleContext};
use crate::call_spec::CallSpecification;
use crate::errors::EngineError;

/// What a rule does to a matching call.
#[derive(Clone)]
pub enum Behavior {
    /// Set a fixed return value.
    Return(Value),
    /// Compute the return value from the call's arguments.
    Compute(Arc<dyn Fn(&ArgumentCollection) -> Value>),
    /// Raise a configured error as the call's outcome.
    Raise(String),
    /// Delegate to the real/base implementation.
    CallBase,
}

impl Behavior {
    /// Execute the behavior against `call`.
    pub(crate) fn execute(&self, call: &mut CallDescriptor) -> Result<(), EngineError> {
        match self {
            Self::Return(value) => call.set_return(value.clone()),
            Self::Compute(compute) => {
                let value = compute(call.arguments());
                call.set_return(value);
            }
            Self::Raise(message) => call.raise(message.clone()),
            Self::CallBase => match call.invoke_base() {
                Some(value) => call.set_return(value),
                None => {
                    return Err(EngineError::MissingBaseImplementation {
                        method: call.method().to_string(),
                    });
                }
            },
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match self {
            Self::Return(value) => format!("returns {value}"),
            Self::Compute(_) => "returns computed value".to_string(),
            Self::Raise(message) => format!("raises {message:?}"),
            Self::CallBase => "calls base implementation".to_string(),
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A user-configured rule built from a call specification.
pub struct SpecificationRule {
    specification: CallSpecification,
    behavior: Behavior,
    callbacks: Vec<Arc<dyn Fn(&ArgumentCollection)>>,
    budget: Option<u64>,
}

impl SpecificationRule {
    /// Create a rule applying `behavior` to calls matching `specification`.
    #[must_use]
    pub fn new(specification: CallSpecification, behavior: Behavior) -> Self {
        Self {
            specification,
            behavior,
            callbacks: Vec::new(),
            budget: None,
        }
    }

    /// Limit the rule to `budget` applications.
    #[must_use]
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Add a callback invoked with the call's arguments before the behavior
    /// runs.
    #[must_use]
    pub fn with_callback(mut self, callback: impl Fn(&ArgumentCollection) + 'static) -> Self {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// The wrapped specification.
    #[must_use]
    pub fn specification(&self) -> &CallSpecification {
        &self.specification
    }
}

impl CallRule for SpecificationRule {
    fn description(&self) -> String {
        format!(
            "{} -> {}",
            self.specification.describe(),
            self.behavior.describe()
        )
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        self.specification.matches(call, ctx.resolver)
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        _ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        for callback in &self.callbacks {
            callback(call.arguments());
        }
        self.behavior.execute(call)
    }

    fn budget(&self) -> Option<u64> {
        self.budget
    }
}

impl fmt::Debug for SpecificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationRule")
            .field("specification", &self.specification)
            .field("behavior", &self.behavior)
            .field("budget", &self.budget)
            .finish()
    }
}
