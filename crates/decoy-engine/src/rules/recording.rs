//! Recording rule: counts matching calls for the assertion layer.
//!
//! Applies the type's default value so the intercepted call still completes,
//! while tracking how many calls matched the wrapped specification.

use std::fmt;

use decoy_core::CallDescriptor;

use super::{CallRule, RuleContext, default_value::zero_return};
use crate::call_spec::CallSpecification;
use crate::errors::EngineError;

/// Counts calls matching a specification.
pub struct RecordingRule {
    specification: CallSpecification,
    matched: u64,
}

impl RecordingRule {
    /// Create a recording rule for `specification`.
    #[must_use]
    pub fn new(specification: CallSpecification) -> Self {
        Self {
            specification,
            matched: 0,
        }
    }

    /// How many calls have matched so far.
    #[must_use]
    pub fn match_count(&self) -> u64 {
        self.matched
    }

    /// The wrapped specification.
    #[must_use]
    pub fn specification(&self) -> &CallSpecification {
        &self.specification
    }
}

impl CallRule for RecordingRule {
    fn description(&self) -> String {
        format!("recording {}", self.specification.describe())
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        self.specification.matches(call, ctx.resolver)
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        self.matched += 1;
        call.set_return(zero_return(ctx.types, call.method()));
        Ok(())
    }
}

impl fmt::Debug for RecordingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRule")
            .field("specification", &self.specification)
            .field("matched", &self.matched)
            .finish()
    }
}
