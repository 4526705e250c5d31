//! Default-value rule: the unconditional tail of the rule chain.
//!
//! Always applicable, so routing can never fail to find a rule: any call no
//! other rule answered returns its return type's zero value.

use decoy_core::{CallDescriptor, MethodRef, TypeRegistry};
use serde_json::Value;

use super::{CallRule, RuleContext};
use crate::errors::EngineError;

/// The zero value for a method's declared return type.
pub(crate) fn zero_return(types: &TypeRegistry, method: &MethodRef) -> Value {
    types
        .return_type(method)
        .map_or(Value::Null, |return_type| types.zero_value(return_type))
}

/// Built-in rule answering any call with the return type's zero value.
#[derive(Debug, Default)]
pub struct DefaultValueRule;

impl CallRule for DefaultValueRule {
    fn description(&self) -> String {
        "return the type's zero value".to_string()
    }

    fn is_applicable(&self, _call: &CallDescriptor, _ctx: &mut RuleContext<'_>) -> bool {
        true
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        call.set_return(zero_return(ctx.types, call.method()));
        Ok(())
    }
}
