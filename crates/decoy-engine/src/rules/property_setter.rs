//! Property-setter capture.
//!
//! Turns a setter call into a queued single-shot getter rule returning the
//! written value, so a set-then-get round trip observes the write once.

use decoy_core::{CallDescriptor, MethodKind, MethodRef};
use serde_json::Value;

use super::{CallRule, PropertyValueRule, RuleContext};
use crate::errors::EngineError;

/// Built-in rule capturing property writes.
#[derive(Debug, Default)]
pub struct PropertySetterRule;

impl CallRule for PropertySetterRule {
    fn description(&self) -> String {
        "capture property writes as single-shot getter rules".to_string()
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        matches!(
            ctx.types.method_kind(call.method()),
            MethodKind::PropertySet { .. }
        )
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        if let MethodKind::PropertySet { property } = ctx.types.method_kind(call.method()) {
            let written = call
                .arguments()
                .value_at(0)
                .cloned()
                .unwrap_or(Value::Null);
            let getter = MethodRef::new(call.method().declaring_type.clone(), property, 0);
            ctx.actions
                .add_rule_front(Box::new(PropertyValueRule::new(getter, written).single_shot()));
        }
        call.set_return(Value::Null);
        Ok(())
    }
}
