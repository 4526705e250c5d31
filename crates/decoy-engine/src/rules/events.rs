//! Event-subscription bookkeeping.
//!
//! Runs before the user-configured chain and applies only to add/remove
//! listener calls, keeping per-event listener lists on the router.

use std::collections::HashMap;

use decoy_core::{CallDescriptor, MethodKind};
use serde_json::Value;

use super::{CallRule, RuleContext};
use crate::errors::EngineError;

/// Per-fake event listener lists, keyed by event name.
#[derive(Debug, Default)]
pub struct EventListeners {
    by_event: HashMap<String, Vec<Value>>,
}

impl EventListeners {
    /// Create an empty listener table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `event`.
    pub fn subscribe(&mut self, event: &str, handler: Value) {
        self.by_event.entry(event.to_string()).or_default().push(handler);
    }

    /// Remove the first listener equal to `handler`. Returns whether one
    /// was removed.
    pub fn unsubscribe(&mut self, event: &str, handler: &Value) -> bool {
        let Some(handlers) = self.by_event.get_mut(event) else {
            return false;
        };
        let Some(index) = handlers.iter().position(|h| h == handler) else {
            return false;
        };
        let _ = handlers.remove(index);
        true
    }

    /// The listeners currently subscribed to `event`.
    #[must_use]
    pub fn listeners(&self, event: &str) -> &[Value] {
        self.by_event.get(event).map_or(&[], Vec::as_slice)
    }
}

/// Built-in rule handling add/remove-listener calls.
#[derive(Debug, Default)]
pub struct EventSubscriptionRule;

impl CallRule for EventSubscriptionRule {
    fn description(&self) -> String {
        "event subscription bookkeeping".to_string()
    }

    fn is_applicable(&self, call: &CallDescriptor, ctx: &mut RuleContext<'_>) -> bool {
        matches!(
            ctx.types.method_kind(call.method()),
            MethodKind::EventSubscribe { .. } | MethodKind::EventUnsubscribe { .. }
        )
    }

    fn apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        match ctx.types.method_kind(call.method()) {
            MethodKind::EventSubscribe { event } => {
                if let Some(handler) = call.arguments().value_at(0) {
                    ctx.listeners.subscribe(&event, handler.clone());
                }
            }
            MethodKind::EventUnsubscribe { event } => {
                if let Some(handler) = call.arguments().value_at(0) {
                    let _ = ctx.listeners.unsubscribe(&event, handler);
                }
            }
            _ => {}
        }
        call.set_return(Value::Null);
        Ok(())
    }
}
