//! Call values: argument collections, live call descriptors, completed calls.
//!
//! A [`CallDescriptor`] is created by the proxy backend for each invocation
//! against a fake. The router mutates its outcome slot while routing and then
//! freezes it into a [`CompletedCall`], which has no mutation API at all —
//! the frozen record kept in call history cannot change after the fact.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::CallError;
use crate::ids::FakeId;
use crate::method::MethodRef;

/// JSON representation of a reference to a fake object.
///
/// This is the value the backend passes when a fake appears as an argument,
/// and the value identity methods compare against.
#[must_use]
pub fn fake_ref(id: &FakeId) -> Value {
    serde_json::json!({ "$fake": id.as_str() })
}

// ─────────────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered argument values with parallel argument names.
///
/// Immutable once constructed. Indexable by position or by name; a failed
/// name lookup reports the names that do exist.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentCollection {
    values: Vec<Value>,
    names: Vec<String>,
}

impl ArgumentCollection {
    /// Create a collection from parallel value and name lists.
    pub fn new(values: Vec<Value>, names: Vec<String>) -> Result<Self, CallError> {
        if values.len() != names.len() {
            return Err(CallError::MismatchedNames {
                values: values.len(),
                names: names.len(),
            });
        }
        Ok(Self { values, names })
    }

    /// An empty collection (property getters, parameterless methods).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Build a collection from `(name, value)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Self {
        let (names, values) = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .unzip();
        Self { values, names }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, if present.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The value of the argument named `name`.
    pub fn named(&self, name: &str) -> Result<&Value, CallError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| CallError::UnknownArgument {
                name: name.to_string(),
                available: self.names.join(", "),
            })
    }

    /// The ordered argument values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The ordered argument names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// What routing produced for a call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum CallOutcome {
    /// No behavior has set an outcome yet.
    #[default]
    Unset,
    /// A behavior set a return value.
    Returned {
        /// The configured or computed return value.
        value: Value,
    },
    /// A behavior raised a configured error.
    Raised {
        /// The configured error message.
        message: String,
    },
}

/// The base-implementation capability supplied by the proxy backend.
pub type BaseCall = Arc<dyn Fn(&ArgumentCollection) -> Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Live call
// ─────────────────────────────────────────────────────────────────────────────

/// A live invocation being routed: identity, arguments, and a writable
/// outcome slot.
///
/// Created by the proxy backend per invocation; consumed by
/// [`freeze`](Self::freeze) once routing completes.
pub struct CallDescriptor {
    fake: FakeId,
    concrete_type: String,
    method: MethodRef,
    arguments: ArgumentCollection,
    outcome: CallOutcome,
    base_call: Option<BaseCall>,
}

impl CallDescriptor {
    /// Create a descriptor for a call against `fake`.
    #[must_use]
    pub fn new(
        fake: FakeId,
        concrete_type: impl Into<String>,
        method: MethodRef,
        arguments: ArgumentCollection,
    ) -> Self {
        Self {
            fake,
            concrete_type: concrete_type.into(),
            method,
            arguments,
            outcome: CallOutcome::Unset,
            base_call: None,
        }
    }

    /// Attach the base-implementation capability.
    #[must_use]
    pub fn with_base_call(mut self, base_call: BaseCall) -> Self {
        self.base_call = Some(base_call);
        self
    }

    /// Identity of the fake the call was made against.
    #[must_use]
    pub fn fake(&self) -> &FakeId {
        &self.fake
    }

    /// Concrete type name of the faked object.
    #[must_use]
    pub fn concrete_type(&self) -> &str {
        &self.concrete_type
    }

    /// Identity of the invoked method.
    #[must_use]
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// The call's arguments.
    #[must_use]
    pub fn arguments(&self) -> &ArgumentCollection {
        &self.arguments
    }

    /// The current outcome.
    #[must_use]
    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    /// Set the return value.
    pub fn set_return(&mut self, value: Value) {
        self.outcome = CallOutcome::Returned { value };
    }

    /// Raise a configured error as the call's outcome.
    pub fn raise(&mut self, message: impl Into<String>) {
        self.outcome = CallOutcome::Raised {
            message: message.into(),
        };
    }

    /// Whether the backend supplied a base implementation.
    #[must_use]
    pub fn has_base_call(&self) -> bool {
        self.base_call.is_some()
    }

    /// Invoke the real/base implementation, if the backend supplied one.
    #[must_use]
    pub fn invoke_base(&self) -> Option<Value> {
        self.base_call.as_ref().map(|f| f(&self.arguments))
    }

    /// Freeze the descriptor into an immutable [`CompletedCall`].
    #[must_use]
    pub fn freeze(self, sequence: u64) -> CompletedCall {
        CompletedCall {
            fake: self.fake,
            concrete_type: self.concrete_type,
            method: self.method,
            arguments: self.arguments,
            outcome: self.outcome,
            sequence,
            recorded_at: Utc::now(),
        }
    }
}

impl fmt::Debug for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("fake", &self.fake)
            .field("method", &self.method)
            .field("arguments", &self.arguments)
            .field("outcome", &self.outcome)
            .field("has_base_call", &self.base_call.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Completed call
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable, frozen call retained in call history.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCall {
    /// Identity of the fake the call was made against.
    pub fake: FakeId,
    /// Concrete type name of the faked object.
    pub concrete_type: String,
    /// Identity of the invoked method.
    pub method: MethodRef,
    /// The call's arguments.
    pub arguments: ArgumentCollection,
    /// The routed outcome.
    pub outcome: CallOutcome,
    /// Per-fake sequence number, strictly increasing in program order.
    pub sequence: u64,
    /// When the call finished routing.
    pub recorded_at: DateTime<Utc>,
}

impl CompletedCall {
    /// The returned value, if the outcome was a return.
    #[must_use]
    pub fn returned(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Returned { value } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn descriptor() -> CallDescriptor {
        CallDescriptor::new(
            FakeId::from("fake-1"),
            "Widget",
            MethodRef::new("Widget", "resize", 2),
            ArgumentCollection::from_pairs(vec![("width", json!(4)), ("height", json!(3))]),
        )
    }

    #[test]
    fn test_new_rejects_mismatched_lengths() {
        let result = ArgumentCollection::new(vec![json!(1)], vec![]);
        assert_matches!(
            result,
            Err(CallError::MismatchedNames { values: 1, names: 0 })
        );
    }

    #[test]
    fn test_positional_and_named_lookup() {
        let args = ArgumentCollection::from_pairs(vec![("x", json!(1)), ("y", json!(2))]);
        assert_eq!(args.value_at(0), Some(&json!(1)));
        assert_eq!(args.value_at(2), None);
        assert_eq!(args.named("y").unwrap(), &json!(2));
    }

    #[test]
    fn test_named_lookup_failure_lists_names() {
        let args = ArgumentCollection::from_pairs(vec![("x", json!(1)), ("y", json!(2))]);
        let err = args.named("z").unwrap_err();
        assert_matches!(err, CallError::UnknownArgument { ref available, .. } if available == "x, y");
    }

    #[test]
    fn test_outcome_starts_unset() {
        let call = descriptor();
        assert_eq!(call.outcome(), &CallOutcome::Unset);
    }

    #[test]
    fn test_set_return_and_raise() {
        let mut call = descriptor();
        call.set_return(json!(true));
        assert_eq!(
            call.outcome(),
            &CallOutcome::Returned { value: json!(true) }
        );
        call.raise("boom");
        assert_matches!(call.outcome(), CallOutcome::Raised { message } if message == "boom");
    }

    #[test]
    fn test_invoke_base_without_capability() {
        let call = descriptor();
        assert!(!call.has_base_call());
        assert!(call.invoke_base().is_none());
    }

    #[test]
    fn test_invoke_base_with_capability() {
        let call = descriptor().with_base_call(Arc::new(|args| {
            json!(args.value_at(0).cloned().unwrap_or(Value::Null))
        }));
        assert_eq!(call.invoke_base(), Some(json!(4)));
    }

    #[test]
    fn test_freeze_preserves_identity_and_outcome() {
        let mut call = descriptor();
        call.set_return(json!(7));
        let completed = call.freeze(3);
        assert_eq!(completed.sequence, 3);
        assert_eq!(completed.method, MethodRef::new("Widget", "resize", 2));
        assert_eq!(completed.returned(), Some(&json!(7)));
    }

    #[test]
    fn test_fake_ref_shape() {
        let id = FakeId::from("fake-9");
        assert_eq!(fake_ref(&id), json!({"$fake": "fake-9"}));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn new_accepts_exactly_parallel_lengths(
                values in prop::collection::vec(0i64..100, 0..8),
                names in prop::collection::vec("[a-z]{1,4}", 0..8),
            ) {
                let value_count = values.len();
                let json_values: Vec<Value> = values.into_iter().map(|v| json!(v)).collect();
                let result = ArgumentCollection::new(json_values, names.clone());
                prop_assert_eq!(result.is_ok(), value_count == names.len());
            }
        }
    }
}
