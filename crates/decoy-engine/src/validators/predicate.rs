//! Predicate validator: wraps a caller-supplied predicate function.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::ArgumentValidator;

/// A shared argument predicate.
pub type Predicate = Arc<dyn Fn(&Value) -> bool>;

/// Matches arguments accepted by a caller-supplied predicate.
#[derive(Clone)]
pub struct PredicateValidator {
    description: String,
    predicate: Predicate,
}

impl PredicateValidator {
    /// Create a validator from a description and predicate.
    #[must_use]
    pub fn new(description: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            description: description.into(),
            predicate,
        }
    }
}

impl ArgumentValidator for PredicateValidator {
    fn is_valid(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

impl fmt::Debug for PredicateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("description", &self.description)
            .finish()
    }
}
