//! Equality validator: the fallback for literal argument expressions.

use serde_json::Value;

use super::ArgumentValidator;

/// Matches arguments equal to a configured value. `null` equals `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct EqualityValidator {
    expected: Value,
}

impl EqualityValidator {
    /// Create a validator expecting `expected`.
    #[must_use]
    pub fn new(expected: Value) -> Self {
        Self { expected }
    }
}

impl ArgumentValidator for EqualityValidator {
    fn is_valid(&self, value: &Value) -> bool {
        value == &self.expected
    }

    fn description(&self) -> String {
        self.expected.to_string()
    }
}
