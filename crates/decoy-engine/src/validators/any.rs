//! Catch-all validator: accepts every argument value.

use serde_json::Value;

use super::ArgumentValidator;

/// Matches any argument value, including `null`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyValidator;

impl ArgumentValidator for AnyValidator {
    fn is_valid(&self, _value: &Value) -> bool {
        true
    }

    fn description(&self) -> String {
        "ignored".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_everything() {
        let validator = AnyValidator;
        assert!(validator.is_valid(&json!(1)));
        assert!(validator.is_valid(&json!("x")));
        assert!(validator.is_valid(&Value::Null));
    }

    #[test]
    fn test_describe() {
        assert_eq!(AnyValidator.describe(), "<ignored>");
    }
}
