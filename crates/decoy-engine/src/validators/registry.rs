//! Validator bindings.
//!
//! The original engine discovered validators through metadata attached to
//! helper methods at runtime. Here the association is an explicit registry:
//! each helper identifier maps to a [`ValidatorBinding`] declaring the
//! helper's generic arity, its constructor signature, and the constructor
//! itself. Binding metadata is user-supplied data, so a binding may also
//! name a target that does not implement the validator capability — that is
//! detected when the binding is used, not when it is registered.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{AnyValidator, ArgumentValidator, EqualityValidator, Predicate, PredicateValidator};
use crate::errors::ValidatorBindingError;

// ─────────────────────────────────────────────────────────────────────────────
// Helper arguments
// ─────────────────────────────────────────────────────────────────────────────

/// One argument of a helper call, as evaluated by the front-end.
#[derive(Clone)]
pub enum HelperArg {
    /// The extension-point placeholder a fluent front-end threads through
    /// helper calls. Skipped when it appears in leading position.
    Placeholder,
    /// An evaluated concrete value.
    Value(Value),
    /// An evaluated predicate function plus its description.
    Predicate {
        /// Description used for diagnostics.
        description: String,
        /// The predicate itself.
        predicate: Predicate,
    },
}

impl HelperArg {
    /// Build a predicate argument.
    #[must_use]
    pub fn predicate(description: impl Into<String>, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::Predicate {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// The structural kind of this argument; `None` for the placeholder.
    #[must_use]
    pub fn kind(&self) -> Option<ArgKind> {
        match self {
            Self::Placeholder => None,
            Self::Value(_) => Some(ArgKind::Value),
            Self::Predicate { .. } => Some(ArgKind::Predicate),
        }
    }
}

impl fmt::Debug for HelperArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => f.write_str("Placeholder"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Predicate { description, .. } => {
                f.debug_struct("Predicate").field("description", description).finish()
            }
        }
    }
}

/// Structural kind of a helper-call argument, used to match constructor
/// signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// A concrete value.
    Value,
    /// A predicate function.
    Predicate,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => f.write_str("value"),
            Self::Predicate => f.write_str("predicate"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bindings
// ─────────────────────────────────────────────────────────────────────────────

type Constructor =
    Arc<dyn Fn(&str, Vec<HelperArg>) -> Result<Box<dyn ArgumentValidator>, ValidatorBindingError>>;

enum BindingTarget {
    Constructor(Constructor),
    NonValidator { type_name: String },
}

/// Declarative association between a helper identifier and a validator
/// constructor.
pub struct ValidatorBinding {
    generic_arity: usize,
    signature: Vec<ArgKind>,
    target: BindingTarget,
}

impl ValidatorBinding {
    /// A binding that constructs a validator.
    #[must_use]
    pub fn validator(
        generic_arity: usize,
        signature: Vec<ArgKind>,
        construct: impl Fn(&str, Vec<HelperArg>) -> Result<Box<dyn ArgumentValidator>, ValidatorBindingError>
        + 'static,
    ) -> Self {
        Self {
            generic_arity,
            signature,
            target: BindingTarget::Constructor(Arc::new(construct)),
        }
    }

    /// A binding whose declared target does not implement the validator
    /// capability. Using it is a [`ValidatorBindingError::NotAValidator`].
    #[must_use]
    pub fn non_validator(type_name: impl Into<String>) -> Self {
        Self {
            generic_arity: 0,
            signature: Vec::new(),
            target: BindingTarget::NonValidator {
                type_name: type_name.into(),
            },
        }
    }

    /// Number of type arguments the validator expects.
    #[must_use]
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    /// The constructor signature, as structural argument kinds.
    #[must_use]
    pub fn signature(&self) -> &[ArgKind] {
        &self.signature
    }

    /// Render the expected constructor signature for diagnostics.
    #[must_use]
    pub fn signature_text(&self, helper: &str) -> String {
        let kinds: Vec<String> = self.signature.iter().map(ToString::to_string).collect();
        format!("{helper}({})", kinds.join(", "))
    }

    /// The non-validator target type name, if this binding has one.
    #[must_use]
    pub fn non_validator_target(&self) -> Option<&str> {
        match &self.target {
            BindingTarget::NonValidator { type_name } => Some(type_name),
            BindingTarget::Constructor(_) => None,
        }
    }

    /// Run the constructor.
    pub(crate) fn construct(
        &self,
        helper: &str,
        args: Vec<HelperArg>,
    ) -> Result<Box<dyn ArgumentValidator>, ValidatorBindingError> {
        match &self.target {
            BindingTarget::Constructor(construct) => construct(helper, args),
            BindingTarget::NonValidator { type_name } => {
                Err(ValidatorBindingError::NotAValidator {
                    helper: helper.to_string(),
                    type_name: type_name.clone(),
                })
            }
        }
    }
}

impl fmt::Debug for ValidatorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBinding")
            .field("generic_arity", &self.generic_arity)
            .field("signature", &self.signature)
            .field("is_validator", &self.non_validator_target().is_none())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of helper-identifier → validator bindings.
#[derive(Default)]
pub struct ValidatorRegistry {
    bindings: HashMap<String, ValidatorBinding>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in helper bindings: `ignored`,
    /// `is_null`, `matches`, and `that`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "ignored",
            ValidatorBinding::validator(1, vec![], |_, _| Ok(Box::new(AnyValidator))),
        );
        registry.register(
            "is_null",
            ValidatorBinding::validator(0, vec![], |_, _| {
                Ok(Box::new(EqualityValidator::new(Value::Null)))
            }),
        );
        registry.register(
            "matches",
            ValidatorBinding::validator(1, vec![ArgKind::Predicate], |helper, mut args| {
                match args.pop() {
                    Some(HelperArg::Predicate {
                        description,
                        predicate,
                    }) => Ok(Box::new(PredicateValidator::new(description, predicate))),
                    _ => Err(ValidatorBindingError::SignatureMismatch {
                        helper: helper.to_string(),
                        expected: format!("{helper}(predicate)"),
                    }),
                }
            }),
        );
        registry.register(
            "that",
            ValidatorBinding::validator(1, vec![ArgKind::Predicate], |helper, mut args| {
                match args.pop() {
                    Some(HelperArg::Predicate {
                        description,
                        predicate,
                    }) => Ok(Box::new(PredicateValidator::new(
                        format!("that {description}"),
                        predicate,
                    ))),
                    _ => Err(ValidatorBindingError::SignatureMismatch {
                        helper: helper.to_string(),
                        expected: format!("{helper}(predicate)"),
                    }),
                }
            }),
        );
        registry
    }

    /// Register a binding. An existing binding for the same identifier is
    /// replaced.
    pub fn register(&mut self, helper: impl Into<String>, binding: ValidatorBinding) {
        let helper = helper.into();
        debug!(helper = %helper, "Registered validator binding");
        let _ = self.bindings.insert(helper, binding);
    }

    /// Look up the binding for a helper identifier.
    #[must_use]
    pub fn get(&self, helper: &str) -> Option<&ValidatorBinding> {
        self.bindings.get(helper)
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("binding_count", &self.bindings.len())
            .finish()
    }
}
