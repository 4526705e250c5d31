//! Call specifications.
//!
//! A [`CallSpecExpr`] is the declarative description a front-end DSL
//! produces for "this method/property, with these argument expressions".
//! Building it yields a [`CallSpecification`]: the method identity plus one
//! validator per parameter, which answers "does this live call match?".

use std::fmt;

use decoy_core::{CallDescriptor, MethodRef};
use serde_json::Value;

use crate::errors::ConstructionError;
use crate::resolver::MethodIdentityResolver;
use crate::validators::{ArgumentValidator, ArgumentValidatorFactory, HelperArg};

// ─────────────────────────────────────────────────────────────────────────────
// Declarative shapes
// ─────────────────────────────────────────────────────────────────────────────

/// One argument sub-expression of a call specification.
#[derive(Clone, Debug)]
pub enum ArgExpr {
    /// A plain evaluated value; matched by equality.
    Literal(Value),
    /// An invocation of a helper carrying validator-binding metadata.
    Helper {
        /// Helper identifier resolved through the validator registry.
        helper: String,
        /// Type arguments bound on the helper call.
        type_args: Vec<String>,
        /// The helper call's own evaluated arguments.
        args: Vec<HelperArg>,
    },
}

impl ArgExpr {
    /// Build a helper invocation expression.
    #[must_use]
    pub fn helper(helper: impl Into<String>, type_args: Vec<String>, args: Vec<HelperArg>) -> Self {
        Self::Helper {
            helper: helper.into(),
            type_args,
            args,
        }
    }
}

/// The declarative call expression a front-end produces.
#[derive(Clone, Debug)]
pub enum CallSpecExpr {
    /// A method invocation with argument sub-expressions.
    MethodCall {
        /// Identity of the invoked method.
        method: MethodRef,
        /// One sub-expression per argument.
        args: Vec<ArgExpr>,
    },
    /// A property read; specified via the property's getter.
    PropertyGet {
        /// Type declaring the property.
        declaring_type: String,
        /// Property name.
        property: String,
    },
    /// Any other expression shape a front-end may hand over (field reads,
    /// bare values). Never buildable.
    Other {
        /// Description of the shape, used in the construction error.
        shape: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Built specification
// ─────────────────────────────────────────────────────────────────────────────

/// A built call specification: method identity plus per-parameter validators.
pub struct CallSpecification {
    method: MethodRef,
    validators: Vec<Box<dyn ArgumentValidator>>,
}

impl CallSpecification {
    /// Build a specification from a declarative call expression.
    ///
    /// Method calls get one validator per argument via the factory; property
    /// reads get the getter identity and no validators. Any other shape is a
    /// [`ConstructionError::UnsupportedExpression`].
    pub fn build(
        expr: &CallSpecExpr,
        factory: &ArgumentValidatorFactory,
    ) -> Result<Self, ConstructionError> {
        match expr {
            CallSpecExpr::MethodCall { method, args } => {
                let validators = args
                    .iter()
                    .map(|arg| factory.validator_for(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self {
                    method: method.clone(),
                    validators,
                })
            }
            CallSpecExpr::PropertyGet {
                declaring_type,
                property,
            } => Ok(Self {
                method: MethodRef::new(declaring_type.clone(), property.clone(), 0),
                validators: Vec::new(),
            }),
            CallSpecExpr::Other { shape } => Err(ConstructionError::UnsupportedExpression {
                shape: shape.clone(),
            }),
        }
    }

    /// The specified method identity.
    #[must_use]
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Number of configured argument validators.
    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Whether `call` matches this specification.
    ///
    /// The invoked method must resolve to the same call on the call's
    /// concrete type; a differing argument count is a plain non-match; every
    /// positional validator must accept its argument, short-circuiting on
    /// the first failure.
    pub fn matches(&self, call: &CallDescriptor, resolver: &mut MethodIdentityResolver) -> bool {
        if !resolver.resolves_to_same_method(call.concrete_type(), call.method(), &self.method) {
            return false;
        }
        if call.arguments().len() != self.validators.len() {
            return false;
        }
        self.validators
            .iter()
            .zip(call.arguments().values())
            .all(|(validator, argument)| validator.is_valid(argument))
    }

    /// Human-readable rendering:
    /// `DeclaringType.method(<validator>, <validator>, ...)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let described: Vec<String> = self.validators.iter().map(|v| v.describe()).collect();
        format!(
            "{}.{}({})",
            self.method.declaring_type,
            self.method.name,
            described.join(", ")
        )
    }
}

impl fmt::Debug for CallSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSpecification")
            .field("method", &self.method)
            .field("validator_count", &self.validators.len())
            .finish()
    }
}
