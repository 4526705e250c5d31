//! Validator resolution.
//!
//! Turns one argument sub-expression of a call specification into an
//! [`ArgumentValidator`], resolving helper calls through the binding
//! registry and falling back to equality matching for plain values.

use tracing::debug;

use super::{ArgumentValidator, EqualityValidator, HelperArg, ValidatorRegistry};
use crate::call_spec::ArgExpr;
use crate::errors::ValidatorBindingError;

/// Builds argument validators from argument sub-expressions.
#[derive(Debug)]
pub struct ArgumentValidatorFactory {
    registry: ValidatorRegistry,
}

impl Default for ArgumentValidatorFactory {
    fn default() -> Self {
        Self::new(ValidatorRegistry::with_builtins())
    }
}

impl ArgumentValidatorFactory {
    /// Create a factory over a binding registry.
    #[must_use]
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// Access the underlying binding registry.
    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Register an additional binding.
    pub fn register(&mut self, helper: impl Into<String>, binding: super::ValidatorBinding) {
        self.registry.register(helper, binding);
    }

    /// Resolve one argument sub-expression to a validator.
    ///
    /// Helper calls resolve through their binding: the leading
    /// extension-point placeholder is skipped, the bound type arguments must
    /// match the validator's generic arity, the binding target must
    /// implement the validator capability, and the remaining arguments must
    /// structurally match the declared constructor signature. A plain value
    /// becomes an [`EqualityValidator`].
    pub fn validator_for(
        &self,
        expr: &ArgExpr,
    ) -> Result<Box<dyn ArgumentValidator>, ValidatorBindingError> {
        match expr {
            ArgExpr::Literal(value) => Ok(Box::new(EqualityValidator::new(value.clone()))),
            ArgExpr::Helper {
                helper,
                type_args,
                args,
            } => {
                let binding = self.registry.get(helper).ok_or_else(|| {
                    ValidatorBindingError::UnknownHelper {
                        helper: helper.clone(),
                    }
                })?;

                // The front-end threads its extension point through helper
                // calls as the first argument; it is not a constructor
                // argument.
                let ctor_args: Vec<HelperArg> = match args.split_first() {
                    Some((HelperArg::Placeholder, rest)) => rest.to_vec(),
                    _ => args.clone(),
                };

                if type_args.len() != binding.generic_arity() {
                    return Err(ValidatorBindingError::GenericArityMismatch {
                        helper: helper.clone(),
                        bound: type_args.len(),
                        expected: binding.generic_arity(),
                    });
                }

                if let Some(type_name) = binding.non_validator_target() {
                    return Err(ValidatorBindingError::NotAValidator {
                        helper: helper.clone(),
                        type_name: type_name.to_string(),
                    });
                }

                let kinds: Option<Vec<_>> = ctor_args.iter().map(HelperArg::kind).collect();
                if kinds.as_deref() != Some(binding.signature()) {
                    return Err(ValidatorBindingError::SignatureMismatch {
                        helper: helper.clone(),
                        expected: binding.signature_text(helper),
                    });
                }

                debug!(helper = %helper, "Resolved validator binding");
                binding.construct(helper, ctor_args)
            }
        }
    }
}
