//! Error types for specification construction, validator binding, and routing.

use decoy_core::{FakeId, ScopeId};
use thiserror::Error;

/// Errors raised while building a call specification or managing scopes.
///
/// Always surfaced to the caller immediately; never recovered automatically.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The declarative call expression is not a method call or property read.
    #[error("unsupported call specification shape: {shape}")]
    UnsupportedExpression {
        /// Description of the offending expression shape.
        shape: String,
    },

    /// A scope other than the innermost open scope was closed.
    #[error("scope {scope} closed out of order: it is not the innermost open scope")]
    ScopeClosedOutOfOrder {
        /// The scope the caller tried to close.
        scope: ScopeId,
    },

    /// A validator binding failed while building argument validators.
    #[error("{0}")]
    Validator(#[from] ValidatorBindingError),
}

/// Errors raised when resolving an argument helper to a validator.
///
/// All of these surface at specification-construction time, before any call
/// is intercepted.
#[derive(Debug, Error)]
pub enum ValidatorBindingError {
    /// No binding is registered for the helper identifier.
    #[error("no validator binding registered for helper `{helper}`")]
    UnknownHelper {
        /// The unresolved helper identifier.
        helper: String,
    },

    /// The binding's target type does not implement the validator capability.
    #[error(
        "binding for helper `{helper}` names `{type_name}`, which does not implement the argument-validator capability"
    )]
    NotAValidator {
        /// The helper identifier.
        helper: String,
        /// The offending target type name.
        type_name: String,
    },

    /// The helper call binds a different number of type arguments than the
    /// validator expects.
    #[error("helper `{helper}` binds {bound} type argument(s) but the validator expects {expected}")]
    GenericArityMismatch {
        /// The helper identifier.
        helper: String,
        /// Type arguments bound on the helper call.
        bound: usize,
        /// Type arguments the validator type expects.
        expected: usize,
    },

    /// The helper call's constructor arguments do not match the validator's
    /// constructor signature.
    #[error("constructor arguments for helper `{helper}` do not match the expected signature `{expected}`")]
    SignatureMismatch {
        /// The helper identifier.
        helper: String,
        /// Rendering of the expected constructor signature.
        expected: String,
    },
}

/// Routing-time errors.
///
/// `NoApplicableRule` is a defensive internal invariant violation — the
/// default-value rule is always applicable, so it should be unreachable.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No rule matched a call. Internal invariant violation, not user-facing.
    #[error("internal: no applicable rule for call to {method}")]
    NoApplicableRule {
        /// Rendering of the invoked method.
        method: String,
    },

    /// A behavior delegated to the base implementation, but the call carries
    /// no base-call capability.
    #[error("call to {method} has no base implementation to delegate to")]
    MissingBaseImplementation {
        /// Rendering of the invoked method.
        method: String,
    },

    /// An operation referenced a fake that was never registered.
    #[error("fake not registered: {fake}")]
    UnknownFake {
        /// The unknown fake identity.
        fake: FakeId,
    },
}
