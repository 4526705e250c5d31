//! Argument validators.
//!
//! A validator checks whether one concrete argument value satisfies the
//! expectation configured for that parameter position, and renders a
//! description for diagnostics. Helper identifiers resolve to validator
//! constructors through the [`ValidatorRegistry`]; anything else falls back
//! to equality matching.

mod any;
mod equality;
mod factory;
mod predicate;
mod registry;

use serde_json::Value;

pub use any::AnyValidator;
pub use equality::EqualityValidator;
pub use factory::ArgumentValidatorFactory;
pub use predicate::{Predicate, PredicateValidator};
pub use registry::{ArgKind, HelperArg, ValidatorBinding, ValidatorRegistry};

/// A per-parameter argument expectation.
///
/// Implementations pair a predicate with a human-readable description used
/// when rendering the owning call specification.
pub trait ArgumentValidator {
    /// Whether `value` satisfies this validator.
    fn is_valid(&self, value: &Value) -> bool;

    /// Plain description of the expectation, without delimiters.
    fn description(&self) -> String;

    /// Diagnostic rendering: the description enclosed in `<...>`.
    fn describe(&self) -> String {
        format!("<{}>", self.description())
    }
}
