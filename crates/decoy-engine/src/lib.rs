//! # decoy-engine
//!
//! Call matching, rule selection, and recording scopes for the Decoy fake
//! framework.
//!
//! Given a call made against a faked object, the engine decides which
//! configured behavior applies, executes it, and records the call for later
//! inspection:
//!
//! - **Validators**: per-argument expectations resolved through an explicit
//!   binding registry, with equality as the fallback
//! - **Call specifications**: method identity plus ordered validators,
//!   answering "does this live call match?"
//! - **Rules**: user-configured behaviors between fixed built-in tiers,
//!   with per-rule invocation budgets and first-match selection
//! - **Scopes**: nested recording/visibility scopes with strict LIFO close
//! - **Router/environment**: the composition points that intercept, apply,
//!   freeze, and record

#![deny(unsafe_code)]

pub mod call_spec;
pub mod environment;
pub mod errors;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod rules;
pub mod scope;
pub mod settings;
pub mod validators;

pub use call_spec::{ArgExpr, CallSpecExpr, CallSpecification};
pub use environment::FakeEnvironment;
pub use errors::{ConstructionError, EngineError, ValidatorBindingError};
pub use registry::{RuleRegistry, promote_to_front};
pub use resolver::MethodIdentityResolver;
pub use router::FakeRouter;
pub use rules::{
    AnyCallRule, Behavior, CallRule, NestedFakeFactory, RecordingRule, RuleActions, RuleContext,
    RuleMetadata, SpecificationRule,
};
pub use scope::{ScopeHandle, ScopeStack};
pub use settings::{EngineSettings, ReorderPolicy};
pub use validators::{
    AnyValidator, ArgKind, ArgumentValidator, ArgumentValidatorFactory, EqualityValidator,
    HelperArg, PredicateValidator, ValidatorBinding, ValidatorRegistry,
};
