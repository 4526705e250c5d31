//! # decoy-core
//!
//! Foundation types for the Decoy fake framework.
//!
//! This crate provides the shared vocabulary the engine crates depend on:
//!
//! - **Branded IDs**: [`FakeId`], [`RuleId`], [`ScopeId`] as newtypes for type safety
//! - **Method identity**: [`MethodRef`], [`MethodKind`], and the [`TypeRegistry`]
//!   with precomputed interface dispatch tables
//! - **Call values**: [`ArgumentCollection`], the live [`CallDescriptor`], and the
//!   frozen [`CompletedCall`]
//! - **Errors**: [`CallError`] via `thiserror`

#![deny(unsafe_code)]

pub mod call;
pub mod errors;
pub mod ids;
pub mod method;

pub use call::{
    ArgumentCollection, BaseCall, CallDescriptor, CallOutcome, CompletedCall, fake_ref,
};
pub use errors::CallError;
pub use ids::{FakeId, RuleId, ScopeId};
pub use method::{MethodDescriptor, MethodKind, MethodRef, TypeDescriptor, TypeRegistry};
