//! Engine settings.
//!
//! Construction-time options for the environment: how the user rule chain is
//! reordered after a match, and whether per-scope call recording is capped.

use serde::{Deserialize, Serialize};

/// How the user rule tier is reordered after a rule successfully applies.
///
/// Historical variants of this engine disagree on whether a matched rule
/// moves to the front of the chain, so the policy is explicit and testable
/// rather than implicit behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReorderPolicy {
    /// Leave the chain in configuration order.
    #[default]
    KeepOrder,
    /// Move the most recently applied rule to the front of the user tier.
    MoveMatchedToFront,
}

/// Options for a [`FakeEnvironment`](crate::environment::FakeEnvironment).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Reordering policy for the user rule tier.
    pub reorder_policy: ReorderPolicy,
    /// Cap on recorded calls kept per fake per scope; oldest entries are
    /// dropped first. `None` keeps everything.
    pub max_recorded_calls: Option<usize>,
}
