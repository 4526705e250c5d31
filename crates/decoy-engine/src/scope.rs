//! Recording and visibility scopes.
//!
//! Scopes form a LIFO stack with a root sentinel that is always present and
//! never closed. Rule additions and call recordings propagate to every open
//! scope, so each still-open ancestor sees events as they occur. Query
//! semantics are deliberately asymmetric: the root answers with the fake's
//! entire call history, while a non-root scope answers only with the calls
//! recorded while it was open. Closing a scope removes exactly the rules it
//! added; recorded calls are never touched.

use std::collections::HashMap;
use std::fmt;

use decoy_core::{CompletedCall, FakeId, RuleId, ScopeId};
use tracing::debug;

use crate::errors::ConstructionError;

/// One node in the scope stack.
#[derive(Debug, Default)]
pub struct Scope {
    id: ScopeId,
    rules: HashMap<FakeId, Vec<RuleId>>,
    calls: HashMap<FakeId, Vec<CompletedCall>>,
}

impl Scope {
    fn new() -> Self {
        Self {
            id: ScopeId::new(),
            rules: HashMap::new(),
            calls: HashMap::new(),
        }
    }

    /// The scope's identity.
    #[must_use]
    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    /// Calls recorded for `fake` while this scope was open.
    #[must_use]
    pub fn calls_for(&self, fake: &FakeId) -> &[CompletedCall] {
        self.calls.get(fake).map_or(&[], Vec::as_slice)
    }
}

/// Handle for closing a scope. Obtained from [`ScopeStack::begin`].
#[derive(Debug)]
pub struct ScopeHandle {
    id: ScopeId,
}

impl ScopeHandle {
    /// The identity of the scope this handle closes.
    #[must_use]
    pub fn id(&self) -> &ScopeId {
        &self.id
    }
}

/// The per-fake rules a closed scope had added, to be removed from each
/// fake's visible rule chain.
#[derive(Debug)]
pub struct ClosedScope {
    rules: HashMap<FakeId, Vec<RuleId>>,
}

impl ClosedScope {
    /// Iterate the rule IDs the closed scope added, per fake.
    pub fn added_rules(&self) -> impl Iterator<Item = (&FakeId, &[RuleId])> {
        self.rules.iter().map(|(fake, ids)| (fake, ids.as_slice()))
    }
}

/// LIFO stack of recording scopes with a root sentinel.
pub struct ScopeStack {
    /// Bottom of the stack is the root; the top is the current scope.
    scopes: Vec<Scope>,
    /// Cap on recorded calls kept per fake per scope, oldest dropped first.
    max_recorded_calls: Option<usize>,
}

impl ScopeStack {
    /// Create a stack holding only the root scope.
    #[must_use]
    pub fn new(max_recorded_calls: Option<usize>) -> Self {
        Self {
            scopes: vec![Scope::new()],
            max_recorded_calls,
        }
    }

    /// Open a new scope on top of the current one.
    pub fn begin(&mut self) -> ScopeHandle {
        let scope = Scope::new();
        let handle = ScopeHandle {
            id: scope.id.clone(),
        };
        debug!(scope = %scope.id, depth = self.scopes.len() + 1, "Opened scope");
        self.scopes.push(scope);
        handle
    }

    /// Close the scope for `handle`.
    ///
    /// Only the innermost open scope may close; anything else — including a
    /// second close of an already-closed scope — is a
    /// [`ConstructionError::ScopeClosedOutOfOrder`]. The root can never
    /// close because no handle for it exists.
    pub fn close(&mut self, handle: ScopeHandle) -> Result<ClosedScope, ConstructionError> {
        let is_top = self.scopes.len() > 1
            && self
                .scopes
                .last()
                .is_some_and(|scope| scope.id == handle.id);
        if !is_top {
            return Err(ConstructionError::ScopeClosedOutOfOrder { scope: handle.id });
        }
        let scope = self.scopes.pop().unwrap_or_default();
        debug!(scope = %scope.id, depth = self.scopes.len(), "Closed scope");
        Ok(ClosedScope { rules: scope.rules })
    }

    /// Note a rule added for `fake` in every open scope.
    pub fn note_rule(&mut self, fake: &FakeId, rule: &RuleId) {
        for scope in &mut self.scopes {
            scope
                .rules
                .entry(fake.clone())
                .or_default()
                .push(rule.clone());
        }
    }

    /// Record a completed call for `fake` in every open scope.
    pub fn record(&mut self, fake: &FakeId, call: &CompletedCall) {
        for scope in &mut self.scopes {
            let calls = scope.calls.entry(fake.clone()).or_default();
            calls.push(call.clone());
            if let Some(cap) = self.max_recorded_calls {
                while calls.len() > cap {
                    let _ = calls.remove(0);
                }
            }
        }
    }

    /// The root scope: its recorded calls are the fake's entire history.
    #[must_use]
    pub fn root(&self) -> &Scope {
        &self.scopes[0]
    }

    /// The current (innermost open) scope.
    #[must_use]
    pub fn current(&self) -> &Scope {
        self.scopes.last().unwrap_or(&self.scopes[0])
    }

    /// Number of open scopes, the root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl fmt::Debug for ScopeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStack")
            .field("depth", &self.scopes.len())
            .field("max_recorded_calls", &self.max_recorded_calls)
            .finish()
    }
}
