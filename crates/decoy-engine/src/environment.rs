//! The fake environment.
//!
//! Owns the scope stack, the shared identity resolver, and one router per
//! fake. The original engine kept the current scope in process-wide mutable
//! state; here it is an owned value threaded through every operation, and
//! [`with_scope`](FakeEnvironment::with_scope) guarantees the paired close
//! on every exit path, unwinding included.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use decoy_core::{CallDescriptor, CompletedCall, FakeId, RuleId, TypeRegistry};

use crate::errors::{ConstructionError, EngineError};
use crate::resolver::MethodIdentityResolver;
use crate::router::FakeRouter;
use crate::rules::{CallRule, NestedFakeFactory, RuleMetadata};
use crate::scope::{ScopeHandle, ScopeStack};
use crate::settings::EngineSettings;

/// Owner of all routing state: scope stack, resolver, and per-fake routers.
pub struct FakeEnvironment {
    types: Arc<TypeRegistry>,
    resolver: MethodIdentityResolver,
    scopes: ScopeStack,
    routers: HashMap<FakeId, FakeRouter>,
    settings: EngineSettings,
}

impl FakeEnvironment {
    /// Create an environment with default settings.
    #[must_use]
    pub fn new(types: TypeRegistry) -> Self {
        Self::with_settings(types, EngineSettings::default())
    }

    /// Create an environment with explicit settings.
    #[must_use]
    pub fn with_settings(types: TypeRegistry, settings: EngineSettings) -> Self {
        let types = Arc::new(types);
        Self {
            resolver: MethodIdentityResolver::new(Arc::clone(&types)),
            scopes: ScopeStack::new(settings.max_recorded_calls),
            routers: HashMap::new(),
            settings,
            types,
        }
    }

    /// The shared type registry.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Register a fake of `concrete_type`, returning its identity.
    pub fn register_fake(&mut self, concrete_type: impl Into<String>) -> FakeId {
        let fake = FakeId::new();
        let router = FakeRouter::new(
            fake.clone(),
            concrete_type,
            self.settings.reorder_policy,
        );
        let _ = self.routers.insert(fake.clone(), router);
        fake
    }

    /// Attach a nested-fake factory to a registered fake.
    pub fn set_nested_fakes(
        &mut self,
        fake: &FakeId,
        factory: Box<dyn NestedFakeFactory>,
    ) -> Result<(), EngineError> {
        self.router_mut(fake)?.set_nested_fakes(factory);
        Ok(())
    }

    /// Add a user rule to `fake`'s chain, scoped to the current scope.
    pub fn add_rule(
        &mut self,
        fake: &FakeId,
        rule: Box<dyn CallRule>,
    ) -> Result<RuleId, EngineError> {
        let Self {
            routers, scopes, ..
        } = self;
        let router = routers
            .get_mut(fake)
            .ok_or_else(|| EngineError::UnknownFake { fake: fake.clone() })?;
        Ok(router.add_rule(rule, scopes))
    }

    /// Route a live call against its fake.
    pub fn intercept(&mut self, call: CallDescriptor) -> Result<CompletedCall, EngineError> {
        let Self {
            routers,
            scopes,
            resolver,
            types,
            ..
        } = self;
        let router = routers
            .get_mut(call.fake())
            .ok_or_else(|| EngineError::UnknownFake {
                fake: call.fake().clone(),
            })?;
        router.intercept(call, scopes, resolver, types)
    }

    /// The ordered user rule chain for `fake`, with scope visibility applied.
    pub fn rules(&self, fake: &FakeId) -> Result<impl Iterator<Item = &RuleMetadata>, EngineError> {
        self.routers
            .get(fake)
            .map(FakeRouter::rules)
            .ok_or_else(|| EngineError::UnknownFake { fake: fake.clone() })
    }

    /// The router serving `fake`.
    pub fn router(&self, fake: &FakeId) -> Result<&FakeRouter, EngineError> {
        self.routers
            .get(fake)
            .ok_or_else(|| EngineError::UnknownFake { fake: fake.clone() })
    }

    /// Calls recorded for `fake` while the current scope has been open.
    #[must_use]
    pub fn recorded_calls_in_scope(&self, fake: &FakeId) -> &[CompletedCall] {
        self.scopes.current().calls_for(fake)
    }

    /// The fake's entire call history (root scope).
    #[must_use]
    pub fn calls_for(&self, fake: &FakeId) -> &[CompletedCall] {
        self.scopes.root().calls_for(fake)
    }

    /// Number of open scopes, the root included.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Open a new recording scope.
    pub fn begin_scope(&mut self) -> ScopeHandle {
        self.scopes.begin()
    }

    /// Close the scope for `handle`, removing the rules it added from each
    /// fake's visible chain. Recorded calls persist.
    pub fn close_scope(&mut self, handle: ScopeHandle) -> Result<(), ConstructionError> {
        let closed = self.scopes.close(handle)?;
        for (fake, ids) in closed.added_rules() {
            if let Some(router) = self.routers.get_mut(fake) {
                router.remove_rules(ids);
            }
        }
        Ok(())
    }

    /// Run `body` inside a fresh scope, closing it on every exit path.
    ///
    /// The close runs from a drop guard, so it happens even if `body`
    /// unwinds.
    pub fn with_scope<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        let handle = self.begin_scope();
        let mut guard = ScopeGuard {
            environment: self,
            handle: Some(handle),
        };
        body(&mut *guard.environment)
    }

    fn router_mut(&mut self, fake: &FakeId) -> Result<&mut FakeRouter, EngineError> {
        self.routers
            .get_mut(fake)
            .ok_or_else(|| EngineError::UnknownFake { fake: fake.clone() })
    }
}

impl fmt::Debug for FakeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeEnvironment")
            .field("fake_count", &self.routers.len())
            .field("scope_depth", &self.scopes.depth())
            .finish()
    }
}

/// Closes the scope when dropped, normal return or unwind alike.
struct ScopeGuard<'a> {
    environment: &'a mut FakeEnvironment,
    handle: Option<ScopeHandle>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The guard's scope is the innermost one unless the body leaked
            // an unclosed inner scope; nothing sensible can be done with
            // that during unwind.
            let _ = self.environment.close_scope(handle);
        }
    }
}
