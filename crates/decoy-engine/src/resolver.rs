//! Method identity resolution.
//!
//! Decides whether two method identities denote the same virtual call on a
//! concrete type: either their base virtual definitions are equal, or one is
//! an interface method the type's dispatch table maps onto a method with the
//! other's base definition. Results are memoized per
//! `(concrete type, method pair)` — the cache is derivable from the type
//! registry and is never a source of truth.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use decoy_core::{MethodRef, TypeRegistry};
use tracing::debug;

/// Resolves "same call" questions with a memo cache.
pub struct MethodIdentityResolver {
    types: Arc<TypeRegistry>,
    cache: HashMap<(String, MethodRef, MethodRef), bool>,
}

impl MethodIdentityResolver {
    /// Create a resolver over a type registry.
    #[must_use]
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            cache: HashMap::new(),
        }
    }

    /// Whether `invoked` and `declared` denote the same virtual call on
    /// `concrete_type`.
    ///
    /// Absence of an interface mapping is a negative result, not a failure.
    pub fn resolves_to_same_method(
        &mut self,
        concrete_type: &str,
        invoked: &MethodRef,
        declared: &MethodRef,
    ) -> bool {
        let key = (concrete_type.to_string(), invoked.clone(), declared.clone());
        if let Some(&hit) = self.cache.get(&key) {
            return hit;
        }
        let result = self.resolve(concrete_type, invoked, declared);
        debug!(
            concrete_type,
            invoked = %invoked,
            declared = %declared,
            result,
            "Resolved method identity"
        );
        let _ = self.cache.insert(key, result);
        result
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    fn resolve(&self, concrete_type: &str, invoked: &MethodRef, declared: &MethodRef) -> bool {
        let invoked_base = self.types.base_definition(invoked);
        let declared_base = self.types.base_definition(declared);
        if invoked_base == declared_base {
            return true;
        }

        // One side may be an interface method the concrete type maps to an
        // implementation whose base definition equals the other side's.
        self.maps_onto(concrete_type, invoked, &declared_base)
            || self.maps_onto(concrete_type, declared, &invoked_base)
    }

    fn maps_onto(&self, concrete_type: &str, interface_method: &MethodRef, base: &MethodRef) -> bool {
        self.types
            .interface_target(concrete_type, interface_method)
            .is_some_and(|target| &self.types.base_definition(target) == base)
    }
}

impl fmt::Debug for MethodIdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodIdentityResolver")
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decoy_core::{MethodDescriptor, TypeDescriptor};

    fn registry() -> Arc<TypeRegistry> {
        let mut types = TypeRegistry::new();
        types.register_type(
            TypeDescriptor::new("Widget")
                .implementing("IWidget")
                .with_method(
                    MethodDescriptor::ordinary(MethodRef::new("Widget", "resize", 2), "bool")
                        .implementing(MethodRef::new("IWidget", "resize", 2)),
                )
                .with_method(
                    MethodDescriptor::ordinary(MethodRef::new("Widget", "refresh", 0), "void")
                        .overriding(MethodRef::new("WidgetBase", "refresh", 0)),
                ),
        );
        Arc::new(types)
    }

    #[test]
    fn test_identical_methods_resolve() {
        let mut resolver = MethodIdentityResolver::new(registry());
        let method = MethodRef::new("Widget", "resize", 2);
        assert!(resolver.resolves_to_same_method("Widget", &method, &method));
    }

    #[test]
    fn test_override_resolves_to_base_definition() {
        let mut resolver = MethodIdentityResolver::new(registry());
        assert!(resolver.resolves_to_same_method(
            "Widget",
            &MethodRef::new("Widget", "refresh", 0),
            &MethodRef::new("WidgetBase", "refresh", 0),
        ));
    }

    #[test]
    fn test_interface_method_resolves_to_implementation() {
        let mut resolver = MethodIdentityResolver::new(registry());
        let interface_method = MethodRef::new("IWidget", "resize", 2);
        let implementation = MethodRef::new("Widget", "resize", 2);
        assert!(resolver.resolves_to_same_method("Widget", &interface_method, &implementation));
        // And symmetrically.
        assert!(resolver.resolves_to_same_method("Widget", &implementation, &interface_method));
    }

    #[test]
    fn test_unrelated_methods_do_not_resolve() {
        let mut resolver = MethodIdentityResolver::new(registry());
        assert!(!resolver.resolves_to_same_method(
            "Widget",
            &MethodRef::new("Widget", "resize", 2),
            &MethodRef::new("Widget", "refresh", 0),
        ));
    }

    #[test]
    fn test_interface_mapping_is_per_concrete_type() {
        let mut resolver = MethodIdentityResolver::new(registry());
        assert!(!resolver.resolves_to_same_method(
            "Gadget",
            &MethodRef::new("IWidget", "resize", 2),
            &MethodRef::new("Widget", "resize", 2),
        ));
    }

    #[test]
    fn test_results_are_memoized() {
        let mut resolver = MethodIdentityResolver::new(registry());
        let method = MethodRef::new("Widget", "resize", 2);
        assert_eq!(resolver.cached_entries(), 0);
        let first = resolver.resolves_to_same_method("Widget", &method, &method);
        assert_eq!(resolver.cached_entries(), 1);
        let second = resolver.resolves_to_same_method("Widget", &method, &method);
        assert_eq!(resolver.cached_entries(), 1);
        assert_eq!(first, second);
    }
}
