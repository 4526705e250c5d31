//! Method identity and the type registry.
//!
//! The engine never reflects over live objects. Instead, the proxy backend
//! registers a [`TypeDescriptor`] for every concrete type it fakes, and all
//! identity questions ("is this invoked method the same call as that
//! configured one?") are answered from this declarative model:
//!
//! - [`MethodRef`] is the canonical identity of a method: declaring type,
//!   name, and arity.
//! - [`MethodDescriptor`] adds the method's kind, return type, base virtual
//!   definition, and the interface methods it implements.
//! - [`TypeRegistry`] stores the descriptors and precomputes, once per
//!   concrete type, the interface-to-implementation dispatch table used at
//!   match time.
//!
//! Getter and setter methods are named after their property with arity 0
//! and 1 respectively; the kind carries the property name.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Method identity
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical identity of a method: declaring type, name, and arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    /// Name of the type (interface or class) the method is declared on.
    pub declaring_type: String,
    /// Method name. Property accessors use the property name itself.
    pub name: String,
    /// Number of declared parameters.
    pub arity: usize,
}

impl MethodRef {
    /// Create a method reference.
    #[must_use]
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>, arity: usize) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

/// What kind of member a method is.
///
/// Accessor and event kinds carry the member name so built-in rules can
/// derive the paired accessor (e.g. the getter for a captured setter).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MethodKind {
    /// A plain method.
    Ordinary,
    /// A property getter (arity 0).
    PropertyGet {
        /// Name of the property being read.
        property: String,
    },
    /// A property setter (arity 1).
    PropertySet {
        /// Name of the property being written.
        property: String,
    },
    /// An add-listener method for an event (arity 1).
    EventSubscribe {
        /// Name of the event.
        event: String,
    },
    /// A remove-listener method for an event (arity 1).
    EventUnsubscribe {
        /// Name of the event.
        event: String,
    },
}

/// Declarative description of one method on a registered type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    /// Identity of the method as declared on this type.
    pub method: MethodRef,
    /// Member kind.
    #[serde(default = "MethodDescriptor::default_kind")]
    pub kind: MethodKind,
    /// Name of the return type (used for zero values and auto-faking).
    pub return_type: String,
    /// Base virtual definition this method overrides, if any.
    ///
    /// `None` means the method is its own base definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<MethodRef>,
    /// Interface methods this method implements on the declaring type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<MethodRef>,
}

impl MethodDescriptor {
    fn default_kind() -> MethodKind {
        MethodKind::Ordinary
    }

    /// Describe a plain method.
    #[must_use]
    pub fn ordinary(method: MethodRef, return_type: impl Into<String>) -> Self {
        Self {
            method,
            kind: MethodKind::Ordinary,
            return_type: return_type.into(),
            base_definition: None,
            implements: Vec::new(),
        }
    }

    /// Describe a property getter for `property` on `declaring_type`.
    #[must_use]
    pub fn getter(
        declaring_type: impl Into<String>,
        property: impl Into<String>,
        return_type: impl Into<String>,
    ) -> Self {
        let property = property.into();
        Self {
            method: MethodRef::new(declaring_type, property.clone(), 0),
            kind: MethodKind::PropertyGet { property },
            return_type: return_type.into(),
            base_definition: None,
            implements: Vec::new(),
        }
    }

    /// Describe a property setter for `property` on `declaring_type`.
    #[must_use]
    pub fn setter(declaring_type: impl Into<String>, property: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            method: MethodRef::new(declaring_type, property.clone(), 1),
            kind: MethodKind::PropertySet { property },
            return_type: "void".to_string(),
            base_definition: None,
            implements: Vec::new(),
        }
    }

    /// Set the base virtual definition.
    #[must_use]
    pub fn overriding(mut self, base: MethodRef) -> Self {
        self.base_definition = Some(base);
        self
    }

    /// Add an interface method this method implements.
    #[must_use]
    pub fn implementing(mut self, interface_method: MethodRef) -> Self {
        self.implements.push(interface_method);
        self
    }
}

/// Declarative description of a registered concrete type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Names of the interfaces this type implements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Methods declared on this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    /// Create a descriptor with no interfaces or methods.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Add an implemented interface.
    #[must_use]
    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add a method descriptor.
    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of type and method descriptors with precomputed dispatch tables.
///
/// Registering a type builds its interface-to-implementation map once, so
/// match-time identity resolution never walks descriptor lists.
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
    methods: HashMap<MethodRef, MethodDescriptor>,
    /// concrete type name → interface method → implementing method.
    dispatch: HashMap<String, HashMap<MethodRef, MethodRef>>,
    fakeable: HashSet<String>,
    zero_values: HashMap<String, Value>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concrete type and precompute its dispatch table.
    ///
    /// Re-registering a type replaces its previous descriptor and table.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) {
        let mut table = HashMap::new();
        for method in &descriptor.methods {
            let _ = self.methods.insert(method.method.clone(), method.clone());
            for interface_method in &method.implements {
                let _ = table.insert(interface_method.clone(), method.method.clone());
            }
        }
        debug!(
            type_name = %descriptor.name,
            methods = descriptor.methods.len(),
            mapped = table.len(),
            "Registered type"
        );
        let _ = self.dispatch.insert(descriptor.name.clone(), table);
        let _ = self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Mark a type name as fakeable (eligible for auto-faked properties).
    pub fn register_fakeable(&mut self, type_name: impl Into<String>) {
        let _ = self.fakeable.insert(type_name.into());
    }

    /// Override the zero value returned for a type name.
    pub fn set_zero_value(&mut self, type_name: impl Into<String>, value: Value) {
        let _ = self.zero_values.insert(type_name.into(), value);
    }

    /// Whether `type_name` has been marked fakeable.
    #[must_use]
    pub fn is_fakeable(&self, type_name: &str) -> bool {
        self.fakeable.contains(type_name)
    }

    /// Look up the descriptor for a method, if registered.
    #[must_use]
    pub fn method_descriptor(&self, method: &MethodRef) -> Option<&MethodDescriptor> {
        self.methods.get(method)
    }

    /// The kind of a method. Unregistered methods are treated as ordinary.
    #[must_use]
    pub fn method_kind(&self, method: &MethodRef) -> MethodKind {
        self.methods
            .get(method)
            .map_or(MethodKind::Ordinary, |d| d.kind.clone())
    }

    /// The declared return type name of a method, if registered.
    #[must_use]
    pub fn return_type(&self, method: &MethodRef) -> Option<&str> {
        self.methods.get(method).map(|d| d.return_type.as_str())
    }

    /// Resolve the base virtual definition of a method.
    ///
    /// Follows override links until a method that is its own base definition
    /// is reached. Unregistered methods are their own base definition.
    #[must_use]
    pub fn base_definition(&self, method: &MethodRef) -> MethodRef {
        let mut current = method.clone();
        let mut seen: HashSet<MethodRef> = HashSet::new();
        while let Some(base) = self
            .methods
            .get(&current)
            .and_then(|d| d.base_definition.clone())
        {
            if !seen.insert(current.clone()) {
                // Cycle in override links; treat the current node as the base.
                break;
            }
            current = base;
        }
        current
    }

    /// Map an interface method to its implementation on `concrete_type`.
    ///
    /// Returns `None` when the type is unknown or does not implement the
    /// method's interface.
    #[must_use]
    pub fn interface_target(&self, concrete_type: &str, method: &MethodRef) -> Option<&MethodRef> {
        self.dispatch.get(concrete_type)?.get(method)
    }

    /// The zero value for a return type name.
    ///
    /// Well-known scalar type names map to their natural zero; anything else
    /// (including `void`) is `null` unless overridden via
    /// [`set_zero_value`](Self::set_zero_value).
    #[must_use]
    pub fn zero_value(&self, type_name: &str) -> Value {
        if let Some(value) = self.zero_values.get(type_name) {
            return value.clone();
        }
        match type_name {
            "int" | "i32" | "i64" | "u32" | "u64" => Value::from(0),
            "float" | "f32" | "f64" => Value::from(0.0),
            "bool" => Value::from(false),
            "string" | "str" => Value::from(""),
            "list" | "vec" | "array" => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_count", &self.types.len())
            .field("method_count", &self.methods.len())
            .finish()
    }
}
