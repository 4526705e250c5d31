//! Branded ID newtypes for type safety.
//!
//! Every entity the engine tracks has a distinct ID type implemented as a
//! newtype wrapper around `String`, so a rule ID can never be passed where a
//! fake ID is expected. All IDs are UUID v7 (time-ordered) generated via
//! [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a faked object.
    FakeId
}

branded_id! {
    /// Unique identifier for a configured call rule.
    RuleId
}

branded_id! {
    /// Unique identifier for a recording scope.
    ScopeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(FakeId::new(), FakeId::new());
        assert_ne!(RuleId::new(), RuleId::new());
    }

    #[test]
    fn test_display_matches_inner() {
        let id = FakeId::from("fake-1");
        assert_eq!(id.to_string(), "fake-1");
        assert_eq!(id.as_str(), "fake-1");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ScopeId::from("scope-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"scope-1\"");
        let back: ScopeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_v7_ids_parse_as_uuid() {
        let id = FakeId::new();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }
}
