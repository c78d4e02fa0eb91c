//! Newtype protocol identifiers.
//!
//! Every protocol string with a meaning of its own is a distinct newtype. This
//! prevents accidentally passing, for example, a [`ModelId`] where an
//! [`ApiVersion`] is expected even though both are strings on the wire.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// A canonical model identifier as published by the provider
    /// (e.g. `"claude-3-haiku-20240307"`).
    ///
    /// The gateway spells some models differently; see
    /// [`crate::backend::translate_model`].
    ModelId
}

string_id! {
    /// The protocol version string sent with every request.
    ///
    /// Pins the wire-protocol revision (e.g. `"2023-06-01"`) and, by its shape,
    /// selects the backend: versions starting with `"vertex-"` target the
    /// gateway. See [`crate::backend::BackendVariant::classify`].
    ApiVersion
}

impl ApiVersion {
    /// Wraps a compile-time version constant. Callers guarantee it is non-empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }
}

string_id! {
    /// An opt-in beta feature flag sent in the `anthropic-beta` header
    /// (e.g. `"tools-2024-04-04"`).
    BetaFeature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifiers_are_rejected() {
        assert!(ModelId::new("").is_none());
        assert!(ApiVersion::new(String::new()).is_none());
        assert!(BetaFeature::new("").is_none());
    }

    #[test]
    fn test_identifier_display_matches_wire_value() {
        let model = ModelId::new("claude-3-opus-20240229").unwrap();
        assert_eq!(model.to_string(), "claude-3-opus-20240229");
        assert_eq!(model.as_str(), "claude-3-opus-20240229");
    }
}
