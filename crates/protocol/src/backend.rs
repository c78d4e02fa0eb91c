//! Backend classification and model-name translation.
//!
//! The dispatch layer targets exactly two backends. Which one is in play is
//! never stored: it is derived from the configured protocol version string by
//! [`BackendVariant::classify`], and every URL, header, and body decision is
//! made by matching on the resulting variant.

use serde::{Deserialize, Serialize};

use crate::{ApiVersion, ModelId};

/// Prefix that marks a protocol version string as targeting the gateway.
pub const GATEWAY_VERSION_PREFIX: &str = "vertex-";

/// Protocol version used against the direct API when none is configured.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Protocol version used against the gateway when none is configured.
pub const DEFAULT_GATEWAY_API_VERSION: &str = "vertex-2023-10-16";

/// Body field the gateway reads the protocol version from.
pub const GATEWAY_VERSION_FIELD: &str = "anthropic_version";

// ---------------------------------------------------------------------------
// Backend variant
// ---------------------------------------------------------------------------

/// The backend an outbound request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendVariant {
    /// The provider's own API, authenticated with `X-Api-Key`.
    Direct,
    /// The cloud-platform proxy (Vertex AI), authenticated with a bearer token
    /// and addressed as `.../MODEL:action`.
    Gateway,
}

impl BackendVariant {
    /// Classifies a protocol version string.
    ///
    /// Total and pure: any string starting with [`GATEWAY_VERSION_PREFIX`] is
    /// [`BackendVariant::Gateway`], everything else (including the empty
    /// string) is [`BackendVariant::Direct`].
    pub fn classify(api_version: &str) -> Self {
        if api_version.starts_with(GATEWAY_VERSION_PREFIX) {
            Self::Gateway
        } else {
            Self::Direct
        }
    }

    /// Returns `true` for [`BackendVariant::Gateway`].
    pub fn is_gateway(self) -> bool {
        self == Self::Gateway
    }
}

impl std::fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Gateway => write!(f, "gateway"),
        }
    }
}

impl ApiVersion {
    /// Returns the default protocol version for the gateway.
    pub fn gateway_default() -> Self {
        Self::from_static(DEFAULT_GATEWAY_API_VERSION)
    }

    /// Returns the backend this protocol version selects.
    pub fn backend(&self) -> BackendVariant {
        BackendVariant::classify(self.as_str())
    }
}

impl Default for ApiVersion {
    /// The default protocol version for the direct API.
    fn default() -> Self {
        Self::from_static(DEFAULT_API_VERSION)
    }
}

// ---------------------------------------------------------------------------
// Model translation
// ---------------------------------------------------------------------------

/// Canonical model identifiers and their gateway spelling.
///
/// The gateway separates the snapshot date with `@` instead of `-`.
const GATEWAY_MODEL_NAMES: &[(&str, &str)] = &[
    ("claude-3-haiku-20240307", "claude-3-haiku@20240307"),
    ("claude-3-opus-20240229", "claude-3-opus@20240229"),
    ("claude-3-sonnet-20240229", "claude-3-sonnet@20240229"),
    ("claude-3-5-sonnet-20240620", "claude-3-5-sonnet@20240620"),
];

/// Translates a canonical model identifier into the form `variant` expects.
///
/// Under [`BackendVariant::Direct`] this is always the identity. Under
/// [`BackendVariant::Gateway`] known identifiers are mapped through the
/// translation table; unknown identifiers pass through unchanged.
pub fn translate_model(model: &str, variant: BackendVariant) -> &str {
    match variant {
        BackendVariant::Direct => model,
        BackendVariant::Gateway => GATEWAY_MODEL_NAMES
            .iter()
            .find(|(canonical, _)| *canonical == model)
            .map_or(model, |(_, gateway)| *gateway),
    }
}

impl ModelId {
    /// Returns this model's spelling under `variant`. See [`translate_model`].
    pub fn for_backend(&self, variant: BackendVariant) -> &str {
        translate_model(self.as_str(), variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_recognises_gateway_versions() {
        for version in ["vertex-2023-10-16", "vertex-", "vertex-anything"] {
            assert_eq!(BackendVariant::classify(version), BackendVariant::Gateway, "{version}");
        }
    }

    #[test]
    fn test_classify_defaults_to_direct() {
        for version in ["2023-06-01", "", "Vertex-2023-10-16", "vertex", "2023-vertex-01"] {
            assert_eq!(BackendVariant::classify(version), BackendVariant::Direct, "{version}");
        }
    }

    #[test]
    fn test_default_versions_classify_as_expected() {
        assert_eq!(BackendVariant::classify(DEFAULT_API_VERSION), BackendVariant::Direct);
        assert_eq!(
            BackendVariant::classify(DEFAULT_GATEWAY_API_VERSION),
            BackendVariant::Gateway
        );
    }

    #[test]
    fn test_api_version_defaults() {
        assert_eq!(ApiVersion::default().backend(), BackendVariant::Direct);
        assert_eq!(ApiVersion::gateway_default().backend(), BackendVariant::Gateway);
    }

    #[test]
    fn test_api_version_backend() {
        let version = ApiVersion::new("vertex-2023-10-16").unwrap();
        assert!(version.backend().is_gateway());
    }

    #[test]
    fn test_translate_maps_every_table_entry_under_gateway() {
        for (canonical, gateway) in GATEWAY_MODEL_NAMES {
            assert_eq!(translate_model(canonical, BackendVariant::Gateway), *gateway);
        }
        assert_eq!(
            translate_model("claude-3-haiku-20240307", BackendVariant::Gateway),
            "claude-3-haiku@20240307"
        );
    }

    #[test]
    fn test_translate_is_identity_under_direct() {
        for (canonical, _) in GATEWAY_MODEL_NAMES {
            assert_eq!(translate_model(canonical, BackendVariant::Direct), *canonical);
        }
    }

    #[test]
    fn test_translate_passes_unknown_models_through() {
        for model in ["claude-2.1", "claude-instant-1.2", "", "claude-3-haiku@20240307"] {
            assert_eq!(translate_model(model, BackendVariant::Gateway), model);
            assert_eq!(translate_model(model, BackendVariant::Direct), model);
        }
    }

    #[test]
    fn test_model_id_spelling_per_backend() {
        let model = ModelId::new("claude-3-opus-20240229").unwrap();
        assert_eq!(model.for_backend(BackendVariant::Gateway), "claude-3-opus@20240229");
        assert_eq!(model.for_backend(BackendVariant::Direct), "claude-3-opus-20240229");
    }
}
