#![forbid(unsafe_code)]

//! Tracking options.

/// Options fixed for the lifetime of one tracked value.
///
/// | option | default |
/// |--------|---------|
/// | `detect_property_adding` | `false` |
/// | `detect_property_removing` | `false` |
/// | `deep_detection` | `true` |
/// | `strict_comparison` | `true` |
///
/// With the `serde` feature, options deserialize from camelCase documents and
/// missing fields keep their defaults, so `{"strictComparison": false}` is a
/// complete override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase", deny_unknown_fields)
)]
pub struct Options {
    /// Report properties introduced by assignment or definition.
    pub detect_property_adding: bool,
    /// Report deleted properties.
    pub detect_property_removing: bool,
    /// Wrap nested containers on read so mutations at any depth are seen.
    /// Also enables recursive comparison in non-strict mode.
    pub deep_detection: bool,
    /// Compare by identity. When off, values are compared structurally.
    pub strict_comparison: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            detect_property_adding: false,
            detect_property_removing: false,
            deep_detection: true,
            strict_comparison: true,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn with_property_adding(mut self, enabled: bool) -> Self {
        self.detect_property_adding = enabled;
        self
    }

    #[must_use]
    pub const fn with_property_removing(mut self, enabled: bool) -> Self {
        self.detect_property_removing = enabled;
        self
    }

    #[must_use]
    pub const fn with_deep_detection(mut self, enabled: bool) -> Self {
        self.deep_detection = enabled;
        self
    }

    #[must_use]
    pub const fn with_strict_comparison(mut self, enabled: bool) -> Self {
        self.strict_comparison = enabled;
        self
    }

    /// Parse a (possibly partial) JSON options document over the defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert!(!options.detect_property_adding);
        assert!(!options.detect_property_removing);
        assert!(options.deep_detection);
        assert!(options.strict_comparison);
    }

    #[test]
    fn builders_override_single_fields() {
        let options = Options::default()
            .with_property_adding(true)
            .with_strict_comparison(false);
        assert!(options.detect_property_adding);
        assert!(!options.strict_comparison);
        assert!(options.deep_detection);
        assert!(!options.detect_property_removing);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_merges_with_defaults() {
        let options = Options::from_json_str(r#"{ "strictComparison": false }"#).unwrap();
        assert_eq!(options, Options::default().with_strict_comparison(false));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_option_is_rejected() {
        let err = Options::from_json_str(r#"{ "strict": false }"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid options"));
    }
}
