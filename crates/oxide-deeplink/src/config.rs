//! Router-wide configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::key::DEFAULT_SCHEME;
use crate::page::{OpenStyle, PresentationStyle};

/// Default ceiling on redirect and fallback hops within one dispatch call.
pub const DEFAULT_MAX_HOPS: usize = 32;

/// Settings read by the router at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Schemes accepted by the scheme filter. Empty accepts any scheme.
    pub allowed_schemes: Vec<String>,
    /// Host prefixed to path-only route keys. Empty selects combined mode.
    pub host: String,
    /// Open style for pages that do not declare one.
    pub preferred_open_style: OpenStyle,
    /// Presentation style used by `present` when none is given.
    pub preferred_presentation_style: PresentationStyle,
    /// Maximum redirect/fallback hops; `None` disables the guard.
    pub max_hops: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: Vec::new(),
            host: String::new(),
            preferred_open_style: OpenStyle::Push,
            preferred_presentation_style: PresentationStyle::FullScreen,
            max_hops: Some(DEFAULT_MAX_HOPS),
        }
    }
}

impl RouterConfig {
    /// Parses a JSON configuration document. Missing fields take their
    /// defaults.
    ///
    /// ```
    /// use oxide_deeplink::RouterConfig;
    ///
    /// let config = RouterConfig::from_json(r#"{"allowed_schemes": ["myapp"]}"#).unwrap();
    /// assert_eq!(config.allowed_schemes, vec!["myapp"]);
    /// assert!(config.host.is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns whether the scheme filter lets `scheme` through.
    ///
    /// With an empty allow-list every scheme is; otherwise the scheme must
    /// be listed or be the internal default scheme.
    pub fn is_scheme_allowed(&self, scheme: &str) -> bool {
        self.allowed_schemes.is_empty()
            || scheme == DEFAULT_SCHEME
            || self.allowed_schemes.iter().any(|s| s == scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert!(config.allowed_schemes.is_empty());
        assert_eq!(config.preferred_open_style, OpenStyle::Push);
        assert_eq!(config.max_hops, Some(DEFAULT_MAX_HOPS));
    }

    #[test]
    fn test_from_json() {
        let config = RouterConfig::from_json(
            r#"{
                "allowed_schemes": ["myapp"],
                "host": "example.com",
                "preferred_open_style": {"present": "form_sheet"},
                "max_hops": null
            }"#,
        )
        .unwrap();
        assert_eq!(config.host, "example.com");
        assert_eq!(
            config.preferred_open_style,
            OpenStyle::Present(PresentationStyle::FormSheet)
        );
        assert_eq!(config.max_hops, None);
        assert_eq!(config.preferred_presentation_style, PresentationStyle::FullScreen);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = RouterConfig::from_json("{\"host\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
        assert!(err.to_string().starts_with("invalid router config"));
    }

    #[test]
    fn test_scheme_filter_open_by_default() {
        let config = RouterConfig::default();
        assert!(config.is_scheme_allowed("anything"));
    }

    #[test]
    fn test_scheme_filter_allow_list() {
        let config = RouterConfig {
            allowed_schemes: vec!["x".to_string()],
            ..RouterConfig::default()
        };
        assert!(config.is_scheme_allowed("x"));
        assert!(config.is_scheme_allowed(DEFAULT_SCHEME));
        assert!(!config.is_scheme_allowed("y"));
    }
}
