//! Route keys.
//!
//! A route key is the canonical identifier of a destination. There are two
//! ways to derive it from a URL:
//!
//! ```text
//! myapp://example.com/over/there?name=phoenix#nose
//! \___/   \_________/\_________/ \__________/ \__/
//!   |          |          |           |        |
//! scheme     host       path       query   fragment
//! ```
//!
//! 1. Combined mode: the key is `host + path`, i.e. `example.com/over/there`.
//! 2. Host-scoped mode: the router is configured with a host once and routes
//!    are registered by path alone (`/over/there`). The configured host is
//!    prefixed to every key that does not already carry it.

use std::borrow::Borrow;
use std::fmt;

use crate::url::ParsedUrl;

/// Internal scheme used for URLs synthesized from route keys.
///
/// Always accepted by the scheme filter, whatever the allow-list says.
pub const DEFAULT_SCHEME: &str = "reer";

/// A comparable, hashable route identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(String);

impl RouteKey {
    /// Creates a key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives the key of a URL: `host + path`.
    pub fn from_url(url: &ParsedUrl) -> Self {
        Self(format!("{}{}", url.host(), url.path()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefixes `host` unless the key already starts with it.
    ///
    /// An empty host leaves the key unchanged.
    #[must_use]
    pub fn scoped(&self, host: &str) -> Self {
        if self.0.starts_with(host) {
            self.clone()
        } else {
            Self(format!("{host}{}", self.0))
        }
    }

    /// Synthesizes `reer://<scoped key>`.
    pub fn to_url(&self, host: &str) -> Option<ParsedUrl> {
        ParsedUrl::parse(&format!("{DEFAULT_SCHEME}://{}", self.scoped(host)))
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RouteKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&RouteKey> for RouteKey {
    fn from(key: &RouteKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for RouteKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RouteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_mode_key() {
        let url = ParsedUrl::parse("myapp://example.com/over/there?name=phoenix#nose").unwrap();
        assert_eq!(RouteKey::from_url(&url).as_str(), "example.com/over/there");
    }

    #[test]
    fn test_host_only_key() {
        let url = ParsedUrl::parse("myapp://abc_action?id=1").unwrap();
        assert_eq!(RouteKey::from_url(&url).as_str(), "abc_action");
    }

    #[test]
    fn test_scoped() {
        let key = RouteKey::new("/user");
        assert_eq!(key.scoped("example.com").as_str(), "example.com/user");
        assert_eq!(key.scoped("").as_str(), "/user");

        let already = RouteKey::new("example.com/user");
        assert_eq!(already.scoped("example.com"), already);
    }

    #[test]
    fn test_to_url_uses_default_scheme() {
        let url = RouteKey::new("/user").to_url("example.com").unwrap();
        assert_eq!(url.scheme(), DEFAULT_SCHEME);
        assert_eq!(RouteKey::from_url(&url).as_str(), "example.com/user");
    }
}
