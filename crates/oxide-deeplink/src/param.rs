//! Route parameters handed to every handler.

use std::collections::HashMap;

use serde_json::Value;

use crate::key::RouteKey;
use crate::url::ParsedUrl;

/// Caller-supplied context attached to a dispatch call.
pub type UserInfo = HashMap<String, Value>;

/// Key in the merged parameters holding a fallback URL string.
pub const FALLBACK_URL_KEY: &str = "route_fallback_url";

/// Key in the merged parameters that disables the default animation.
pub const NO_ANIMATION_KEY: &str = "route_no_animation";

/// Read-only view over the query parameters of a URL and the caller's
/// user info.
///
/// When a key appears in both, the user info value wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    source_url: ParsedUrl,
    user_info: UserInfo,
    all_params: HashMap<String, Value>,
}

impl Param {
    /// Builds the parameters for one dispatch hop.
    pub fn new(url: ParsedUrl, user_info: UserInfo) -> Self {
        let mut all_params: HashMap<String, Value> = url
            .query_params()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        all_params.extend(user_info.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            source_url: url,
            user_info,
            all_params,
        }
    }

    /// Builds parameters with no user info.
    pub fn from_url(url: ParsedUrl) -> Self {
        Self::new(url, UserInfo::new())
    }

    /// Returns the URL these parameters were built from.
    pub fn source_url(&self) -> &ParsedUrl {
        &self.source_url
    }

    /// Returns the URL scheme.
    pub fn scheme(&self) -> &str {
        self.source_url.scheme()
    }

    /// Returns the URL host.
    pub fn host(&self) -> &str {
        self.source_url.host()
    }

    /// Returns the URL path.
    pub fn path(&self) -> &str {
        self.source_url.path()
    }

    /// Returns the URL fragment, or an empty string.
    pub fn fragment(&self) -> &str {
        self.source_url.fragment().unwrap_or_default()
    }

    /// Returns the route key derived from the URL.
    pub fn route_key(&self) -> RouteKey {
        RouteKey::from_url(&self.source_url)
    }

    /// Returns the decoded query parameters of the URL.
    pub fn query_params(&self) -> &HashMap<String, String> {
        self.source_url.query_params()
    }

    /// Returns the caller-supplied user info.
    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    /// Returns the user info merged over the query parameters.
    pub fn all_params(&self) -> &HashMap<String, Value> {
        &self.all_params
    }

    /// Gets a merged parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.all_params.get(key)
    }

    /// Gets a merged parameter rendered as a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_as_string)
    }

    /// Gets a merged parameter coerced to a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(value_as_bool)
    }

    /// Gets a merged parameter coerced to an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(value_as_i64)
    }

    /// Returns the parsed fallback URL, if one was supplied.
    pub fn fallback_url(&self) -> Option<ParsedUrl> {
        self.get_str(FALLBACK_URL_KEY)
            .and_then(|s| ParsedUrl::parse(&s))
    }

    /// Returns the animation hint.
    ///
    /// `None` when the no-animation flag is absent or not boolean-like;
    /// otherwise the negation of the flag.
    pub fn animated(&self) -> Option<bool> {
        self.get_bool(NO_ANIMATION_KEY).map(|no_animation| !no_animation)
    }
}

/// Renders strings, numbers and booleans as a string.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerces booleans, numbers and boolean-like strings to a boolean.
///
/// Numeric values (including numeric strings) are true when non-zero.
/// Otherwise short strings `true`/`yes`/`false`/`no` are accepted,
/// case-insensitively.
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            if let Ok(f) = s.trim().parse::<f64>() {
                return Some(f != 0.0);
            }
            if s.len() > 5 {
                return None;
            }
            match s.to_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Coerces numbers, numeric strings and booleans to an integer,
/// truncating fractions.
#[allow(clippy::cast_possible_truncation)]
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
