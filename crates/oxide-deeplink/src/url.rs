//! URL parsing with best-effort repair of unencoded input.
//!
//! Deep links are frequently typed or generated without percent-encoding,
//! e.g. `myapp://user?name=你好`. [`ParsedUrl::parse`] first hands the input
//! to [`url::Url`] and, only when that fails, splits it by hand,
//! percent-encodes each component with the character set its grammar allows
//! and parses the cleaned string again.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::trace;
use url::Url;

use crate::error::RouteError;

/// RFC 3986 `pchar` minus `/`: unreserved, sub-delims, `:` and `@`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Query and fragment characters.
const FRAGMENT: &AsciiSet = &PATH_SEGMENT.remove(b'/').remove(b'?');

/// A single query key or value: `&` and `=` delimit items, so they are
/// encoded.
const QUERY_ITEM: &AsciiSet = &FRAGMENT.add(b'&').add(b'=');

/// A structured URL. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    serialization: String,
    scheme: String,
    host: String,
    path: String,
    query: Option<String>,
    query_params: HashMap<String, String>,
    fragment: Option<String>,
}

impl ParsedUrl {
    /// Parses a raw string, repairing unencoded characters if needed.
    ///
    /// Returns `None` for empty or whitespace-only input and for input whose
    /// structure cannot be recovered, including input without a scheme.
    ///
    /// ```
    /// use oxide_deeplink::ParsedUrl;
    ///
    /// let url = ParsedUrl::parse("myapp://user?name=你好").unwrap();
    /// assert_eq!(url.host(), "user");
    /// assert_eq!(url.query_param("name"), Some("你好"));
    /// assert!(ParsedUrl::parse("myapp://host:abc/x").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        // A string that is already valid is never re-encoded.
        Self::parse_strict(trimmed).or_else(|| Self::parse_repaired(trimmed))
    }

    /// Parses using the standard URL grammar only.
    pub fn parse_strict(input: &str) -> Option<Self> {
        let url = Url::parse(input).ok()?;
        let query = url.query().map(str::to_string);

        Some(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().map(decode).unwrap_or_default(),
            path: normalize_path(url.path()),
            query_params: query.as_deref().map(parse_query).unwrap_or_default(),
            query,
            fragment: url.fragment().map(decode),
            serialization: url.into(),
        })
    }

    fn parse_repaired(input: &str) -> Option<Self> {
        let (scheme, mut rest) = input.split_once("://")?;

        let fragment = match rest.split_once('#') {
            Some((head, fragment)) => {
                rest = head;
                fragment
            }
            None => "",
        };

        let query = match rest.split_once('?') {
            Some((head, query)) => {
                rest = head;
                query
            }
            None => "",
        };

        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));

        let mut cleaned = format!("{scheme}://{host}");
        if rest.contains('/') {
            cleaned.push('/');
            cleaned.push_str(&encode_path(path));
        }
        let query = encode_query(query);
        if !query.is_empty() {
            cleaned.push('?');
            cleaned.push_str(&query);
        }
        if !fragment.is_empty() {
            cleaned.push('#');
            cleaned.extend(utf8_percent_encode(fragment, FRAGMENT));
        }

        trace!(input = %input, cleaned = %cleaned, "Repaired unencoded url");
        Self::parse_strict(&cleaned)
    }

    /// Returns the URL as a string (percent-encoded).
    pub fn as_str(&self) -> &str {
        &self.serialization
    }

    /// Returns the lowercased scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the decoded host without user info or port. Empty if absent.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the decoded path. Either empty or starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw (still encoded) query string.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the decoded query parameters.
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Gets a single decoded query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).map(String::as_str)
    }

    /// Returns the decoded fragment.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialization)
    }
}

impl FromStr for ParsedUrl {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RouteError::UnparsableUrl(s.to_string()))
    }
}

/// A value that can be turned into a [`ParsedUrl`].
pub trait IntoUrl {
    /// Converts to a URL.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnparsableUrl`] when the value cannot be parsed.
    fn into_url(self) -> Result<ParsedUrl, RouteError>;
}

impl IntoUrl for ParsedUrl {
    fn into_url(self) -> Result<ParsedUrl, RouteError> {
        Ok(self)
    }
}

impl IntoUrl for &ParsedUrl {
    fn into_url(self) -> Result<ParsedUrl, RouteError> {
        Ok(self.clone())
    }
}

impl IntoUrl for &str {
    fn into_url(self) -> Result<ParsedUrl, RouteError> {
        self.parse()
    }
}

impl IntoUrl for String {
    fn into_url(self) -> Result<ParsedUrl, RouteError> {
        self.parse()
    }
}

impl IntoUrl for &String {
    fn into_url(self) -> Result<ParsedUrl, RouteError> {
        self.parse()
    }
}

fn normalize_path(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let mut path = decode(raw);
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Decodes a query string. A later duplicate key wins; a key without `=`
/// clears any earlier value for that key.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((key, value)) => {
                params.insert(decode(key), decode(value));
            }
            None => {
                params.remove(&decode(pair));
            }
        }
    }
    params
}

/// Percent-decodes, keeping the input untouched when it is not valid UTF-8
/// after decoding.
pub(crate) fn decode(s: &str) -> String {
    urlencoding::decode(s).map_or_else(|_| s.to_string(), |d| d.into_owned())
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn encode_query(query: &str) -> String {
    query
        .split('&')
        .filter_map(|item| {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (item, None),
            };
            if key.is_empty() {
                return None;
            }
            let key = utf8_percent_encode(key, QUERY_ITEM);
            Some(match value {
                Some(value) => format!("{key}={}", utf8_percent_encode(value, QUERY_ITEM)),
                None => key.to_string(),
            })
        })
        .collect::<Vec<_>>()
        .join("&")
}
