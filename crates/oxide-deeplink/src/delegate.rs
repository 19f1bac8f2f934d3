//! Optional observer and filter for dispatch calls.

use crate::page::PageRef;
use crate::param::{Param, UserInfo};
use crate::url::ParsedUrl;

/// Hooks into the router's dispatch. Every method has a default, so an
/// implementation only overrides what it needs.
///
/// ```
/// use oxide_deeplink::{ParsedUrl, RouterDelegate, UserInfo};
///
/// /// Sends every legacy `http` link through the app scheme.
/// struct Rewriter;
///
/// impl RouterDelegate for Rewriter {
///     fn will_open(&self, url: &ParsedUrl, _: &UserInfo) -> Option<ParsedUrl> {
///         if url.scheme() == "http" {
///             ParsedUrl::parse(&url.as_str().replacen("http", "myapp", 1))
///         } else {
///             Some(url.clone())
///         }
///     }
/// }
/// ```
pub trait RouterDelegate: Send + Sync {
    /// Called before a URL is resolved. Return the URL to open (possibly
    /// rewritten), or `None` to abort.
    fn will_open(&self, url: &ParsedUrl, _user_info: &UserInfo) -> Option<ParsedUrl> {
        Some(url.clone())
    }

    /// Called once a dispatch call has opened `url`.
    fn did_open(&self, _url: &ParsedUrl, _user_info: &UserInfo) {}

    /// Called once a dispatch call has failed to open `url`.
    fn did_fail_to_open(&self, _url: &ParsedUrl, _user_info: &UserInfo) {}

    /// Called when a fallback URL was used to complete a dispatch call.
    fn did_fallback_to(&self, _url: &ParsedUrl, _user_info: &UserInfo) {}

    /// Performs a transition when the caller asked for
    /// [`TransitionExecutor::Delegate`](crate::TransitionExecutor::Delegate).
    fn route_transition(&self, _param: &Param, _from: Option<&PageRef>, _to: &PageRef) -> bool {
        false
    }
}
