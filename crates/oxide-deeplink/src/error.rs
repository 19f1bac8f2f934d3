//! Error types for routing.

use thiserror::Error;

/// Reasons a dispatch call did not open anything.
///
/// None of these are raised as panics; the boolean entry points on
/// [`Router`](crate::Router) fold them into `false` plus a delegate
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The input could not be turned into a structured URL.
    #[error("unparsable url: {0:?}")]
    UnparsableUrl(String),

    /// The scheme filter rejected the URL.
    #[error("scheme not allowed: {scheme}")]
    SchemeNotAllowed { scheme: String },

    /// The delegate returned no URL from `will_open`.
    #[error("vetoed by delegate: {url}")]
    VetoedByDelegate { url: String },

    /// An interceptor registered for the key returned false.
    #[error("intercepted: {key}")]
    Intercepted { key: String },

    /// Nothing is bound to the key and no fallback URL was supplied.
    #[error("unhandled route: {key}")]
    RouteNotFound { key: String },

    /// A page factory returned no page.
    #[error("page init failed: {key}")]
    HandlerConstructionFailed { key: String },

    /// The presenter (or the chosen transition executor) declined.
    #[error("presentation failed: {key}")]
    PresentationFailed { key: String },

    /// The redirect/fallback chain exceeded the configured hop ceiling.
    #[error("redirect loop detected after {hops} hops")]
    RedirectLoopDetected { hops: usize },
}

/// Misconfiguration reported at registration time.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The key is already bound to a handler of the same kind.
    #[error("{key} has already been registered")]
    AlreadyRegistered { key: String },

    /// The key is already bound to a handler of the other kind.
    #[error("{key} conflicts with a registered {existing}")]
    Conflict { key: String, existing: &'static str },

    /// A page name was not found in the catalog.
    #[error("page not found in catalog: {name}")]
    UnknownPageName { name: String },
}

/// Errors raised while loading a [`RouterConfig`](crate::RouterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the config shape.
    #[error("invalid router config: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type alias for registration.
pub type Result<T> = std::result::Result<T, RegistrationError>;
