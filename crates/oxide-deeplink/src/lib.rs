//! # oxide-deeplink
//!
//! URL dispatch for in-app deep links.
//!
//! This crate provides:
//! - Lenient URL parsing that repairs unencoded input
//! - Registration of actions and page factories under route keys
//! - Per-route interceptors that can block navigation
//! - A delegate that can veto, rewrite and observe navigation
//! - Redirects and fallback URLs with loop protection
//! - Will-open/did-open notifications
//!
//! ## Quick Start
//!
//! ```
//! use oxide_deeplink::{OpenOptions, Param, Router};
//!
//! let router = Router::new();
//! router
//!     .register_action("share", |param: &Param| {
//!         let _title = param.get_str("title");
//!     })
//!     .unwrap();
//!
//! assert!(router.can_open("myapp://share?title=hello"));
//! assert!(router.open("myapp://share?title=hello", OpenOptions::new()));
//! assert!(!router.open("myapp://unknown", OpenOptions::new()));
//! ```
//!
//! ## Route Keys
//!
//! A URL's route key is its host followed by its path:
//! `myapp://user/profile?id=1` resolves `user/profile`. The scheme,
//! query and fragment never take part in matching.
//!
//! When a host is configured with [`Router::set_host`], path-only keys
//! such as `/profile` are registered as `example.com/profile`, and
//! `myapp://example.com/profile` resolves them.
//!
//! ## Pages
//!
//! Pages are built by a [`PageFactory`] and shown by the installed
//! [`Presenter`]:
//!
//! ```
//! use std::any::Any;
//! use std::sync::Arc;
//! use oxide_deeplink::{OpenOptions, Page, PageRef, PresentationStyle, Presenter, Param, Router};
//!
//! struct Profile(Option<String>);
//!
//! impl Page for Profile {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! struct Stack;
//!
//! impl Presenter for Stack {
//!     fn push(&self, _: &PageRef, _: bool) -> bool {
//!         true
//!     }
//!
//!     fn present(&self, _: &PageRef, _: bool, _: PresentationStyle) -> bool {
//!         true
//!     }
//! }
//!
//! let router = Router::new();
//! router.set_presenter(Arc::new(Stack));
//! router
//!     .register_page("profile", |p: &Param| {
//!         Some(Arc::new(Profile(p.get_str("id"))) as PageRef)
//!     })
//!     .unwrap();
//!
//! let opened = router.try_push("myapp://profile?id=7", OpenOptions::new()).unwrap();
//! let page = opened.page.unwrap();
//! assert_eq!(page.downcast_ref::<Profile>().unwrap().0.as_deref(), Some("7"));
//! ```
//!
//! ## Fallbacks
//!
//! A URL that resolves to nothing can name another URL to try instead
//! with the `route_fallback_url` parameter:
//!
//! ```
//! use oxide_deeplink::{OpenOptions, Param, Router};
//!
//! let router = Router::new();
//! router.register_action("home", |_: &Param| {}).unwrap();
//!
//! let opened = router
//!     .try_open("myapp://gone?route_fallback_url=myapp%3A%2F%2Fhome", OpenOptions::new())
//!     .unwrap();
//! assert_eq!(opened.url.host(), "home");
//! assert_eq!(opened.fallbacks.len(), 1);
//! ```

mod config;
mod delegate;
mod error;
mod intercept;
mod key;
mod notification;
mod page;
mod param;
mod registry;
mod router;
mod url;

pub use config::{RouterConfig, DEFAULT_MAX_HOPS};
pub use delegate::RouterDelegate;
pub use error::{ConfigError, RegistrationError, Result, RouteError};
pub use key::{RouteKey, DEFAULT_SCHEME};
pub use notification::{NotificationCenter, RouteEvent, SubscriptionId};
pub use page::{
    OpenStyle, Page, PageCatalog, PageFactory, PageRef, PageRoute, PresentationStyle, Presenter,
    TransitionExecutor, UserTransition,
};
pub use param::{
    value_as_bool, value_as_i64, value_as_string, Param, UserInfo, FALLBACK_URL_KEY,
    NO_ANIMATION_KEY,
};
pub use registry::Action;
pub use router::{Completion, OpenOptions, Opened, Router};
pub use url::{IntoUrl, ParsedUrl};
