//! Pages, page factories and the presenter seam.
//!
//! The router never draws anything. It builds a page through a registered
//! [`PageFactory`] and hands it to a [`Presenter`], which wraps whatever UI
//! toolkit the host application uses.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::param::Param;
use crate::url::ParsedUrl;

/// How a modally presented page covers the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationStyle {
    /// Covers the whole screen.
    #[default]
    FullScreen,
    /// A sheet that partially covers the presenting page.
    PageSheet,
    /// A centered form sheet.
    FormSheet,
    /// Covers the presenting page's context only.
    CurrentContext,
    /// Covers the screen without removing the presenting page.
    OverFullScreen,
    /// Lets the toolkit decide.
    Automatic,
}

/// Whether a page is pushed onto a stack or presented modally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenStyle {
    /// Push onto the current navigation stack.
    #[default]
    Push,
    /// Present modally with the given style.
    Present(PresentationStyle),
}

/// A presentable UI unit produced by a [`PageFactory`].
pub trait Page: Send + Sync + 'static {
    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Open style to use when this page is opened without an explicit one.
    fn preferred_open_style(&self) -> Option<OpenStyle> {
        None
    }
}

impl dyn Page {
    /// Downcasts to a concrete page type.
    pub fn downcast_ref<T: Page>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

impl fmt::Debug for dyn Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("preferred_open_style", &self.preferred_open_style())
            .finish_non_exhaustive()
    }
}

/// Shared handle to a constructed page.
pub type PageRef = Arc<dyn Page>;

/// Builds pages for a route.
pub trait PageFactory: Send + Sync {
    /// Constructs the page. `None` means construction failed.
    fn make(&self, param: &Param) -> Option<PageRef>;

    /// Alternate destination to open instead of constructing this page.
    ///
    /// Consulted on every dispatch, before [`make`](Self::make).
    fn redirect_url(&self, _param: &Param) -> Option<ParsedUrl> {
        None
    }
}

impl<F> PageFactory for F
where
    F: Fn(&Param) -> Option<PageRef> + Send + Sync,
{
    fn make(&self, param: &Param) -> Option<PageRef> {
        self(param)
    }
}

type MakeFn = dyn Fn(&Param) -> Option<PageRef> + Send + Sync;
type RedirectFn = dyn Fn(&Param) -> Option<ParsedUrl> + Send + Sync;

/// A [`PageFactory`] assembled from closures.
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use oxide_deeplink::{Page, PageFactory, PageRoute, Param, ParsedUrl};
///
/// struct Login;
/// impl Page for Login {
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let route = PageRoute::new(|_| Some(Arc::new(Login) as _))
///     .redirect(|p| p.get_bool("logged_out")
///         .filter(|out| *out)
///         .and_then(|_| ParsedUrl::parse("myapp://login")));
///
/// let param = Param::from_url(ParsedUrl::parse("myapp://profile?logged_out=1").unwrap());
/// assert_eq!(route.redirect_url(&param).unwrap().host(), "login");
/// ```
pub struct PageRoute {
    make: Box<MakeFn>,
    redirect: Option<Box<RedirectFn>>,
}

impl PageRoute {
    /// Creates a route from a page constructor.
    pub fn new<F>(make: F) -> Self
    where
        F: Fn(&Param) -> Option<PageRef> + Send + Sync + 'static,
    {
        Self {
            make: Box::new(make),
            redirect: None,
        }
    }

    /// Sets the redirect hook.
    #[must_use]
    pub fn redirect<F>(mut self, redirect: F) -> Self
    where
        F: Fn(&Param) -> Option<ParsedUrl> + Send + Sync + 'static,
    {
        self.redirect = Some(Box::new(redirect));
        self
    }
}

impl PageFactory for PageRoute {
    fn make(&self, param: &Param) -> Option<PageRef> {
        (self.make)(param)
    }

    fn redirect_url(&self, param: &Param) -> Option<ParsedUrl> {
        self.redirect.as_ref().and_then(|r| r(param))
    }
}

/// Page factories looked up by name at configuration time.
///
/// Bootstrap code fills the catalog once; configuration then refers to
/// pages by name via [`Router::register_page_names`](crate::Router::register_page_names).
#[derive(Default)]
pub struct PageCatalog {
    factories: HashMap<String, Arc<dyn PageFactory>>,
}

impl PageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named factory, replacing any previous one with that name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, factory: impl PageFactory + 'static) -> Self {
        self.insert(name, factory);
        self
    }

    /// Adds a named factory, replacing any previous one with that name.
    pub fn insert(&mut self, name: impl Into<String>, factory: impl PageFactory + 'static) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Looks up a factory by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn PageFactory>> {
        self.factories.get(name).cloned()
    }

    /// Returns whether a name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

/// Caller-supplied transition: receives the page being left (if the
/// presenter knows it) and the page to show.
pub type UserTransition = Arc<dyn Fn(Option<&PageRef>, &PageRef) -> bool + Send + Sync>;

/// Who performs the final page transition.
#[derive(Clone, Default)]
pub enum TransitionExecutor {
    /// The [`Presenter`] performs its default push or present.
    #[default]
    Router,
    /// The caller's closure performs the transition.
    User(UserTransition),
    /// The router delegate's `route_transition` performs the transition.
    Delegate,
}

impl TransitionExecutor {
    /// Wraps a closure as a user transition.
    pub fn user<F>(transition: F) -> Self
    where
        F: Fn(Option<&PageRef>, &PageRef) -> bool + Send + Sync + 'static,
    {
        Self::User(Arc::new(transition))
    }
}

impl fmt::Debug for TransitionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router => f.write_str("Router"),
            Self::User(_) => f.write_str("User"),
            Self::Delegate => f.write_str("Delegate"),
        }
    }
}

/// External UI collaborator that shows constructed pages.
///
/// Returning `false` means no transition happened, e.g. there is no
/// navigation stack to push onto.
pub trait Presenter: Send + Sync {
    /// Pushes `page` onto the current navigation stack.
    fn push(&self, page: &PageRef, animated: bool) -> bool;

    /// Presents `page` modally.
    fn present(&self, page: &PageRef, animated: bool, style: PresentationStyle) -> bool;

    /// The page a push or present would start from. Passed to user and
    /// delegate transitions.
    fn top_page(&self) -> Option<PageRef> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank(&'static str);

    impl Page for Blank {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn param(url: &str) -> Param {
        Param::from_url(ParsedUrl::parse(url).unwrap())
    }

    #[test]
    fn test_closure_factory() {
        let factory = |p: &Param| -> Option<PageRef> {
            p.get_str("name").map(|_| Arc::new(Blank("user")) as PageRef)
        };
        assert!(factory.make(&param("myapp://user?name=apple")).is_some());
        assert!(factory.make(&param("myapp://user")).is_none());
        assert!(factory.redirect_url(&param("myapp://user")).is_none());
    }

    #[test]
    fn test_downcast() {
        let page: PageRef = Arc::new(Blank("user"));
        assert_eq!(page.downcast_ref::<Blank>().map(|b| b.0), Some("user"));
        assert!(page.preferred_open_style().is_none());
    }

    #[test]
    fn test_catalog() {
        let catalog = PageCatalog::new().with("UserPage", |_: &Param| -> Option<PageRef> {
            Some(Arc::new(Blank("user")))
        });
        assert!(catalog.contains("UserPage"));
        assert!(catalog.get("Missing").is_none());
        assert!(catalog.get("UserPage").unwrap().make(&param("myapp://user")).is_some());
    }

    #[test]
    fn test_open_style_serde() {
        let style: OpenStyle = serde_json::from_str(r#"{"present":"page_sheet"}"#).unwrap();
        assert_eq!(style, OpenStyle::Present(PresentationStyle::PageSheet));
        let style: OpenStyle = serde_json::from_str(r#""push""#).unwrap();
        assert_eq!(style, OpenStyle::Push);
    }
}
