//! Main router implementation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::RouterConfig;
use crate::delegate::RouterDelegate;
use crate::error::{RegistrationError, Result, RouteError};
use crate::intercept::InterceptorChain;
use crate::key::RouteKey;
use crate::notification::{NotificationCenter, RouteEvent};
use crate::page::{
    OpenStyle, PageCatalog, PageFactory, PageRef, PresentationStyle, Presenter,
    TransitionExecutor,
};
use crate::param::{Param, UserInfo};
use crate::registry::{Action, Handler, Registry};
use crate::url::{IntoUrl, ParsedUrl};

/// Called once with the outcome of a dispatch call.
pub type Completion = Box<dyn FnOnce(bool) + Send>;

/// Per-call options for `open`, `push` and `present`.
pub struct OpenOptions {
    user_info: UserInfo,
    animated: bool,
    executor: TransitionExecutor,
    presentation_style: Option<PresentationStyle>,
    completion: Option<Completion>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            user_info: UserInfo::new(),
            animated: true,
            executor: TransitionExecutor::Router,
            presentation_style: None,
            completion: None,
        }
    }
}

impl OpenOptions {
    /// Creates default options: no user info, animated, router transition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the user info.
    #[must_use]
    pub fn user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = user_info;
        self
    }

    /// Adds one user info entry.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_info.insert(key.into(), value.into());
        self
    }

    /// Sets the animation default. The `route_no_animation` parameter
    /// overrides it.
    #[must_use]
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Selects who performs the transition. Used by `push` and `present`.
    #[must_use]
    pub fn executor(mut self, executor: TransitionExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Sets the presentation style. Used by `present`.
    #[must_use]
    pub fn presentation_style(mut self, style: PresentationStyle) -> Self {
        self.presentation_style = Some(style);
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn completion<F>(mut self, completion: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.completion = Some(Box::new(completion));
        self
    }
}

impl From<UserInfo> for OpenOptions {
    fn from(user_info: UserInfo) -> Self {
        Self::new().user_info(user_info)
    }
}

/// Outcome of a successful dispatch call.
#[derive(Debug, Clone)]
pub struct Opened {
    /// URL of the hop that was finally opened.
    pub url: ParsedUrl,
    /// Parameters handed to the handler.
    pub param: Param,
    /// The constructed page, or `None` when an action ran.
    pub page: Option<PageRef>,
    /// Fallback URLs followed on the way, in order.
    pub fallbacks: Vec<ParsedUrl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Open,
    Push,
    Present(Option<PresentationStyle>),
}

/// State carried across redirect and fallback hops of one call.
struct Dispatch {
    mode: Mode,
    animated: bool,
    executor: TransitionExecutor,
    user_info: UserInfo,
    config: RouterConfig,
    delegate: Option<Arc<dyn RouterDelegate>>,
    hops: usize,
    fallbacks: Vec<ParsedUrl>,
}

struct Failure {
    error: RouteError,
    url: ParsedUrl,
}

impl Failure {
    fn new(error: RouteError, url: ParsedUrl) -> Self {
        Self { error, url }
    }
}

/// Resolves URLs to registered actions and pages and opens them.
///
/// A router is an ordinary value: create one at startup and share it as
/// `Arc<Router>`. Every method takes `&self`; registration and dispatch
/// may happen on different threads. No lock is held while handlers,
/// interceptors, delegates or presenters run, so they may call back into
/// the router.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use oxide_deeplink::{OpenOptions, Router};
///
/// let router = Router::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
/// router
///     .register_action("abc_action", move |_| flag.store(true, Ordering::SeqCst))
///     .unwrap();
///
/// assert!(router.open("myapp://abc_action?id=1", OpenOptions::new()));
/// assert!(ran.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct Router {
    config: RwLock<RouterConfig>,
    registry: Registry,
    interceptors: InterceptorChain,
    notifications: NotificationCenter,
    delegate: RwLock<Option<Arc<dyn RouterDelegate>>>,
    presenter: RwLock<Option<Arc<dyn Presenter>>>,
}

impl Router {
    /// Creates a router with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with the given configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config: RwLock::new(config),
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Returns a snapshot of the configuration.
    pub fn config(&self) -> RouterConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration.
    pub fn set_config(&self, config: RouterConfig) {
        *self.config.write() = config;
    }

    /// Sets the scheme allow-list. Empty allows every scheme.
    pub fn set_allowed_schemes<I, S>(&self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.write().allowed_schemes = schemes.into_iter().map(Into::into).collect();
    }

    /// Sets the host used to scope path-only route keys.
    ///
    /// Keys are scoped when registered, so set the host before registering.
    pub fn set_host(&self, host: impl Into<String>) {
        self.config.write().host = host.into();
    }

    /// Sets the default open style for pages.
    pub fn set_preferred_open_style(&self, style: OpenStyle) {
        self.config.write().preferred_open_style = style;
    }

    /// Sets the default presentation style for `present`.
    pub fn set_preferred_presentation_style(&self, style: PresentationStyle) {
        self.config.write().preferred_presentation_style = style;
    }

    /// Sets the redirect/fallback hop ceiling. `None` removes it.
    pub fn set_max_hops(&self, max_hops: Option<usize>) {
        self.config.write().max_hops = max_hops;
    }

    /// Installs the delegate, replacing any previous one.
    pub fn set_delegate(&self, delegate: Arc<dyn RouterDelegate>) {
        *self.delegate.write() = Some(delegate);
    }

    /// Removes the delegate.
    pub fn clear_delegate(&self) {
        *self.delegate.write() = None;
    }

    /// Installs the presenter that shows constructed pages.
    pub fn set_presenter(&self, presenter: Arc<dyn Presenter>) {
        *self.presenter.write() = Some(presenter);
    }

    /// Returns the notification center for will-open/did-open events.
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    fn scope(&self, key: impl Into<RouteKey>) -> RouteKey {
        key.into().scoped(&self.config.read().host)
    }

    fn key_url(&self, key: impl Into<RouteKey>) -> std::result::Result<ParsedUrl, RouteError> {
        let key = key.into();
        key.to_url(&self.config.read().host)
            .ok_or_else(|| RouteError::UnparsableUrl(key.to_string()))
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Registers an action.
    ///
    /// Fails if the key is already bound to an action or a page.
    pub fn register_action<K, F>(&self, key: K, action: F) -> Result<()>
    where
        K: Into<RouteKey>,
        F: Fn(&Param) + Send + Sync + 'static,
    {
        self.registry.register_action(self.scope(key), Arc::new(action))
    }

    /// Unregisters an action. Does nothing if the key is not an action.
    pub fn unregister_action(&self, key: impl Into<RouteKey>) {
        self.registry.unregister_action(&self.scope(key));
    }

    /// Registers a page factory.
    ///
    /// Fails if the key is already bound to an action or a page.
    pub fn register_page<K, P>(&self, key: K, factory: P) -> Result<()>
    where
        K: Into<RouteKey>,
        P: PageFactory + 'static,
    {
        self.registry.register_page(self.scope(key), Arc::new(factory))
    }

    /// Registers several page factories.
    ///
    /// Every entry is attempted; the first failure is returned.
    pub fn register_pages<I, K>(&self, pages: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Arc<dyn PageFactory>)>,
        K: Into<RouteKey>,
    {
        let mut first_err = None;
        for (key, factory) in pages {
            if let Err(err) = self.registry.register_page(self.scope(key), factory) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Registers pages by catalog name.
    ///
    /// Every entry is attempted; the first failure is returned. Unknown
    /// names fail with [`RegistrationError::UnknownPageName`].
    pub fn register_page_names<I, K, N>(&self, catalog: &PageCatalog, pages: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<RouteKey>,
        N: AsRef<str>,
    {
        let mut first_err = None;
        for (key, name) in pages {
            let name = name.as_ref();
            let result = match catalog.get(name) {
                Some(factory) => self.registry.register_page(self.scope(key), factory),
                None => {
                    error!(name, "Page not found in catalog");
                    Err(RegistrationError::UnknownPageName {
                        name: name.to_string(),
                    })
                }
            };
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Unregisters a page. Does nothing if the key is not a page.
    pub fn unregister_page(&self, key: impl Into<RouteKey>) {
        self.registry.unregister_page(&self.scope(key));
    }

    /// Appends an interceptor for a key. Returning `false` blocks dispatch.
    pub fn add_interceptor<K, F>(&self, key: K, interceptor: F)
    where
        K: Into<RouteKey>,
        F: Fn(&Param) -> bool + Send + Sync + 'static,
    {
        self.interceptors.add(self.scope(key), Arc::new(interceptor));
    }

    /// Removes all interceptors for a key.
    pub fn remove_interceptor(&self, key: impl Into<RouteKey>) {
        self.interceptors.remove(&self.scope(key));
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    /// Returns whether the URL passes the scheme filter and resolves to a
    /// registered action or page.
    pub fn can_open(&self, url: impl IntoUrl) -> bool {
        url.into_url().is_ok_and(|url| {
            self.config.read().is_scheme_allowed(url.scheme())
                && self.registry.contains(&RouteKey::from_url(&url))
        })
    }

    /// Key variant of [`can_open`](Self::can_open).
    pub fn can_open_key(&self, key: impl Into<RouteKey>) -> bool {
        self.key_url(key).is_ok_and(|url| self.can_open(url))
    }

    /// Constructs the page for a URL without presenting it.
    pub fn page_for(&self, url: impl IntoUrl, user_info: UserInfo) -> Option<PageRef> {
        let url = url.into_url().ok()?;
        if !self.can_open(&url) {
            return None;
        }
        let param = Param::new(url, user_info);
        self.registry.page(&param.route_key())?.make(&param)
    }

    /// Key variant of [`page_for`](Self::page_for).
    pub fn page_for_key(&self, key: impl Into<RouteKey>, user_info: UserInfo) -> Option<PageRef> {
        self.page_for(self.key_url(key).ok()?, user_info)
    }

    /// Returns the action registered for a URL.
    pub fn action_for(&self, url: impl IntoUrl) -> Option<Action> {
        let url = url.into_url().ok()?;
        if !self.can_open(&url) {
            return None;
        }
        self.registry.action(&RouteKey::from_url(&url))
    }

    /// Key variant of [`action_for`](Self::action_for).
    pub fn action_for_key(&self, key: impl Into<RouteKey>) -> Option<Action> {
        self.action_for(self.key_url(key).ok()?)
    }

    /// Runs an action directly by key.
    ///
    /// Bypasses the scheme filter, delegate, interceptors and
    /// notifications.
    pub fn execute_action(&self, key: impl Into<RouteKey>, options: OpenOptions) -> bool {
        let key = self.scope(key);
        let OpenOptions {
            user_info,
            completion,
            ..
        } = options;

        let found = self
            .registry
            .action(&key)
            .and_then(|action| self.key_url(&key).ok().map(|url| (action, url)));
        let Some((action, url)) = found else {
            warn!(key = %key, "No action registered");
            if let Some(completion) = completion {
                completion(false);
            }
            return false;
        };

        action(&Param::new(url, user_info));
        if let Some(completion) = completion {
            completion(true);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------

    /// Opens a URL: runs its action, or constructs its page and opens it
    /// with the page's preferred open style (else the router's).
    pub fn open(&self, url: impl IntoUrl, options: OpenOptions) -> bool {
        self.try_open(url, options).is_ok()
    }

    /// Like [`open`](Self::open), returning why it failed.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] of the hop that ended the call.
    pub fn try_open(
        &self,
        url: impl IntoUrl,
        options: OpenOptions,
    ) -> std::result::Result<Opened, RouteError> {
        self.dispatch(url.into_url(), Mode::Open, options)
    }

    /// Opens a URL given as a route key.
    pub fn open_key(&self, key: impl Into<RouteKey>, options: OpenOptions) -> bool {
        self.dispatch(self.key_url(key), Mode::Open, options).is_ok()
    }

    /// Pushes the page for a URL. Actions are not run.
    pub fn push(&self, url: impl IntoUrl, options: OpenOptions) -> bool {
        self.try_push(url, options).is_ok()
    }

    /// Like [`push`](Self::push), returning why it failed.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] of the hop that ended the call.
    pub fn try_push(
        &self,
        url: impl IntoUrl,
        options: OpenOptions,
    ) -> std::result::Result<Opened, RouteError> {
        self.dispatch(url.into_url(), Mode::Push, options)
    }

    /// Pushes the page for a route key.
    pub fn push_key(&self, key: impl Into<RouteKey>, options: OpenOptions) -> bool {
        self.dispatch(self.key_url(key), Mode::Push, options).is_ok()
    }

    /// Presents the page for a URL modally. Actions are not run.
    pub fn present(&self, url: impl IntoUrl, options: OpenOptions) -> bool {
        self.try_present(url, options).is_ok()
    }

    /// Like [`present`](Self::present), returning why it failed.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] of the hop that ended the call.
    pub fn try_present(
        &self,
        url: impl IntoUrl,
        options: OpenOptions,
    ) -> std::result::Result<Opened, RouteError> {
        let style = options.presentation_style;
        self.dispatch(url.into_url(), Mode::Present(style), options)
    }

    /// Presents the page for a route key.
    pub fn present_key(&self, key: impl Into<RouteKey>, options: OpenOptions) -> bool {
        let style = options.presentation_style;
        self.dispatch(self.key_url(key), Mode::Present(style), options)
            .is_ok()
    }

    /// Opens an already constructed page.
    ///
    /// `Push` falls back to presenting and `Present` falls back to pushing.
    pub fn open_page(&self, page: &PageRef, animated: bool, style: Option<OpenStyle>) -> bool {
        let Some(presenter) = self.presenter.read().clone() else {
            return false;
        };
        let config = self.config.read();
        let style = style
            .or_else(|| page.preferred_open_style())
            .unwrap_or(config.preferred_open_style);
        let fallback_style = config.preferred_presentation_style;
        drop(config);
        open_with_style(presenter.as_ref(), page, animated, style, fallback_style)
    }

    fn dispatch(
        &self,
        url: std::result::Result<ParsedUrl, RouteError>,
        mode: Mode,
        options: OpenOptions,
    ) -> std::result::Result<Opened, RouteError> {
        let OpenOptions {
            user_info,
            animated,
            executor,
            completion,
            ..
        } = options;
        let finish = |success: bool| {
            if let Some(completion) = completion {
                completion(success);
            }
        };

        let url = match url {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Failed to open url");
                finish(false);
                return Err(err);
            }
        };

        let mut state = Dispatch {
            mode,
            animated,
            executor,
            user_info,
            config: self.config(),
            delegate: self.delegate.read().clone(),
            hops: 0,
            fallbacks: Vec::new(),
        };

        match self.hop(url, &mut state) {
            Ok(mut opened) => {
                opened.fallbacks = std::mem::take(&mut state.fallbacks);
                if let Some(delegate) = &state.delegate {
                    for fallback in &opened.fallbacks {
                        delegate.did_fallback_to(fallback, &state.user_info);
                    }
                    delegate.did_open(&opened.url, &state.user_info);
                }
                self.notifications.post(RouteEvent::DidOpen, &opened.param);
                info!(url = %opened.url, hops = state.hops, "Opened url");
                finish(true);
                Ok(opened)
            }
            Err(Failure { error, url }) => {
                warn!(url = %url, error = %error, "Failed to open url");
                if let Some(delegate) = &state.delegate {
                    delegate.did_fail_to_open(&url, &state.user_info);
                }
                finish(false);
                Err(error)
            }
        }
    }

    fn hop(&self, mut url: ParsedUrl, state: &mut Dispatch) -> std::result::Result<Opened, Failure> {
        debug!(url = %url, hop = state.hops, "Resolving url");

        if !state.config.is_scheme_allowed(url.scheme()) {
            let scheme = url.scheme().to_string();
            return Err(Failure::new(RouteError::SchemeNotAllowed { scheme }, url));
        }

        if let Some(delegate) = state.delegate.clone() {
            match delegate.will_open(&url, &state.user_info) {
                Some(rewritten) => url = rewritten,
                None => {
                    let vetoed = url.to_string();
                    return Err(Failure::new(RouteError::VetoedByDelegate { url: vetoed }, url));
                }
            }
        }

        let param = Param::new(url.clone(), state.user_info.clone());
        let key = param.route_key();

        if !self.interceptors.allows(&key, &param) {
            let key = key.to_string();
            return Err(Failure::new(RouteError::Intercepted { key }, url));
        }

        match self.registry.resolve(&key) {
            Some(Handler::Action(action)) if state.mode == Mode::Open => {
                self.notifications.post(RouteEvent::WillOpen, &param);
                action(&param);
                Ok(Opened {
                    url,
                    param,
                    page: None,
                    fallbacks: Vec::new(),
                })
            }
            Some(Handler::Page(factory)) => {
                if let Some(redirect) = factory.redirect_url(&param) {
                    debug!(from = %url, to = %redirect, "Following page redirect");
                    return self.follow(redirect, &url, state);
                }
                let Some(page) = factory.make(&param) else {
                    let key = key.to_string();
                    return Err(Failure::new(RouteError::HandlerConstructionFailed { key }, url));
                };
                self.notifications.post(RouteEvent::WillOpen, &param);
                if self.transition(&page, &param, state) {
                    Ok(Opened {
                        url,
                        param,
                        page: Some(page),
                        fallbacks: Vec::new(),
                    })
                } else {
                    let key = key.to_string();
                    Err(Failure::new(RouteError::PresentationFailed { key }, url))
                }
            }
            _ => match param.fallback_url() {
                Some(fallback) => {
                    debug!(from = %url, to = %fallback, "Following fallback url");
                    state.fallbacks.push(fallback.clone());
                    self.follow(fallback, &url, state)
                }
                None => {
                    let key = key.to_string();
                    Err(Failure::new(RouteError::RouteNotFound { key }, url))
                }
            },
        }
    }

    fn follow(
        &self,
        next: ParsedUrl,
        current: &ParsedUrl,
        state: &mut Dispatch,
    ) -> std::result::Result<Opened, Failure> {
        state.hops += 1;
        if let Some(max) = state.config.max_hops {
            if state.hops > max {
                return Err(Failure::new(
                    RouteError::RedirectLoopDetected { hops: max },
                    current.clone(),
                ));
            }
        }
        self.hop(next, state)
    }

    fn transition(&self, page: &PageRef, param: &Param, state: &Dispatch) -> bool {
        let presenter = self.presenter.read().clone();
        let animated = param.animated().unwrap_or(state.animated);

        let style = match state.mode {
            Mode::Open => {
                let Some(presenter) = presenter else {
                    return false;
                };
                let style = page
                    .preferred_open_style()
                    .unwrap_or(state.config.preferred_open_style);
                return open_with_style(
                    presenter.as_ref(),
                    page,
                    animated,
                    style,
                    state.config.preferred_presentation_style,
                );
            }
            Mode::Push => OpenStyle::Push,
            Mode::Present(style) => OpenStyle::Present(
                style.unwrap_or(state.config.preferred_presentation_style),
            ),
        };

        match &state.executor {
            TransitionExecutor::Router => presenter.is_some_and(|presenter| match style {
                OpenStyle::Push => presenter.push(page, animated),
                OpenStyle::Present(style) => presenter.present(page, animated, style),
            }),
            TransitionExecutor::User(transition) => {
                let from = presenter.and_then(|p| p.top_page());
                transition(from.as_ref(), page)
            }
            TransitionExecutor::Delegate => {
                let from = presenter.and_then(|p| p.top_page());
                state
                    .delegate
                    .as_ref()
                    .is_some_and(|delegate| delegate.route_transition(param, from.as_ref(), page))
            }
        }
    }
}

fn open_with_style(
    presenter: &dyn Presenter,
    page: &PageRef,
    animated: bool,
    style: OpenStyle,
    fallback_style: PresentationStyle,
) -> bool {
    match style {
        OpenStyle::Push => {
            presenter.push(page, animated) || presenter.present(page, animated, fallback_style)
        }
        OpenStyle::Present(style) => {
            presenter.present(page, animated, style) || presenter.push(page, animated)
        }
    }
}
