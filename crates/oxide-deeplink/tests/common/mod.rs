#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use oxide_deeplink::{
    Page, PageRef, Param, ParsedUrl, PresentationStyle, Presenter, RouterDelegate, UserInfo,
};
use parking_lot::Mutex;
use serde_json::Value;

/// A page that remembers the parameters it was built from.
pub struct TestPage {
    pub name: &'static str,
    pub param: Param,
}

impl Page for TestPage {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A page factory for `name` that always succeeds.
pub fn page_factory(name: &'static str) -> impl Fn(&Param) -> Option<PageRef> + Send + Sync {
    move |param: &Param| {
        Some(Arc::new(TestPage {
            name,
            param: param.clone(),
        }) as PageRef)
    }
}

pub fn as_test_page(page: &PageRef) -> &TestPage {
    page.downcast_ref::<TestPage>()
        .unwrap_or_else(|| panic!("Expected TestPage, got {page:?}"))
}

pub fn user_info(pairs: &[(&str, Value)]) -> UserInfo {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Push { page: &'static str, animated: bool },
    Present {
        page: &'static str,
        animated: bool,
        style: PresentationStyle,
    },
}

/// Records every push and present; accepts them unless told otherwise.
#[derive(Default)]
pub struct RecordingPresenter {
    pub shown: Mutex<Vec<Shown>>,
    pub refuse_push: bool,
    pub refuse_present: bool,
    pub top: Mutex<Option<PageRef>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing_push() -> Arc<Self> {
        Arc::new(Self {
            refuse_push: true,
            ..Self::default()
        })
    }

    pub fn refusing_all() -> Arc<Self> {
        Arc::new(Self {
            refuse_push: true,
            refuse_present: true,
            ..Self::default()
        })
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn push(&self, page: &PageRef, animated: bool) -> bool {
        if self.refuse_push {
            return false;
        }
        self.shown.lock().push(Shown::Push {
            page: as_test_page(page).name,
            animated,
        });
        true
    }

    fn present(&self, page: &PageRef, animated: bool, style: PresentationStyle) -> bool {
        if self.refuse_present {
            return false;
        }
        self.shown.lock().push(Shown::Present {
            page: as_test_page(page).name,
            animated,
            style,
        });
        true
    }

    fn top_page(&self) -> Option<PageRef> {
        self.top.lock().clone()
    }
}

/// Logs every callback as `"<hook> <url>"`.
#[derive(Default)]
pub struct RecordingDelegate {
    pub events: Mutex<Vec<String>>,
    /// Hosts whose URLs `will_open` vetoes.
    pub veto_hosts: Vec<&'static str>,
    /// Rewrites from one URL string to another in `will_open`.
    pub rewrites: Vec<(&'static str, &'static str)>,
    pub transition_result: bool,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn log(&self, hook: &str, url: &ParsedUrl) {
        self.events.lock().push(format!("{hook} {url}"));
    }
}

impl RouterDelegate for RecordingDelegate {
    fn will_open(&self, url: &ParsedUrl, _user_info: &UserInfo) -> Option<ParsedUrl> {
        self.log("will_open", url);
        if self.veto_hosts.iter().any(|host| *host == url.host()) {
            return None;
        }
        match self.rewrites.iter().find(|(from, _)| *from == url.as_str()) {
            Some((_, to)) => ParsedUrl::parse(to),
            None => Some(url.clone()),
        }
    }

    fn did_open(&self, url: &ParsedUrl, _user_info: &UserInfo) {
        self.log("did_open", url);
    }

    fn did_fail_to_open(&self, url: &ParsedUrl, _user_info: &UserInfo) {
        self.log("did_fail_to_open", url);
    }

    fn did_fallback_to(&self, url: &ParsedUrl, _user_info: &UserInfo) {
        self.log("did_fallback_to", url);
    }

    fn route_transition(&self, param: &Param, _from: Option<&PageRef>, to: &PageRef) -> bool {
        self.events.lock().push(format!(
            "route_transition {} {}",
            param.route_key(),
            as_test_page(to).name
        ));
        self.transition_result
    }
}
