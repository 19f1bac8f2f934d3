//! Route table mapping keys to actions and page factories.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::error::{RegistrationError, Result};
use crate::key::RouteKey;
use crate::page::PageFactory;
use crate::param::Param;

/// A side-effecting callback bound to a route.
pub type Action = Arc<dyn Fn(&Param) + Send + Sync>;

/// What a route key resolves to.
#[derive(Clone)]
pub(crate) enum Handler {
    /// A callback, invoked and discarded.
    Action(Action),
    /// A factory producing a presentable page.
    Page(Arc<dyn PageFactory>),
}

impl Handler {
    /// Returns a human-readable kind name.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Action(_) => "action",
            Self::Page(_) => "page",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Default)]
struct Tables {
    actions: HashMap<RouteKey, Action>,
    pages: HashMap<RouteKey, Arc<dyn PageFactory>>,
}

impl Tables {
    /// Rejects any key that is already bound, whatever its kind.
    fn check_vacant(&self, key: &RouteKey, registering: &'static str) -> Result<()> {
        let existing = if self.actions.contains_key(key) {
            "action"
        } else if self.pages.contains_key(key) {
            "page"
        } else {
            return Ok(());
        };

        let err = if existing == registering {
            RegistrationError::AlreadyRegistered {
                key: key.to_string(),
            }
        } else {
            RegistrationError::Conflict {
                key: key.to_string(),
                existing,
            }
        };
        error!(key = %key, existing, registering, "Route registration rejected");
        Err(err)
    }
}

/// Thread-safe table of actions and pages.
///
/// Both tables sit behind a single lock so the uniqueness check spans
/// them atomically. A key is bound at most once, to either an action or a
/// page; re-registration fails instead of overwriting.
#[derive(Default)]
pub(crate) struct Registry {
    tables: RwLock<Tables>,
}

impl Registry {
    /// Binds an action to a key.
    pub(crate) fn register_action(&self, key: RouteKey, action: Action) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_vacant(&key, "action")?;
        debug!(key = %key, "Registered action");
        tables.actions.insert(key, action);
        Ok(())
    }

    /// Binds a page factory to a key.
    pub(crate) fn register_page(&self, key: RouteKey, factory: Arc<dyn PageFactory>) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_vacant(&key, "page")?;
        debug!(key = %key, "Registered page");
        tables.pages.insert(key, factory);
        Ok(())
    }

    /// Removes an action binding. No-op if the key is not an action.
    pub(crate) fn unregister_action(&self, key: &RouteKey) -> Option<Action> {
        self.tables.write().actions.remove(key)
    }

    /// Removes a page binding. No-op if the key is not a page.
    pub(crate) fn unregister_page(&self, key: &RouteKey) -> Option<Arc<dyn PageFactory>> {
        self.tables.write().pages.remove(key)
    }

    /// Looks up the handler bound to a key.
    pub(crate) fn resolve(&self, key: &RouteKey) -> Option<Handler> {
        let tables = self.tables.read();
        tables
            .actions
            .get(key)
            .map(|a| Handler::Action(Arc::clone(a)))
            .or_else(|| tables.pages.get(key).map(|p| Handler::Page(Arc::clone(p))))
    }

    /// Looks up an action.
    pub(crate) fn action(&self, key: &RouteKey) -> Option<Action> {
        self.tables.read().actions.get(key).cloned()
    }

    /// Looks up a page factory.
    pub(crate) fn page(&self, key: &RouteKey) -> Option<Arc<dyn PageFactory>> {
        self.tables.read().pages.get(key).cloned()
    }

    /// Returns whether anything is bound to a key.
    pub(crate) fn contains(&self, key: &RouteKey) -> bool {
        let tables = self.tables.read();
        tables.actions.contains_key(key) || tables.pages.contains_key(key)
    }
}
