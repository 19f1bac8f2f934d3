//! Fan-out of route lifecycle events to any number of listeners.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::param::Param;

/// Broadcast route events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteEvent {
    /// Sent immediately before a resolved handler is invoked.
    WillOpen,
    /// Sent after a dispatch call succeeds.
    DidOpen,
}

impl RouteEvent {
    /// Returns the event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::WillOpen => "route_will_open",
            Self::DidOpen => "route_did_open",
        }
    }
}

/// Identifies a listener for [`NotificationCenter::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Param) + Send + Sync>;

/// Publishes [`RouteEvent`]s.
#[derive(Default)]
pub struct NotificationCenter {
    listeners: RwLock<Vec<(SubscriptionId, RouteEvent, Listener)>>,
    next_id: AtomicU64,
}

impl NotificationCenter {
    /// Creates a center with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event.
    pub fn subscribe<F>(&self, event: RouteEvent, listener: F) -> SubscriptionId
    where
        F: Fn(&Param) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, event, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(sid, _, _)| *sid != id);
        listeners.len() != before
    }

    /// Delivers `event` to its listeners in subscription order.
    pub fn post(&self, event: RouteEvent, param: &Param) {
        let targets: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        for listener in targets {
            listener(param);
        }
    }
}
