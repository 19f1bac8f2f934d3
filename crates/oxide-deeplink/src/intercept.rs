//! Per-route interceptor chains.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::key::RouteKey;
use crate::param::Param;

/// A predicate run before dispatch. Returning `false` vetoes the route.
pub(crate) type Interceptor = Arc<dyn Fn(&Param) -> bool + Send + Sync>;

/// Ordered interceptors keyed by route.
#[derive(Default)]
pub(crate) struct InterceptorChain {
    chains: RwLock<HashMap<RouteKey, Vec<Interceptor>>>,
}

impl InterceptorChain {
    /// Appends an interceptor to the chain of `key`.
    pub(crate) fn add(&self, key: RouteKey, interceptor: Interceptor) {
        debug!(key = %key, "Added interceptor");
        self.chains.write().entry(key).or_default().push(interceptor);
    }

    /// Removes every interceptor registered for `key`.
    pub(crate) fn remove(&self, key: &RouteKey) {
        self.chains.write().remove(key);
    }

    /// Runs the chain of `key` against `param`.
    ///
    /// Every predicate runs, in registration order, even after one has
    /// returned `false`; the result is their conjunction. A key without
    /// interceptors is allowed.
    pub(crate) fn allows(&self, key: &RouteKey, param: &Param) -> bool {
        // Snapshot so predicates run without the lock held.
        let chain = match self.chains.read().get(key) {
            Some(chain) => chain.clone(),
            None => return true,
        };
        chain
            .iter()
            .fold(true, |allowed, interceptor| interceptor(param) && allowed)
    }
}
