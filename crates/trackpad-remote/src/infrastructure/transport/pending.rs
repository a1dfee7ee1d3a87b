//! Pending-request bookkeeping for the HTTP fallback.
//!
//! Every fallback request registers a fresh id under its [`Category`] and
//! holds a [`PendingGuard`]; dropping the guard (request completed, failed or
//! was abandoned) removes the id again.  A capped category refuses new
//! requests while more than `cap` of its requests are in flight.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use trackpad_core::protocol::messages::Category;
use uuid::Uuid;

use crate::application::dispatch::TransportError;

/// Default number of in-flight requests a capped category may exceed.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 5;

#[derive(Debug)]
pub struct PendingRequests {
    inner: Mutex<HashMap<Category, HashSet<Uuid>>>,
    cap: usize,
}

impl PendingRequests {
    pub fn new(cap: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(HashMap::new()),
            cap,
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Category, HashSet<Uuid>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new request of `category`.
    ///
    /// # Errors
    ///
    /// [`TransportError::AdmissionRejected`] when `category` is capped and
    /// more than `cap` of its requests are already in flight.
    pub fn admit(self: &Arc<Self>, category: Category) -> Result<PendingGuard, TransportError> {
        let mut map = self.lock();
        let set = map.entry(category).or_default();
        if category.is_capped() && set.len() > self.cap {
            return Err(TransportError::AdmissionRejected {
                category,
                in_flight: set.len(),
            });
        }
        let id = Uuid::new_v4();
        set.insert(id);
        Ok(PendingGuard {
            pending: Arc::clone(self),
            category,
            id,
        })
    }

    pub fn in_flight(&self, category: Category) -> usize {
        self.lock().get(&category).map_or(0, HashSet::len)
    }

    pub fn total(&self) -> usize {
        self.lock().values().map(HashSet::len).sum()
    }

    fn release(&self, category: Category, id: Uuid) {
        let mut map = self.lock();
        if let Some(set) = map.get_mut(&category) {
            set.remove(&id);
            if set.is_empty() {
                map.remove(&category);
            }
        }
    }
}

/// Keeps one request registered until dropped.
#[derive(Debug)]
pub struct PendingGuard {
    pending: Arc<PendingRequests>,
    category: Category,
    id: Uuid,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.release(self.category, self.id);
    }
}
