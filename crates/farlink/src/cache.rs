//! # Identity Cache
//!
//! Side table behind the cross-call persistence guarantee: when the remote
//! host returns an identity the factory has wrapped before, and that adapter
//! is still reachable, the same adapter instance is handed back instead of a
//! fresh wrapper.
//!
//! Entries hold weak handles only, so the table never keeps an adapter
//! alive; dead entries are pruned opportunistically when a lookup lands on
//! them, plus on explicit [`IdentityCache::prune`].

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::adapter::AdapterObject;
use crate::value::RemoteId;

pub(crate) struct IdentityCache {
    entries: DashMap<RemoteId, Weak<dyn AdapterObject>>,
}

impl IdentityCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the live adapter cached for `id`, or wraps a fresh one and
    /// records it. The entry lock is held across `wrap`, so two threads
    /// racing on the same identity still observe a single adapter.
    pub(crate) fn lookup_or_wrap(
        &self,
        id: RemoteId,
        wrap: impl FnOnce() -> Arc<dyn AdapterObject>,
    ) -> Arc<dyn AdapterObject> {
        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                if let Some(live) = occupied.get().upgrade() {
                    return live;
                }
                let fresh = wrap();
                occupied.insert(Arc::downgrade(&fresh));
                fresh
            }
            Entry::Vacant(vacant) => {
                let fresh = wrap();
                vacant.insert(Arc::downgrade(&fresh));
                fresh
            }
        }
    }

    /// Drops every entry whose adapter is gone.
    pub(crate) fn prune(&self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of entries whose adapter is still reachable.
    pub(crate) fn live(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}
