//! Subscription bookkeeping for a single session.
//!
//! Tracks which stream keys are subscribed under which ids, and whether the
//! server has acknowledged each subscribe with a RECEIPT. Both maps are
//! updated together: a key has an entry exactly when its id does.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TossError};

// ---------------------------------------------------------------------------
// Subscription ID
// ---------------------------------------------------------------------------

/// Session-local handle for one subscription. Echoed back in receipt tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a subscribe has been acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// SUBSCRIBE sent, RECEIPT not yet seen.
    Pending,
    /// RECEIPT seen.
    Confirmed,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Stream key ↔ subscription id mapping with confirmation state.
#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    ids: HashMap<String, SubscriptionId>,
    states: HashMap<SubscriptionId, SubscriptionState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next id to `stream_key` and record it as pending.
    ///
    /// Ids come from a counter that never rewinds, so an id is never handed
    /// out twice within one registry.
    pub fn allocate(&mut self, stream_key: &str) -> Result<SubscriptionId> {
        if self.ids.contains_key(stream_key) {
            return Err(TossError::AlreadySubscribed(stream_key.to_owned()));
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.ids.insert(stream_key.to_owned(), id);
        self.states.insert(id, SubscriptionState::Pending);
        Ok(id)
    }

    /// Mark `id` as acknowledged by the server.
    ///
    /// Unknown ids are an error for the caller to log; a stray or late
    /// receipt is not fatal to the session.
    pub fn mark_confirmed(&mut self, id: SubscriptionId) -> Result<()> {
        match self.states.get_mut(&id) {
            Some(state) => {
                *state = SubscriptionState::Confirmed;
                Ok(())
            }
            None => Err(TossError::UnknownSubscription(id)),
        }
    }

    /// Remove `stream_key` and its id, returning the id it held.
    pub fn release(&mut self, stream_key: &str) -> Result<SubscriptionId> {
        let id = self
            .ids
            .remove(stream_key)
            .ok_or_else(|| TossError::NotSubscribed(stream_key.to_owned()))?;
        self.states.remove(&id);
        Ok(id)
    }

    pub fn is_confirmed(&self, id: SubscriptionId) -> bool {
        self.states.get(&id) == Some(&SubscriptionState::Confirmed)
    }

    pub fn state(&self, id: SubscriptionId) -> Option<SubscriptionState> {
        self.states.get(&id).copied()
    }

    /// Id currently held by `stream_key`.
    pub fn id_of(&self, stream_key: &str) -> Option<SubscriptionId> {
        self.ids.get(stream_key).copied()
    }

    /// Subscribed stream keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
