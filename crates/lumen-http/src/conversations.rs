//! Bounded in-memory conversation history.
//!
//! A conversation is checked out for the duration of a run and is absent
//! from the cache until the lease is committed or dropped, so two requests
//! never extend the same history at once.

use lru::LruCache;
use lumen_core::Conversation;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub const DEFAULT_CONVERSATION_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conversation '{0}' already has a request in progress")]
pub struct ConversationBusy(pub String);

#[derive(Debug)]
struct StoreInner {
    cache: LruCache<String, Conversation>,
    in_flight: HashSet<String>,
}

#[derive(Debug)]
pub struct ConversationStore {
    inner: Mutex<StoreInner>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSATION_CAPACITY)
    }
}

impl ConversationStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(StoreInner {
                cache: LruCache::new(capacity),
                in_flight: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the history for `id` out of the cache. Unknown ids start empty.
    pub fn checkout(&self, id: &str) -> Result<ConversationLease<'_>, ConversationBusy> {
        let mut inner = self.lock();
        if !inner.in_flight.insert(id.to_string()) {
            return Err(ConversationBusy(id.to_string()));
        }
        let prior = inner.cache.pop(id).unwrap_or_default();
        Ok(ConversationLease {
            store: self,
            id: id.to_string(),
            prior: Some(prior),
        })
    }

    fn release(&self, id: &str, conversation: Option<Conversation>) {
        let mut inner = self.lock();
        inner.in_flight.remove(id);
        if let Some(conversation) = conversation.filter(|c| !c.is_empty()) {
            inner.cache.put(id.to_string(), conversation);
        }
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.lock().cache.peek(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cache.is_empty()
    }
}

/// Exclusive access to one conversation's history.
///
/// Dropping the lease without [`commit`](Self::commit) puts the prior
/// history back unchanged.
#[derive(Debug)]
pub struct ConversationLease<'a> {
    store: &'a ConversationStore,
    id: String,
    prior: Option<Conversation>,
}

impl ConversationLease<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The history as it was at checkout.
    pub fn prior(&self) -> Conversation {
        self.prior.clone().unwrap_or_default()
    }

    /// Replace the stored history with `conversation`.
    pub fn commit(mut self, conversation: Conversation) {
        self.prior = None;
        self.store.release(&self.id, Some(conversation));
    }
}

impl Drop for ConversationLease<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            self.store.release(&self.id, Some(prior));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Turn;

    fn history(text: &str) -> Conversation {
        Conversation::from_turns(vec![Turn::user_text(text), Turn::assistant_text("ok")]).unwrap()
    }

    #[test]
    fn test_commit_stores_history() {
        let store = ConversationStore::new(4);
        let lease = store.checkout("c1").unwrap();
        assert!(lease.prior().is_empty());
        lease.commit(history("hi"));

        assert_eq!(store.get("c1"), Some(history("hi")));
        assert_eq!(store.checkout("c1").unwrap().prior(), history("hi"));
    }

    #[test]
    fn test_checked_out_conversation_is_busy() {
        let store = ConversationStore::new(4);
        let _lease = store.checkout("c1").unwrap();
        assert_eq!(
            store.checkout("c1").unwrap_err(),
            ConversationBusy("c1".to_string())
        );
        assert!(store.checkout("c2").is_ok());
    }

    #[test]
    fn test_drop_restores_prior() {
        let store = ConversationStore::new(4);
        store.checkout("c1").unwrap().commit(history("first"));

        {
            let lease = store.checkout("c1").unwrap();
            assert!(store.get("c1").is_none());
            drop(lease);
        }

        assert_eq!(store.get("c1"), Some(history("first")));
        assert!(store.checkout("c1").is_ok());
    }

    #[test]
    fn test_least_recently_used_evicted() {
        let store = ConversationStore::new(2);
        for id in ["a", "b", "c"] {
            store.checkout(id).unwrap().commit(history(id));
        }
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
        assert!(store.get("c").is_some());
    }
}
