//! Highlight token caching with LRU eviction

use crate::search::MatchTokens;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cache key: the search generation the tokens were computed for, and the verse.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TokenKey {
    pub generation: u64,
    pub gid: u64,
}

impl TokenKey {
    pub fn new(generation: u64, gid: u64) -> Self {
        Self { generation, gid }
    }
}

pub struct MatchTokenCache {
    cache: Mutex<LruCache<TokenKey, Arc<MatchTokens>>>,
}

impl MatchTokenCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<TokenKey, Arc<MatchTokens>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &TokenKey) -> Option<Arc<MatchTokens>> {
        self.lock().get(key).map(Arc::clone)
    }

    /// Cached tokens for `key`, computing them with `load` on a miss.
    /// `load` runs without the lock held; `None` is not cached.
    pub fn get_or_load<F>(&self, key: TokenKey, load: F) -> Option<Arc<MatchTokens>>
    where
        F: FnOnce() -> Option<MatchTokens>,
    {
        if let Some(tokens) = self.get(&key) {
            return Some(tokens);
        }

        let tokens = Arc::new(load()?);
        self.lock().put(key, Arc::clone(&tokens));
        Some(tokens)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// `(entries, capacity)`
    pub fn stats(&self) -> (usize, usize) {
        let cache = self.lock();
        (cache.len(), cache.cap().get())
    }
}
