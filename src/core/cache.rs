// src/core/cache.rs

//! The bounded, recency-ordered account cache fronting the durable store.

use crate::core::account::Account;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::info;

/// Default number of accounts kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 5;

/// A strict-LRU map from nickname to account snapshot.
///
/// All access goes through one async mutex, so a `mutate` can never race an
/// eviction of the entry it is updating. Eviction of the coldest entry is
/// observable only as a log line, never an error.
#[derive(Debug)]
pub struct AccountCache {
    entries: Mutex<LruCache<String, Account>>,
}

impl AccountCache {
    /// Creates a cache bounded to `capacity` distinct nicknames. A capacity of
    /// zero falls back to the default.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns a snapshot of the cached account, marking it most-recently-used.
    pub async fn get(&self, nickname: &str) -> Option<Account> {
        self.entries.lock().await.get(nickname).cloned()
    }

    /// Inserts or refreshes an entry, marking it most-recently-used. If the
    /// insert pushes the cache past capacity, the least-recently-touched entry
    /// is evicted.
    pub async fn put(&self, account: Account) {
        let nickname = account.nickname.clone();
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(nickname.clone(), account) {
            if evicted != nickname {
                info!("Evicted {evicted} from cache.");
            }
        }
    }

    /// Applies an in-place update to the cached entry, atomically with respect
    /// to every other cache operation. Returns false if the nickname is not
    /// cached (e.g. it was evicted by an insert for another nickname).
    pub async fn mutate<F>(&self, nickname: &str, f: F) -> bool
    where
        F: FnOnce(&mut Account),
    {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(nickname) {
            Some(account) => {
                f(account);
                true
            }
            None => false,
        }
    }

    /// Drops the entry for a nickname, if present.
    pub async fn invalidate(&self, nickname: &str) {
        self.entries.lock().await.pop(nickname);
    }

    /// The number of currently cached accounts.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
