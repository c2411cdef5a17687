// src/core/engine.rs

//! The account state engine: owns the cache and the store together and exposes
//! atomic account operations with per-nickname serialization.

use crate::core::TradePostError;
use crate::core::account::Account;
use crate::core::cache::AccountCache;
use crate::core::catalog::ShopCatalog;
use crate::core::store::AccountStore;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fraction of the catalog price refunded when selling an item.
pub const SELL_RATIO: f64 = 0.5;

/// The engine behind every session. Each operation takes the nickname's lock
/// for its whole read-check-persist-update sequence, so two concurrent
/// sessions for one nickname always observe some sequential ordering, while
/// operations on different nicknames proceed independently.
///
/// The store write always commits before the cache is touched; a failed store
/// write leaves the cache at its pre-operation state.
#[derive(Debug)]
pub struct AccountEngine {
    cache: AccountCache,
    store: AccountStore,
    catalog: ShopCatalog,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AccountEngine {
    pub fn new(cache: AccountCache, store: AccountStore) -> Self {
        Self {
            cache,
            store,
            catalog: ShopCatalog,
            locks: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &ShopCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &AccountCache {
        &self.cache
    }

    /// Returns the mutex serializing all operations for one nickname. Lock
    /// entries are created on first use and live for the process lifetime;
    /// the set of nicknames is small and bounded by the player base.
    fn lock_for(&self, nickname: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(nickname.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns the account for the nickname, creating it in the store with a
    /// randomized starting balance on first login. Safe to call concurrently
    /// for the same brand-new nickname: the per-nickname lock plus the store's
    /// conditional insert guarantee exactly one starting balance.
    pub async fn login_or_create(&self, nickname: &str) -> Result<Account, TradePostError> {
        let lock = self.lock_for(nickname);
        let _guard = lock.lock().await;
        self.load_account_locked(nickname).await
    }

    /// Returns the current balance, from the cache when possible.
    pub async fn get_balance(&self, nickname: &str) -> Result<i64, TradePostError> {
        let lock = self.lock_for(nickname);
        let _guard = lock.lock().await;
        let account = self.load_account_locked(nickname).await?;
        Ok(account.credits)
    }

    /// Purchases an item: debits the price and records ownership, persisting
    /// both in one transaction before the cache entry is refreshed.
    pub async fn buy_item(
        &self,
        nickname: &str,
        item_name: &str,
    ) -> Result<Account, TradePostError> {
        let lock = self.lock_for(nickname);
        let _guard = lock.lock().await;

        let mut account = self.load_account_locked(nickname).await?;
        let price = self
            .catalog
            .price(item_name)
            .ok_or_else(|| TradePostError::UnknownItem(item_name.to_string()))?;
        if account.owns(item_name) {
            return Err(TradePostError::AlreadyOwned(item_name.to_string()));
        }
        if account.credits < price {
            return Err(TradePostError::InsufficientFunds {
                price,
                balance: account.credits,
            });
        }

        if let Err(e) = self.store.record_purchase(nickname, item_name, price).await {
            warn!("Store write failed for {nickname} buying {item_name}: {e}");
            return Err(e);
        }

        account.credits -= price;
        account.items.insert(item_name.to_string());
        self.cache.put(account.clone()).await;
        Ok(account)
    }

    /// Sells an owned item back to the shop for `floor(price * SELL_RATIO)`.
    pub async fn sell_item(
        &self,
        nickname: &str,
        item_name: &str,
    ) -> Result<Account, TradePostError> {
        let lock = self.lock_for(nickname);
        let _guard = lock.lock().await;

        let mut account = self.load_account_locked(nickname).await?;
        if !account.owns(item_name) {
            return Err(TradePostError::NotOwned(item_name.to_string()));
        }
        // Owned items were bought, so the catalog still prices them.
        let price = self
            .catalog
            .price(item_name)
            .ok_or_else(|| TradePostError::UnknownItem(item_name.to_string()))?;
        let refund = (price as f64 * SELL_RATIO).floor() as i64;

        if let Err(e) = self.store.record_sale(nickname, item_name, refund).await {
            warn!("Store write failed for {nickname} selling {item_name}: {e}");
            return Err(e);
        }

        account.credits += refund;
        account.items.remove(item_name);
        self.cache.put(account.clone()).await;
        Ok(account)
    }

    /// Loads the account from the cache, falling back to the store on a miss.
    /// Callers must hold the nickname's lock.
    async fn load_account_locked(&self, nickname: &str) -> Result<Account, TradePostError> {
        if let Some(account) = self.cache.get(nickname).await {
            debug!("Cache hit for {nickname}.");
            return Ok(account);
        }

        let credits = self.store.create_if_absent(nickname).await?;
        let items = self.store.list_items(nickname).await?;
        let account = Account {
            nickname: nickname.to_string(),
            credits,
            items,
        };
        self.cache.put(account.clone()).await;
        Ok(account)
    }
}
