// tests/property_test.rs

//! Property-based tests for the account cache and the buy/sell economics.

use proptest::prelude::*;
use std::sync::Arc;
use tradepost::core::account::Account;
use tradepost::core::cache::AccountCache;
use tradepost::core::engine::AccountEngine;
use tradepost::core::store::AccountStore;

/// Items a brand-new account (at least 1500 credits) can always afford.
const AFFORDABLE_ITEMS: &[&str] = &["Johan", "AP", "HE", "SAP", "DWT", "AHT", "DC", "DCA"];

#[derive(Debug, Clone)]
enum CacheOp {
    Put(u8),
    Get(u8),
}

fn cache_op() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0u8..16).prop_map(CacheOp::Put),
        (0u8..16).prop_map(CacheOp::Get),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// The cache never holds more than its capacity, and the surviving
    /// entries are exactly the most-recently-touched nicknames.
    #[test]
    fn cache_tracks_most_recent_nicknames(
        ops in prop::collection::vec(cache_op(), 1..200),
        capacity in 1usize..8,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = AccountCache::new(capacity);
            // Model: recency order, coldest first.
            let mut model: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    CacheOp::Put(n) => {
                        let nickname = format!("player{n}");
                        cache.put(Account::new(nickname.clone(), 100)).await;
                        model.retain(|m| *m != nickname);
                        model.push(nickname);
                        if model.len() > capacity {
                            model.remove(0);
                        }
                    }
                    CacheOp::Get(n) => {
                        let nickname = format!("player{n}");
                        let hit = cache.get(&nickname).await.is_some();
                        let modeled = model.iter().any(|m| *m == nickname);
                        assert_eq!(hit, modeled);
                        if modeled {
                            model.retain(|m| *m != nickname);
                            model.push(nickname);
                        }
                    }
                }
            }

            assert!(cache.len().await <= capacity);
            assert_eq!(cache.len().await, model.len());
            for nickname in &model {
                assert!(cache.get(nickname).await.is_some());
            }
        });
    }

    /// Buying then selling the same item never leaves the account richer than
    /// before the buy.
    #[test]
    fn buy_then_sell_never_profits(idx in 0usize..AFFORDABLE_ITEMS.len()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = AccountStore::open_in_memory().await.unwrap();
            let engine = Arc::new(AccountEngine::new(AccountCache::new(5), store));
            let item = AFFORDABLE_ITEMS[idx];

            let before = engine.login_or_create("Ada").await.unwrap();
            engine.buy_item("Ada", item).await.unwrap();
            let after = engine.sell_item("Ada", item).await.unwrap();

            assert!(after.credits <= before.credits);
            assert!(after.credits >= 0);
            assert!(after.items.is_empty());
        });
    }

    /// Credits never go negative under any affordable purchase sequence.
    #[test]
    fn credits_stay_non_negative(
        picks in prop::collection::vec(0usize..AFFORDABLE_ITEMS.len(), 1..12),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = AccountStore::open_in_memory().await.unwrap();
            let engine = Arc::new(AccountEngine::new(AccountCache::new(5), store));
            engine.login_or_create("Ada").await.unwrap();

            for idx in picks {
                let item = AFFORDABLE_ITEMS[idx];
                // Rejected purchases are fine; corrupted balances are not.
                let _ = engine.buy_item("Ada", item).await;
                let balance = engine.get_balance("Ada").await.unwrap();
                assert!(balance >= 0);
            }
        });
    }
}
