// tests/unit_cache_test.rs

use tradepost::core::account::Account;
use tradepost::core::cache::AccountCache;

#[tokio::test]
async fn test_get_miss_on_empty_cache() {
    let cache = AccountCache::new(3);
    assert!(cache.get("Ada").await.is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_put_then_get_returns_snapshot() {
    let cache = AccountCache::new(3);
    cache.put(Account::new("Ada", 2000)).await;
    let account = cache.get("Ada").await.unwrap();
    assert_eq!(account.nickname, "Ada");
    assert_eq!(account.credits, 2000);
}

#[tokio::test]
async fn test_capacity_is_respected() {
    let cache = AccountCache::new(2);
    cache.put(Account::new("a", 1)).await;
    cache.put(Account::new("b", 2)).await;
    cache.put(Account::new("c", 3)).await;
    assert_eq!(cache.len().await, 2);
    // "a" was the least-recently-touched entry.
    assert!(cache.get("a").await.is_none());
    assert!(cache.get("b").await.is_some());
    assert!(cache.get("c").await.is_some());
}

#[tokio::test]
async fn test_get_refreshes_recency() {
    let cache = AccountCache::new(2);
    cache.put(Account::new("a", 1)).await;
    cache.put(Account::new("b", 2)).await;
    // Touch "a" so "b" becomes the coldest entry.
    cache.get("a").await;
    cache.put(Account::new("c", 3)).await;
    assert!(cache.get("a").await.is_some());
    assert!(cache.get("b").await.is_none());
}

#[tokio::test]
async fn test_put_refreshes_existing_entry_without_eviction() {
    let cache = AccountCache::new(2);
    cache.put(Account::new("a", 1)).await;
    cache.put(Account::new("b", 2)).await;
    // Re-inserting an existing nickname replaces, never evicts.
    cache.put(Account::new("a", 99)).await;
    assert_eq!(cache.len().await, 2);
    assert_eq!(cache.get("a").await.unwrap().credits, 99);
    assert!(cache.get("b").await.is_some());
}

#[tokio::test]
async fn test_mutate_applies_in_place() {
    let cache = AccountCache::new(3);
    cache.put(Account::new("Ada", 2000)).await;
    let applied = cache
        .mutate("Ada", |account| {
            account.credits -= 1500;
            account.items.insert("Johan".to_string());
        })
        .await;
    assert!(applied);
    let account = cache.get("Ada").await.unwrap();
    assert_eq!(account.credits, 500);
    assert!(account.owns("Johan"));
}

#[tokio::test]
async fn test_mutate_missing_entry_reports_false() {
    let cache = AccountCache::new(3);
    assert!(!cache.mutate("ghost", |account| account.credits = 0).await);
}

#[tokio::test]
async fn test_invalidate_drops_entry() {
    let cache = AccountCache::new(3);
    cache.put(Account::new("Ada", 2000)).await;
    cache.invalidate("Ada").await;
    assert!(cache.get("Ada").await.is_none());
}

#[tokio::test]
async fn test_zero_capacity_falls_back_to_default() {
    let cache = AccountCache::new(0);
    for i in 0..10 {
        cache.put(Account::new(format!("p{i}"), i)).await;
    }
    assert_eq!(cache.len().await, 5);
}
