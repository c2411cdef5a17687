// tests/unit_catalog_test.rs

use tradepost::core::catalog::ShopCatalog;

#[test]
fn test_known_prices() {
    let catalog = ShopCatalog;
    assert_eq!(catalog.price("Johan"), Some(1500));
    assert_eq!(catalog.price("Malta"), Some(30000));
    assert_eq!(catalog.price("AP"), Some(600));
    assert_eq!(catalog.price("SAP"), Some(320));
}

#[test]
fn test_unknown_item_has_no_price() {
    let catalog = ShopCatalog;
    assert_eq!(catalog.price("Bismarck"), None);
    assert_eq!(catalog.price(""), None);
}

#[test]
fn test_catalog_contents() {
    let catalog = ShopCatalog;
    // Eight ships plus seven projectile types.
    assert_eq!(catalog.len(), 15);
    assert!(!catalog.is_empty());
    assert!(catalog.all().values().all(|price| *price > 0));
}

#[test]
fn test_all_matches_price_lookup() {
    let catalog = ShopCatalog;
    for (name, price) in catalog.all() {
        assert_eq!(catalog.price(name), Some(*price));
    }
}
