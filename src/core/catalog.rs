// src/core/catalog.rs

//! The static shop catalog: item names mapped to prices in credits.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Warships available for purchase.
static SHIPS: &[(&str, i64)] = &[
    ("Malta", 30000),
    ("Black", 29500),
    ("Marco Pole", 25000),
    ("Pommern", 22000),
    ("Scharnhorst", 18000),
    ("Jager", 9200),
    ("Anhalt", 5000),
    ("Johan", 1500),
];

/// Ammunition types available for purchase.
static PROJECTILES: &[(&str, i64)] = &[
    ("AP", 600),  // Armor Piercing
    ("HE", 500),  // High Explosive
    ("SAP", 320), // Semi Armor Piercing
    ("DWT", 450), // Deep Water Torpedos
    ("AHT", 600), // Acoustic Homing Torpedos
    ("DC", 480),  // Depth Charges
    ("DCA", 660), // Depth Charge Airstrike
];

static CATALOG: Lazy<BTreeMap<String, i64>> = Lazy::new(|| {
    SHIPS
        .iter()
        .chain(PROJECTILES.iter())
        .map(|(name, price)| (name.to_string(), *price))
        .collect()
});

/// The shop catalog, immutable for the process lifetime and shared read-only
/// by every session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShopCatalog;

impl ShopCatalog {
    /// Looks up the price of an item, or `None` if the shop does not sell it.
    pub fn price(&self, item_name: &str) -> Option<i64> {
        CATALOG.get(item_name).copied()
    }

    /// The full item-name to price mapping, for the LOGIN response payload.
    pub fn all(&self) -> &'static BTreeMap<String, i64> {
        &CATALOG
    }

    pub fn len(&self) -> usize {
        CATALOG.len()
    }

    pub fn is_empty(&self) -> bool {
        CATALOG.is_empty()
    }
}
