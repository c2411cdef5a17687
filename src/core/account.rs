// src/core/account.rs

//! Defines the `Account` record, the unit of state the engine operates on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A player account: a persisted credit balance plus the set of owned items.
///
/// Instances held in the cache are derived snapshots; the durable store remains
/// the source of truth and reflects every committed mutation first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub nickname: String,
    pub credits: i64,
    pub items: BTreeSet<String>,
}

impl Account {
    pub fn new(nickname: impl Into<String>, credits: i64) -> Self {
        Self {
            nickname: nickname.into(),
            credits,
            items: BTreeSet::new(),
        }
    }

    /// True if the account owns the given item.
    pub fn owns(&self, item_name: &str) -> bool {
        self.items.contains(item_name)
    }
}
