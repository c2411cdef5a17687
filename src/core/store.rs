// src/core/store.rs

//! The durable account store, backed by SQLite via `sqlx`.
//!
//! Two relations form the on-disk contract and survive process restarts:
//! `accounts(nickname PRIMARY KEY, credits)` and `items(nickname, item_name)`.

use crate::core::TradePostError;
use rand::Rng;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Minimum starting credits for new accounts.
pub const NEW_ACCOUNT_CREDIT_MIN: i64 = 1500;
/// Maximum starting credits for new accounts.
pub const NEW_ACCOUNT_CREDIT_MAX: i64 = 2500;

/// Handle to the persistent relational backing store. Cheap to clone; all
/// clones share one connection pool.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: SqlitePool,
    credit_min: i64,
    credit_max: i64,
}

impl AccountStore {
    /// Opens (creating if missing) the database file and initializes the schema.
    pub async fn open(
        path: impl AsRef<Path>,
        credit_min: i64,
        credit_max: i64,
    ) -> Result<Self, TradePostError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self {
            pool,
            credit_min,
            credit_max,
        };
        store.init().await?;
        Ok(store)
    }

    /// Opens a private in-memory database, for tests. A single pooled
    /// connection keeps every query on the same in-memory instance.
    pub async fn open_in_memory() -> Result<Self, TradePostError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self {
            pool,
            credit_min: NEW_ACCOUNT_CREDIT_MIN,
            credit_max: NEW_ACCOUNT_CREDIT_MAX,
        };
        store.init().await?;
        Ok(store)
    }

    /// Creates the two relations if they do not exist yet.
    async fn init(&self) -> Result<(), TradePostError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                nickname TEXT PRIMARY KEY,
                credits INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                nickname TEXT NOT NULL,
                item_name TEXT NOT NULL,
                FOREIGN KEY(nickname) REFERENCES accounts(nickname)
            )",
        )
        .execute(&self.pool)
        .await?;
        info!("Database initialized.");
        Ok(())
    }

    /// Inserts a row for the nickname with a randomized starting balance, only
    /// if none exists, then returns the stored balance. The conditional insert
    /// is a single statement, so two concurrent first logins can never create
    /// two rows or two different starting balances.
    pub async fn create_if_absent(&self, nickname: &str) -> Result<i64, TradePostError> {
        let starting_credits = rand::thread_rng().gen_range(self.credit_min..=self.credit_max);
        let inserted = sqlx::query(
            "INSERT INTO accounts (nickname, credits) VALUES (?1, ?2)
             ON CONFLICT(nickname) DO NOTHING",
        )
        .bind(nickname)
        .bind(starting_credits)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!("Created new account for {nickname} with {starting_credits} credits.");
        }
        self.get_balance(nickname).await
    }

    /// Reads the persisted balance for an existing account.
    pub async fn get_balance(&self, nickname: &str) -> Result<i64, TradePostError> {
        let credits: i64 = sqlx::query_scalar("SELECT credits FROM accounts WHERE nickname = ?1")
            .bind(nickname)
            .fetch_one(&self.pool)
            .await?;
        Ok(credits)
    }

    /// Lists the items owned by the nickname.
    pub async fn list_items(&self, nickname: &str) -> Result<BTreeSet<String>, TradePostError> {
        let rows = sqlx::query("SELECT item_name FROM items WHERE nickname = ?1")
            .bind(nickname)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Adjusts the persisted balance by `delta` (may be negative).
    pub async fn apply_credit_delta(
        &self,
        nickname: &str,
        delta: i64,
    ) -> Result<(), TradePostError> {
        sqlx::query("UPDATE accounts SET credits = credits + ?1 WHERE nickname = ?2")
            .bind(delta)
            .bind(nickname)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Records item ownership.
    pub async fn add_item(&self, nickname: &str, item_name: &str) -> Result<(), TradePostError> {
        sqlx::query("INSERT INTO items (nickname, item_name) VALUES (?1, ?2)")
            .bind(nickname)
            .bind(item_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes item ownership.
    pub async fn remove_item(&self, nickname: &str, item_name: &str) -> Result<(), TradePostError> {
        sqlx::query("DELETE FROM items WHERE nickname = ?1 AND item_name = ?2")
            .bind(nickname)
            .bind(item_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Commits the debit and the item insert of one purchase in a single
    /// transaction, so a torn write can never reach the disk.
    pub async fn record_purchase(
        &self,
        nickname: &str,
        item_name: &str,
        price: i64,
    ) -> Result<(), TradePostError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE accounts SET credits = credits - ?1 WHERE nickname = ?2")
            .bind(price)
            .bind(nickname)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO items (nickname, item_name) VALUES (?1, ?2)")
            .bind(nickname)
            .bind(item_name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Commits the refund and the item delete of one sale in a single
    /// transaction.
    pub async fn record_sale(
        &self,
        nickname: &str,
        item_name: &str,
        refund: i64,
    ) -> Result<(), TradePostError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE accounts SET credits = credits + ?1 WHERE nickname = ?2")
            .bind(refund)
            .bind(nickname)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM items WHERE nickname = ?1 AND item_name = ?2")
            .bind(nickname)
            .bind(item_name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
