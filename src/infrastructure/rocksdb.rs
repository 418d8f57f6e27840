use crate::domain::discount::Discount;
use crate::domain::ports::{DiscountStore, UserStore};
use crate::domain::user::UserRecord;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing discounts, keyed by big-endian discount id.
pub const CF_DISCOUNTS: &str = "discounts";
/// Column Family for storing user records, keyed by user id bytes.
pub const CF_USERS: &str = "users";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Discount` and `UserRecord` entities using
/// separate Column Families. Values are JSON.
///
/// `Clone` shares the underlying `Arc<DB>`. Read-modify-write operations
/// (`insert_if_absent`, `mark_used`, `set_square_customer_id`) are not transactional.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("discounts" and "users") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_discounts = ColumnFamilyDescriptor::new(CF_DISCOUNTS, Options::default());
        let cf_users = ColumnFamilyDescriptor::new(CF_USERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_discounts, cf_users])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            BillingError::StorageError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn put_json<T: Serialize>(&self, cf: &'static str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &'static str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_pinned_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DiscountStore for RocksDBStore {
    async fn store(&self, discount: Discount) -> Result<()> {
        self.put_json(CF_DISCOUNTS, &discount.id.to_be_bytes(), &discount)
    }

    async fn insert_if_absent(&self, discount: Discount) -> Result<bool> {
        let key = discount.id.to_be_bytes();
        if self.db.get_pinned_cf(self.cf(CF_DISCOUNTS)?, key)?.is_some() {
            return Ok(false);
        }
        self.put_json(CF_DISCOUNTS, &key, &discount)?;
        Ok(true)
    }

    async fn get(&self, discount_id: u64) -> Result<Option<Discount>> {
        self.get_json(CF_DISCOUNTS, &discount_id.to_be_bytes())
    }

    async fn find_active(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Discount>> {
        let mut best: Option<Discount> = None;

        for item in self.db.iterator_cf(self.cf(CF_DISCOUNTS)?, IteratorMode::Start) {
            let (_key, value) = item?;
            let discount: Discount = serde_json::from_slice(&value)?;
            if discount.user_id != user_id || !discount.is_active_at(now) {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|current| discount.precedence() < current.precedence())
            {
                best = Some(discount);
            }
        }

        Ok(best)
    }

    async fn mark_used(&self, discount_id: u64) -> Result<bool> {
        let key = discount_id.to_be_bytes();
        let Some(mut discount) = self.get_json::<Discount>(CF_DISCOUNTS, &key)? else {
            return Ok(false);
        };
        let changed = discount.mark_used();
        if changed {
            self.put_json(CF_DISCOUNTS, &key, &discount)?;
        }
        Ok(changed)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: UserRecord) -> Result<()> {
        self.put_json(CF_USERS, user.id.as_bytes(), &user)
    }

    async fn insert_if_absent(&self, user: UserRecord) -> Result<bool> {
        if self.db.get_pinned_cf(self.cf(CF_USERS)?, user.id.as_bytes())?.is_some() {
            return Ok(false);
        }
        self.put_json(CF_USERS, user.id.as_bytes(), &user)?;
        Ok(true)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        self.get_json(CF_USERS, user_id.as_bytes())
    }

    async fn square_customer_id(&self, user_id: &str) -> Result<Option<String>> {
        let user: Option<UserRecord> = self.get_json(CF_USERS, user_id.as_bytes())?;
        Ok(user.and_then(|u| u.square_customer_id))
    }

    async fn set_square_customer_id(&self, user_id: &str, customer_id: &str) -> Result<()> {
        let mut user: UserRecord = self
            .get_json(CF_USERS, user_id.as_bytes())?
            .ok_or_else(|| BillingError::UserNotFound(user_id.to_string()))?;
        user.square_customer_id = Some(customer_id.to_string());
        self.put_json(CF_USERS, user_id.as_bytes(), &user)
    }
}
