use crate::domain::discount::Discount;
use crate::domain::ports::{DiscountStore, UserStore};
use crate::domain::user::UserRecord;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for discounts.
///
/// Uses `Arc<RwLock<HashMap<u64, Discount>>>`; clones share the same map.
/// Each call takes the lock once, so a single call is atomic but a
/// read followed by a write across calls is not.
#[derive(Default, Clone)]
pub struct InMemoryDiscountStore {
    discounts: Arc<RwLock<HashMap<u64, Discount>>>,
}

impl InMemoryDiscountStore {
    /// Creates a new, empty in-memory discount store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiscountStore for InMemoryDiscountStore {
    async fn store(&self, discount: Discount) -> Result<()> {
        let mut discounts = self.discounts.write().await;
        discounts.insert(discount.id, discount);
        Ok(())
    }

    async fn insert_if_absent(&self, discount: Discount) -> Result<bool> {
        let mut discounts = self.discounts.write().await;
        match discounts.entry(discount.id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(discount);
                Ok(true)
            }
        }
    }

    async fn get(&self, discount_id: u64) -> Result<Option<Discount>> {
        let discounts = self.discounts.read().await;
        Ok(discounts.get(&discount_id).cloned())
    }

    async fn find_active(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Discount>> {
        let discounts = self.discounts.read().await;
        Ok(discounts
            .values()
            .filter(|d| d.user_id == user_id && d.is_active_at(now))
            .min_by_key(|d| d.precedence())
            .cloned())
    }

    async fn mark_used(&self, discount_id: u64) -> Result<bool> {
        let mut discounts = self.discounts.write().await;
        Ok(discounts
            .get_mut(&discount_id)
            .is_some_and(Discount::mark_used))
    }
}

/// A thread-safe in-memory store for user records, keyed by user id.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty in-memory user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: UserRecord) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn insert_if_absent(&self, user: UserRecord) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.entry(user.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(true)
            }
        }
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn square_customer_id(&self, user_id: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|user| user.square_customer_id.clone()))
    }

    async fn set_square_customer_id(&self, user_id: &str, customer_id: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| BillingError::UserNotFound(user_id.to_string()))?;
        user.square_customer_id = Some(customer_id.to_string());
        Ok(())
    }
}
