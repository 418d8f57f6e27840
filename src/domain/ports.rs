use super::customer::{Customer, NewCustomer};
use super::discount::Discount;
use super::user::UserRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait DiscountStore: Send + Sync {
    async fn store(&self, discount: Discount) -> Result<()>;
    /// Stores `discount` only if its id is unknown. Returns `true` if it was stored.
    async fn insert_if_absent(&self, discount: Discount) -> Result<bool>;
    async fn get(&self, discount_id: u64) -> Result<Option<Discount>>;
    /// The highest-precedence discount of `user_id` that is active at `now`.
    async fn find_active(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Discount>>;
    /// Sets `used` on the discount. Returns `true` only if the flag changed;
    /// an unknown id is not an error.
    async fn mark_used(&self, discount_id: u64) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: UserRecord) -> Result<()>;
    /// Stores `user` only if its id is unknown. Returns `true` if it was stored.
    async fn insert_if_absent(&self, user: UserRecord) -> Result<bool>;
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>>;
    /// Cached Square id, `None` when unset or the user is unknown.
    async fn square_customer_id(&self, user_id: &str) -> Result<Option<String>>;
    /// Overwrites the cached Square id. Fails with `UserNotFound` for unknown users.
    async fn set_square_customer_id(&self, user_id: &str, customer_id: &str) -> Result<()>;
}

#[async_trait]
pub trait CustomerProvider: Send + Sync {
    async fn create_customer(&self, request: NewCustomer) -> Result<Customer>;
    async fn get_customer(&self, customer_id: &str) -> Result<Customer>;
}

pub type DiscountStoreBox = Box<dyn DiscountStore>;
pub type UserStoreBox = Box<dyn UserStore>;
pub type CustomerProviderBox = Box<dyn CustomerProvider>;
