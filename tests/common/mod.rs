#![allow(dead_code)]

use async_trait::async_trait;
use league_billing::domain::customer::{Customer, NewCustomer};
use league_billing::domain::ports::{CustomerProvider, UserStore};
use league_billing::domain::user::UserRecord;
use league_billing::error::{BillingError, Result};
use league_billing::infrastructure::in_memory::InMemoryUserStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// In-process stand-in for Square that records every create call.
#[derive(Clone, Default)]
pub struct FakeProvider {
    creates: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<NewCustomer>>>,
    customers: Arc<Mutex<HashMap<String, Customer>>>,
    omit_id: bool,
    barrier: Option<Arc<Barrier>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create calls succeed but come back without an id.
    pub fn without_ids() -> Self {
        Self {
            omit_id: true,
            ..Self::default()
        }
    }

    /// Each create call waits until `parties` calls are in flight.
    pub fn gated(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<NewCustomer> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CustomerProvider for FakeProvider {
    async fn create_customer(&self, request: NewCustomer) -> Result<Customer> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        let id = (!self.omit_id).then(|| format!("SQ_{}", n));
        let customer = Customer {
            id: id.clone(),
            email_address: Some(request.email_address),
            given_name: request.given_name,
            family_name: request.family_name,
            reference_id: Some(request.reference_id),
            created_at: None,
        };
        if let Some(id) = id {
            self.customers.lock().unwrap().insert(id, customer.clone());
        }
        Ok(customer)
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        self.customers
            .lock()
            .unwrap()
            .get(customer_id)
            .cloned()
            .ok_or_else(|| BillingError::ProviderError {
                status: 404,
                message: "NOT_FOUND".to_string(),
            })
    }
}

pub async fn user_store_with(users: &[(&str, &str)]) -> InMemoryUserStore {
    let store = InMemoryUserStore::new();
    for (id, email) in users {
        store.store(UserRecord::new(*id, *email)).await.unwrap();
    }
    store
}
