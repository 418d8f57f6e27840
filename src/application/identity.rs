use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::ports::{CustomerProviderBox, UserStoreBox};
use crate::error::{BillingError, Result};
use tracing::{debug, info, instrument};

/// Maps local users to Square customers.
///
/// The first request for a user creates the Square customer and caches its id
/// on the user record; later requests are answered from the cache. The
/// check and the write are separate store calls, so two concurrent first-time
/// requests can each create a customer, and the later write wins.
pub struct CustomerBridge {
    user_store: UserStoreBox,
    provider: CustomerProviderBox,
}

impl CustomerBridge {
    pub fn new(user_store: UserStoreBox, provider: CustomerProviderBox) -> Self {
        Self {
            user_store,
            provider,
        }
    }

    /// Returns the user's Square customer id, creating the customer if needed.
    #[instrument(skip(self, email, given_name, family_name))]
    pub async fn get_or_create_customer(
        &self,
        user_id: &str,
        email: &str,
        given_name: Option<&str>,
        family_name: Option<&str>,
    ) -> Result<String> {
        if let Some(customer_id) = self.user_store.square_customer_id(user_id).await? {
            debug!(customer_id = %customer_id, "Using cached Square customer");
            return Ok(customer_id);
        }

        let request = NewCustomer::for_user(user_id, email, given_name, family_name);
        let customer = self.provider.create_customer(request).await?;
        let customer_id = customer.id.ok_or(BillingError::CustomerCreationFailed)?;

        self.user_store
            .set_square_customer_id(user_id, &customer_id)
            .await?;
        info!(customer_id = %customer_id, "Created Square customer");
        Ok(customer_id)
    }

    /// Fetches the customer straight from Square.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        self.provider.get_customer(customer_id).await
    }
}
