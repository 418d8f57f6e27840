//! Square Customers API client

use crate::config::{ConfigError, SquareConfig};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::ports::CustomerProvider;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

/// Response envelope shared by the customer endpoints.
#[derive(Debug, Default, Deserialize)]
struct CustomerEnvelope {
    #[serde(default)]
    customer: Option<Customer>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<SquareApiError>,
}

#[derive(Debug, Deserialize)]
struct SquareApiError {
    #[serde(default)]
    category: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    detail: Option<String>,
}

/// Square payment provider
#[derive(Clone)]
pub struct SquareClient {
    client: Client,
    base_url: Url,
    access_token: String,
    api_version: String,
}

impl SquareClient {
    /// Builds a client; fails if no access token is configured or the base
    /// URL cannot carry a path.
    pub fn new(config: &SquareConfig) -> Result<Self> {
        let access_token = config.require_token()?.to_string();
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(ConfigError::Invalid("SQUARE_BASE_URL"))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token,
            api_version: config.api_version.clone(),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(segments))
            .bearer_auth(&self.access_token)
            .header("Square-Version", &self.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Square API request failed");
            BillingError::HttpError(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.errors.into_iter().next())
                .map(|e| match e.detail {
                    Some(detail) => format!("{} {}: {}", e.category, e.code, detail),
                    None => format!("{} {}", e.category, e.code),
                })
                .unwrap_or_else(|| status.to_string());
            error!(status = %status, message = %message, "Square API error");
            return Err(BillingError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CustomerProvider for SquareClient {
    /// A 2xx response without a `customer` object yields a `Customer` with no id.
    #[instrument(skip(self, request), fields(reference_id = %request.reference_id))]
    async fn create_customer(&self, request: NewCustomer) -> Result<Customer> {
        debug!(idempotency_key = %request.idempotency_key, "Creating Square customer");

        let envelope: CustomerEnvelope = self
            .send(self.request(Method::POST, &["v2", "customers"]).json(&request))
            .await?;
        Ok(envelope.customer.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        // Dot segments are dropped by URL normalization and would hit the list endpoint.
        if matches!(customer_id, "" | "." | "..") {
            return Err(BillingError::ValidationError(format!(
                "Invalid customer id '{}'",
                customer_id
            )));
        }
        debug!("Fetching Square customer");

        let envelope: CustomerEnvelope = self
            .send(self.request(Method::GET, &["v2", "customers", customer_id]))
            .await?;
        envelope.customer.ok_or_else(|| BillingError::ProviderError {
            status: 200,
            message: format!("response for customer {} had no customer", customer_id),
        })
    }
}
