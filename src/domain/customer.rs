use serde::{Deserialize, Serialize};

/// A customer record as returned by Square.
///
/// Every field is optional on the wire; in particular a create call can come
/// back without an `id`, which callers must treat as a failed creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Back-reference to the local user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of a create-customer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomer {
    /// Unique per logical creation attempt.
    pub idempotency_key: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub reference_id: String,
}

impl NewCustomer {
    /// Builds a request with a freshly generated idempotency key.
    pub fn for_user(
        user_id: &str,
        email: &str,
        given_name: Option<&str>,
        family_name: Option<&str>,
    ) -> Self {
        Self {
            idempotency_key: uuid::Uuid::new_v4().to_string(),
            email_address: email.to_string(),
            given_name: given_name.map(str::to_string),
            family_name: family_name.map(str::to_string),
            reference_id: user_id.to_string(),
        }
    }
}
