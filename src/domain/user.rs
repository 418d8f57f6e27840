use serde::{Deserialize, Serialize};

/// The slice of a league member's account that billing cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// Set once the member has finished the onboarding flow.
    pub onboarding_complete: bool,
    /// Cached Square customer id. Written at most once.
    pub square_customer_id: Option<String>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            onboarding_complete: false,
            square_customer_id: None,
        }
    }

    pub fn onboarded(mut self) -> Self {
        self.onboarding_complete = true;
        self
    }
}

/// A decoded session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
