use crate::config::SiteConfig;
use crate::domain::ports::UserStoreBox;
use crate::domain::user::Session;
use crate::error::Result;
use tracing::debug;

/// Where a request for a members-only page should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Proceed,
    SignIn,
    Onboarding,
}

impl Redirect {
    /// Target path, or `None` when the request may proceed.
    pub fn path<'a>(&self, site: &'a SiteConfig) -> Option<&'a str> {
        match self {
            Redirect::Proceed => None,
            Redirect::SignIn => Some(&site.sign_in_path),
            Redirect::Onboarding => Some(&site.onboarding_path),
        }
    }
}

/// Keeps members who have not finished onboarding out of the app.
pub struct OnboardingGuard {
    user_store: UserStoreBox,
}

impl OnboardingGuard {
    pub fn new(user_store: UserStoreBox) -> Self {
        Self { user_store }
    }

    pub async fn check(&self, session: Option<&Session>) -> Result<Redirect> {
        let Some(session) = session else {
            return Ok(Redirect::SignIn);
        };

        let redirect = match self.user_store.get(&session.user_id).await? {
            None => Redirect::SignIn,
            Some(user) if !user.onboarding_complete => Redirect::Onboarding,
            Some(_) => Redirect::Proceed,
        };
        debug!(user_id = %session.user_id, ?redirect, "Onboarding check");
        Ok(redirect)
    }
}
