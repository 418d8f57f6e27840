//! Application layer containing the billing workflows.
//!
//! `DiscountLedger` and `CustomerBridge` are independent of each other; both
//! are driven by checkout code and talk to storage and Square only through the
//! ports in `domain::ports`. `OnboardingGuard` gates members-only pages.

pub mod identity;
pub mod ledger;
pub mod onboarding;
