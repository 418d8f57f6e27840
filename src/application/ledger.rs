use crate::domain::discount::{self, ActiveDiscount, Percentage};
use crate::domain::ports::DiscountStoreBox;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

/// Looks up and consumes member discounts.
///
/// `DiscountLedger` holds no state of its own; every call goes straight to
/// the discount store. Storage errors are propagated as-is and never retried.
pub struct DiscountLedger {
    discount_store: DiscountStoreBox,
}

impl DiscountLedger {
    pub fn new(discount_store: DiscountStoreBox) -> Self {
        Self { discount_store }
    }

    /// Returns the user's current active discount, if any.
    pub async fn active_discount(&self, user_id: &str) -> Result<Option<ActiveDiscount>> {
        self.active_discount_at(user_id, Utc::now()).await
    }

    /// Same as [`DiscountLedger::active_discount`] with an explicit clock.
    ///
    /// When several discounts qualify, the one expiring soonest wins; undated
    /// discounts come after dated ones, and ties go to the lowest id.
    #[instrument(skip(self))]
    pub async fn active_discount_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ActiveDiscount>> {
        let Some(found) = self.discount_store.find_active(user_id, now).await? else {
            debug!("No active discount");
            return Ok(None);
        };
        let active = ActiveDiscount::try_from(&found)?;
        debug!(discount_id = active.id, percentage = %active.percentage, "Found active discount");
        Ok(Some(active))
    }

    /// Marks the discount as used.
    ///
    /// The caller must have obtained `discount_id` from an active lookup; it is
    /// not re-validated. Redeeming an already used discount succeeds without
    /// changing anything, and two concurrent redemptions both succeed.
    #[instrument(skip(self))]
    pub async fn redeem(&self, discount_id: u64) -> Result<()> {
        if self.discount_store.mark_used(discount_id).await? {
            info!("Discount redeemed");
        } else {
            warn!("Discount was already used or does not exist");
        }
        Ok(())
    }

    /// Price after discount, rounded to cents.
    pub fn apply(base: Decimal, percentage: Percentage) -> Decimal {
        discount::apply_discount(base, percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::Discount;
    use crate::domain::ports::DiscountStore;
    use crate::infrastructure::in_memory::InMemoryDiscountStore;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap()
    }

    async fn ledger_with(discounts: Vec<Discount>) -> (DiscountLedger, InMemoryDiscountStore) {
        let store = InMemoryDiscountStore::new();
        for discount in discounts {
            store.store(discount).await.unwrap();
        }
        (DiscountLedger::new(Box::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_active_discount_none_for_unknown_user() {
        let (ledger, _) = ledger_with(vec![Discount::new(1, "u1", dec!(10))]).await;
        assert!(ledger.active_discount_at("u2", now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_discount_returns_view() {
        let expiration = now() + Duration::days(10);
        let (ledger, _) =
            ledger_with(vec![Discount::new(3, "u1", dec!(25)).expiring_at(expiration)]).await;

        let active = ledger.active_discount_at("u1", now()).await.unwrap().unwrap();
        assert_eq!(active.id, 3);
        assert_eq!(active.percentage.value(), dec!(25));
        assert_eq!(active.expiration, Some(expiration));
    }

    #[tokio::test]
    async fn test_active_discount_rejects_corrupt_percentage() {
        let (ledger, _) = ledger_with(vec![Discount::new(1, "u1", dec!(250))]).await;
        assert!(ledger.active_discount_at("u1", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_redeem_is_monotonic() {
        let (ledger, store) = ledger_with(vec![Discount::new(1, "u1", dec!(10))]).await;

        ledger.redeem(1).await.unwrap();
        assert!(ledger.active_discount_at("u1", now()).await.unwrap().is_none());

        // Second redemption is a no-op, not an error.
        ledger.redeem(1).await.unwrap();
        assert!(store.get(1).await.unwrap().unwrap().used);
    }

    #[tokio::test]
    async fn test_redeem_unknown_id_succeeds() {
        let (ledger, _) = ledger_with(vec![]).await;
        ledger.redeem(404).await.unwrap();
    }

    #[test]
    fn test_apply() {
        assert_eq!(
            DiscountLedger::apply(dec!(100.00), Percentage::new(dec!(25)).unwrap()),
            dec!(75.00)
        );
    }
}
