use crate::error::{BillingError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A discount percentage in the closed range `0..=100`.
///
/// Wraps `rust_decimal::Decimal` so that pricing code never sees an
/// out-of-range rate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const FULL: Self = Self(Decimal::ONE_HUNDRED);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED {
            Ok(Self(value))
        } else {
            Err(BillingError::ValidationError(format!(
                "Percentage must be between 0 and 100, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = BillingError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(percentage: Percentage) -> Self {
        percentage.0
    }
}

impl FromStr for Percentage {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal(s, "percentage").and_then(Self::new)
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A promotional discount owned by a single user.
///
/// Discounts are issued elsewhere and only ever move from unused to used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: u64,
    pub user_id: String,
    /// Stored rate; a missing value is treated as zero when the discount is looked up.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub percentage: Option<Decimal>,
    /// `None` means the discount never expires.
    pub expiration: Option<DateTime<Utc>>,
    pub used: bool,
}

impl Discount {
    pub fn new(id: u64, user_id: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            percentage: Some(percentage),
            expiration: None,
            used: false,
        }
    }

    pub fn expiring_at(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Unused and either undated or expiring strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expiration.is_none_or(|expiration| expiration > now)
    }

    /// Marks the discount as used. Returns `true` if this call changed the flag.
    pub fn mark_used(&mut self) -> bool {
        !std::mem::replace(&mut self.used, true)
    }

    /// Ordering key among several active discounts: earliest expiration first,
    /// undated discounts last, then lowest id.
    pub fn precedence(&self) -> (bool, Option<DateTime<Utc>>, u64) {
        (self.expiration.is_none(), self.expiration, self.id)
    }
}

/// The view of a discount handed to checkout code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDiscount {
    pub id: u64,
    pub percentage: Percentage,
    pub expiration: Option<DateTime<Utc>>,
}

impl TryFrom<&Discount> for ActiveDiscount {
    type Error = BillingError;

    fn try_from(discount: &Discount) -> Result<Self> {
        let percentage = match discount.percentage {
            Some(value) => Percentage::new(value)?,
            None => Percentage::ZERO,
        };
        Ok(Self {
            id: discount.id,
            percentage,
            expiration: discount.expiration,
        })
    }
}

/// Applies `percentage` to `base`, rounding half away from zero to cents.
pub fn apply_discount(base: Decimal, percentage: Percentage) -> Decimal {
    let factor = Decimal::ONE - percentage.value() / Decimal::ONE_HUNDRED;
    let mut discounted =
        (base * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    discounted.rescale(2);
    discounted
}

/// String form of [`apply_discount`], e.g. `("100.00", "25")` gives `"75.00"`.
pub fn apply_discount_str(base: &str, percentage: &str) -> Result<String> {
    let base = parse_decimal(base, "amount")?;
    let percentage = percentage.parse::<Percentage>()?;
    Ok(apply_discount(base, percentage).to_string())
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| {
        BillingError::ValidationError(format!("Invalid {} '{}': {}", field, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percentage_validation() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert!(matches!(
            Percentage::new(dec!(100.01)),
            Err(BillingError::ValidationError(_))
        ));
        assert!(matches!(
            Percentage::new(dec!(-1)),
            Err(BillingError::ValidationError(_))
        ));
    }

    #[test]
    fn test_percentage_from_str() {
        assert_eq!("12.5".parse::<Percentage>().unwrap().value(), dec!(12.5));
        assert!(" 25 ".parse::<Percentage>().is_ok());
        assert!("abc".parse::<Percentage>().is_err());
        assert!("".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_apply_discount_examples() {
        assert_eq!(apply_discount_str("100.00", "25").unwrap(), "75.00");
        assert_eq!(apply_discount_str("49.99", "0").unwrap(), "49.99");
        assert_eq!(apply_discount_str("10.00", "100").unwrap(), "0.00");
        assert_eq!(apply_discount(dec!(10.00), Percentage::FULL).to_string(), "0.00");
    }

    #[test]
    fn test_apply_discount_rounds_half_away_from_zero() {
        // 0.125 * 1 = 0.125 -> 0.13
        let result = apply_discount(dec!(0.125), Percentage::ZERO);
        assert_eq!(result.to_string(), "0.13");
        // 19.99 * 0.85 = 16.9915 -> 16.99
        let result = apply_discount(dec!(19.99), Percentage::new(dec!(15)).unwrap());
        assert_eq!(result.to_string(), "16.99");
    }

    #[test]
    fn test_apply_discount_pads_whole_amounts() {
        assert_eq!(apply_discount_str("80", "50").unwrap(), "40.00");
    }

    #[test]
    fn test_apply_discount_rejects_malformed_input() {
        assert!(matches!(
            apply_discount_str("ten", "10"),
            Err(BillingError::ValidationError(_))
        ));
        assert!(matches!(
            apply_discount_str("10.00", "150"),
            Err(BillingError::ValidationError(_))
        ));
    }

    #[test]
    fn test_discount_active_rules() {
        let undated = Discount::new(1, "u1", dec!(10));
        assert!(undated.is_active_at(now()));

        let future = Discount::new(2, "u1", dec!(10)).expiring_at(now() + Duration::days(1));
        assert!(future.is_active_at(now()));

        let expired = Discount::new(3, "u1", dec!(10)).expiring_at(now() - Duration::days(1));
        assert!(!expired.is_active_at(now()));

        // Expiring exactly now is no longer active.
        let boundary = Discount::new(4, "u1", dec!(10)).expiring_at(now());
        assert!(!boundary.is_active_at(now()));

        let mut used = Discount::new(5, "u1", dec!(10));
        used.used = true;
        assert!(!used.is_active_at(now()));
    }

    #[test]
    fn test_mark_used_reports_transition() {
        let mut discount = Discount::new(1, "u1", dec!(10));
        assert!(discount.mark_used());
        assert!(discount.used);
        assert!(!discount.mark_used());
        assert!(discount.used);
    }

    #[test]
    fn test_precedence_prefers_earliest_expiration() {
        let undated = Discount::new(1, "u1", dec!(10));
        let later = Discount::new(2, "u1", dec!(10)).expiring_at(now() + Duration::days(7));
        let sooner = Discount::new(3, "u1", dec!(10)).expiring_at(now() + Duration::days(1));

        let best = [undated, later, sooner]
            .into_iter()
            .min_by_key(Discount::precedence)
            .unwrap();
        assert_eq!(best.id, 3);
    }

    #[test]
    fn test_active_discount_defaults_missing_percentage() {
        let mut discount = Discount::new(7, "u1", dec!(10));
        discount.percentage = None;
        let active = ActiveDiscount::try_from(&discount).unwrap();
        assert_eq!(active.percentage, Percentage::ZERO);
        assert_eq!(active.percentage.to_string(), "0");
    }
}
