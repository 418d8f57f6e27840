use crate::domain::discount::Discount;
use crate::domain::user::UserRecord;
use crate::error::{BillingError, Result};
use std::io::Read;

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
}

/// Reads discount seed records from a CSV source.
///
/// Expected header: `id,user_id,percentage,expiration,used`. Empty
/// `percentage` or `expiration` fields deserialize to `None`; expirations are
/// RFC 3339 timestamps.
pub struct DiscountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> DiscountReader<R> {
    /// Creates a new `DiscountReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: csv_reader(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes discounts.
    pub fn discounts(self) -> impl Iterator<Item = Result<Discount>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BillingError::from))
    }
}

/// Reads user records from a CSV source.
///
/// Expected header: `id,email,onboarding_complete,square_customer_id`.
pub struct UserReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> UserReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: csv_reader(source),
        }
    }

    pub fn users(self) -> impl Iterator<Item = Result<UserRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BillingError::from))
    }
}
