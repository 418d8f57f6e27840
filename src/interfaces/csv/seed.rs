//! Loads seed CSVs into the stores without touching rows that already exist.

use super::discount_reader::{DiscountReader, UserReader};
use crate::domain::ports::{DiscountStore, UserStore};
use crate::error::Result;
use std::io::Read;
use tracing::{info, warn};

/// Counts from one seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub loaded: usize,
    pub existing: usize,
    pub rejected: usize,
}

impl SeedReport {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.loaded += 1;
        } else {
            self.existing += 1;
        }
    }
}

/// Inserts each discount whose id is not yet stored. Stored discounts keep
/// their `used` flag. Malformed rows are logged and skipped.
pub async fn seed_discounts<R: Read>(
    reader: DiscountReader<R>,
    store: &dyn DiscountStore,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    for discount in reader.discounts() {
        match discount {
            Ok(discount) => report.record(store.insert_if_absent(discount).await?),
            Err(e) => {
                warn!(error = %e, "Error reading discount");
                report.rejected += 1;
            }
        }
    }
    info!(
        loaded = report.loaded,
        existing = report.existing,
        "Loaded discounts"
    );
    Ok(report)
}

/// Inserts each user whose id is not yet stored. Stored users keep their
/// Square customer id.
pub async fn seed_users<R: Read>(
    reader: UserReader<R>,
    store: &dyn UserStore,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    for user in reader.users() {
        match user {
            Ok(user) => report.record(store.insert_if_absent(user).await?),
            Err(e) => {
                warn!(error = %e, "Error reading user");
                report.rejected += 1;
            }
        }
    }
    info!(
        loaded = report.loaded,
        existing = report.existing,
        "Loaded users"
    );
    Ok(report)
}
