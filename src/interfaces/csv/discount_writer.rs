use crate::domain::discount::ActiveDiscount;
use crate::error::Result;
use std::io::Write;

/// Writes discounts as CSV with header `id,percentage,expiration`.
pub struct DiscountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DiscountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_discounts<I>(&mut self, discounts: I) -> Result<()>
    where
        I: IntoIterator<Item = ActiveDiscount>,
    {
        // Header is written even when there are no rows.
        self.writer
            .write_record(["id", "percentage", "expiration"])?;
        for discount in discounts {
            let expiration = discount
                .expiration
                .map(|e| e.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                .unwrap_or_default();
            self.writer.write_record([
                discount.id.to_string(),
                discount.percentage.to_string(),
                expiration,
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
