//! Types that represent the core data model: the tokenized `Table`, the `Amount`
//! sanitizer, the column resolver, and the normalized `Donation`/`Expense` records with
//! their aggregate reports.

mod amount;
mod donation;
mod expense;
mod mapping;
mod table;
mod when;

pub use amount::Amount;
pub use donation::{Donation, DonationReport};
pub use expense::{Expense, ExpenseReport};
pub use table::Table;

use chrono::{SecondsFormat, Utc};

/// The `lastUpdated` stamp carried by every report, e.g. `2026-08-26T09:15:02.123Z`.
pub(crate) fn last_updated() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
