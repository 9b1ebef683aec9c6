//! The donation pipeline: normalizes tokenized sheet rows into `Donation` records and
//! aggregates them into the `DonationReport` served by the API.

use crate::error::DataError;
use crate::model::mapping::{ColumnMap, Field};
use crate::model::when;
use crate::model::{last_updated, Amount, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The canonical fields of a donation sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub(crate) enum DonationField {
    Timestamp,
    Name,
    Amount,
    Receipt,
}

impl Field for DonationField {
    const ALL: &'static [Self] = &[
        DonationField::Timestamp,
        DonationField::Name,
        DonationField::Amount,
        DonationField::Receipt,
    ];

    fn aliases(self) -> &'static [&'static str] {
        match self {
            DonationField::Timestamp => &[
                "timestamp",
                "date",
                "time",
                "datetime",
                "submitted",
                "submission time",
            ],
            DonationField::Name => &["name", "donor", "donor name", "donor_name", "full name"],
            DonationField::Amount => &["amount", "donation", "donation amount", "value", "lkr"],
            DonationField::Receipt => &[
                "receipt",
                "receipt link",
                "receipt_url",
                "link",
                "url",
                "proof",
            ],
        }
    }
}

/// One normalized donation. Immutable once created; owned by the report's record list.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    timestamp: String,
    name: String,
    amount: Amount,
    receipt: String,
}

impl Donation {
    /// Normalizes one data row, or discards it.
    ///
    /// A row whose amount resolves to zero is not a donation (amounts are never negative,
    /// so zero covers every non-positive case). `row_number` is the 1-based spreadsheet
    /// row, used for the synthetic timestamp when the sheet has no timestamp column.
    fn from_row(map: &ColumnMap<DonationField>, row: &[String], row_number: usize) -> Option<Self> {
        let amount = Amount::parse(map.cell(DonationField::Amount, row).unwrap_or(""));
        if amount.is_zero() {
            return None;
        }
        Some(Self {
            timestamp: non_empty(map.cell(DonationField::Timestamp, row))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Row {row_number}")),
            name: non_empty(map.cell(DonationField::Name, row))
                .unwrap_or("Anonymous")
                .to_string(),
            amount,
            receipt: map
                .cell(DonationField::Receipt, row)
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn receipt(&self) -> &str {
        &self.receipt
    }
}

/// The aggregate computed from a donations sheet, shaped for JSON serialization.
///
/// Recomputed on every fetch; nothing here persists between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReport {
    total_amount: i64,
    total_donors: usize,
    target_amount: i64,
    percentage: f64,
    donations: Vec<Donation>,
    last_updated: String,
}

impl DonationReport {
    /// Runs the whole pipeline: tokenize, resolve columns once, normalize every row,
    /// aggregate and sort.
    ///
    /// # Errors
    /// - `DataError::EmptyInput` when the CSV has no data rows.
    /// - `DataError::NoValidRecords` when every row is discarded (no positive amounts).
    pub fn build(csv: &str, target_amount: i64) -> Result<Self, DataError> {
        let table = Table::parse(csv);
        if table.is_empty() {
            return Err(DataError::EmptyInput);
        }
        let map = ColumnMap::resolve(table.headers());

        let mut total_amount: i64 = 0;
        let mut donations = Vec::new();
        for (ix, row) in table.rows().iter().enumerate() {
            // The first data row sits on spreadsheet row 2, below the header.
            if let Some(donation) = Donation::from_row(&map, row, ix + 2) {
                total_amount += donation.amount.value();
                donations.push(donation);
            }
        }
        if donations.is_empty() {
            return Err(DataError::NoValidRecords);
        }
        debug!(
            "Processed {} donations totaling {} from {} rows",
            donations.len(),
            total_amount,
            table.len()
        );

        sort_newest_first(&mut donations);
        let percentage = (total_amount as f64 / target_amount as f64 * 100.0).min(100.0);

        Ok(Self {
            total_amount,
            total_donors: donations.len(),
            target_amount,
            percentage,
            donations,
            last_updated: last_updated(),
        })
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn total_donors(&self) -> usize {
        self.total_donors
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }
}

/// Sorts donations newest first. The fallback is per pair: only when either record of a
/// comparison lacks a parseable timestamp does that comparison use amount descending.
///
/// When dated and undated records mix, the pairwise comparison is not a total order, and
/// `slice::sort_by` panics when it detects one. A stable insertion sort accepts whatever
/// each comparison says, so the ordering stays defined for every sheet.
fn sort_newest_first(donations: &mut Vec<Donation>) {
    let mut keyed: Vec<(Option<i64>, Donation)> = donations
        .drain(..)
        .map(|d| {
            let millis = when::parse(&d.timestamp).map(|t| t.and_utc().timestamp_millis());
            (millis, d)
        })
        .collect();
    for i in 1..keyed.len() {
        let mut j = i;
        while j > 0 && sorts_before(&keyed[j], &keyed[j - 1]) {
            keyed.swap(j, j - 1);
            j -= 1;
        }
    }
    donations.extend(keyed.into_iter().map(|(_, d)| d));
}

/// True when `a` must appear before `b`: later timestamp first, or larger amount when
/// either side has no parseable timestamp.
fn sorts_before(a: &(Option<i64>, Donation), b: &(Option<i64>, Donation)) -> bool {
    match (a.0, b.0) {
        (Some(a_ts), Some(b_ts)) => a_ts > b_ts,
        _ => a.1.amount > b.1.amount,
    }
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.filter(|s| !s.trim().is_empty())
}
