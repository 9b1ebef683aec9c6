//! The expense pipeline: normalizes tokenized sheet rows into `Expense` records and
//! aggregates them, including per-category sums, into the `ExpenseReport` served by the
//! API.

use crate::error::DataError;
use crate::model::mapping::{ColumnMap, Field};
use crate::model::when;
use crate::model::{last_updated, Amount, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The canonical fields of an expense sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub(crate) enum ExpenseField {
    Timestamp,
    ExpenseDate,
    Title,
    Category,
    Description,
    Amount,
    Receipt,
    Remarks,
    Invoice,
    Photos,
}

impl Field for ExpenseField {
    const ALL: &'static [Self] = &[
        ExpenseField::Timestamp,
        ExpenseField::ExpenseDate,
        ExpenseField::Title,
        ExpenseField::Category,
        ExpenseField::Description,
        ExpenseField::Amount,
        ExpenseField::Receipt,
        ExpenseField::Remarks,
        ExpenseField::Invoice,
        ExpenseField::Photos,
    ];

    fn aliases(self) -> &'static [&'static str] {
        match self {
            ExpenseField::Timestamp => &[
                "timestamp",
                "date",
                "time",
                "datetime",
                "submitted",
                "submission time",
            ],
            ExpenseField::ExpenseDate => &["expense date", "expense_date", "date"],
            ExpenseField::Title => &[
                "expense title",
                "title",
                "purpose",
                "expense title / purpose",
                "expense_title",
                "expense purpose",
            ],
            ExpenseField::Category => &[
                "category",
                "categories",
                "expense categories",
                "expense category",
                "expense_categories",
            ],
            ExpenseField::Description => &["description", "desc", "details"],
            ExpenseField::Amount => &["amount", "amount (lkr)", "amount(lkr)", "value", "lkr"],
            ExpenseField::Receipt => &[
                "receipt",
                "receipt link",
                "receipt_url",
                "link",
                "url",
                "proof",
            ],
            ExpenseField::Remarks => &["remarks", "remark", "notes", "note"],
            ExpenseField::Invoice => &["invoice", "invoice link", "invoice_url", "invoice url"],
            ExpenseField::Photos => &[
                "photos",
                "photos (if available)",
                "photos if available",
                "images",
                "images (if available)",
            ],
        }
    }

    /// Attachment columns get wildly varied wording, so accept any header that merely
    /// mentions them when no alias matched.
    fn contains_fallback(self) -> Option<&'static str> {
        match self {
            ExpenseField::Invoice => Some("invoice"),
            ExpenseField::Photos => Some("photo"),
            _ => None,
        }
    }
}

/// One normalized expense. Immutable once created; owned by the report's record list.
///
/// `timestamp` is the submission time and `expense_date` the actual date of the expense;
/// both are preserved independently and display logic downstream prefers the latter.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    timestamp: String,
    expense_date: String,
    title: String,
    category: String,
    description: String,
    amount: Amount,
    receipt: String,
    remarks: String,
    invoice: String,
    photos: String,
}

impl Expense {
    /// Normalizes one data row, or discards it.
    ///
    /// Unlike donations, a zero amount does not discard the row: a legitimate zero-cost
    /// entry, or a row carrying only descriptive text, is still an expense record. Only a
    /// row with a zero amount and nothing else in it is dropped.
    fn from_row(map: &ColumnMap<ExpenseField>, row: &[String], row_number: usize) -> Option<Self> {
        let amount = Amount::parse(map.cell(ExpenseField::Amount, row).unwrap_or(""));
        if amount.is_zero() && !row.iter().any(|v| !v.trim().is_empty()) {
            return None;
        }
        Some(Self {
            timestamp: non_empty(map.cell(ExpenseField::Timestamp, row))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Row {row_number}")),
            expense_date: text(map.cell(ExpenseField::ExpenseDate, row)),
            title: non_empty(map.cell(ExpenseField::Title, row))
                .unwrap_or("No title")
                .to_string(),
            category: non_empty(map.cell(ExpenseField::Category, row))
                .unwrap_or("Uncategorized")
                .to_string(),
            description: text(map.cell(ExpenseField::Description, row)),
            amount,
            receipt: text(map.cell(ExpenseField::Receipt, row)),
            remarks: text(map.cell(ExpenseField::Remarks, row)),
            invoice: text(map.cell(ExpenseField::Invoice, row)).trim().to_string(),
            photos: text(map.cell(ExpenseField::Photos, row)).trim().to_string(),
        })
    }

    /// The instant used for presentation ordering: the expense date when present,
    /// otherwise the submission timestamp; unparseable values order as the epoch.
    fn effective_millis(&self) -> i64 {
        if self.expense_date.trim().is_empty() {
            when::parse_millis_or_zero(&self.timestamp)
        } else {
            when::parse_millis_or_zero(&self.expense_date)
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn expense_date(&self) -> &str {
        &self.expense_date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn invoice(&self) -> &str {
        &self.invoice
    }

    pub fn photos(&self) -> &str {
        &self.photos
    }
}

/// The aggregate computed from an expenses sheet, shaped for JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    total_amount: i64,
    total_expenses: usize,
    expenses: Vec<Expense>,
    last_updated: String,
    categories: BTreeMap<String, i64>,
}

impl ExpenseReport {
    /// Runs the whole pipeline: tokenize, resolve columns once, normalize every row,
    /// accumulate category totals, aggregate and sort.
    ///
    /// # Errors
    /// - `DataError::EmptyInput` when the CSV has no data rows.
    /// - `DataError::NoValidRecords` when every row is discarded.
    pub fn build(csv: &str) -> Result<Self, DataError> {
        let table = Table::parse(csv);
        if table.is_empty() {
            return Err(DataError::EmptyInput);
        }
        let map = ColumnMap::resolve(table.headers());

        let mut total_amount: i64 = 0;
        let mut categories: BTreeMap<String, i64> = BTreeMap::new();
        let mut expenses = Vec::new();
        for (ix, row) in table.rows().iter().enumerate() {
            // The first data row sits on spreadsheet row 2, below the header.
            if let Some(expense) = Expense::from_row(&map, row, ix + 2) {
                total_amount += expense.amount.value();
                *categories.entry(expense.category.clone()).or_insert(0) +=
                    expense.amount.value();
                expenses.push(expense);
            }
        }
        if expenses.is_empty() {
            return Err(DataError::NoValidRecords);
        }
        debug!(
            "Processed {} expenses totaling {} across {} categories",
            expenses.len(),
            total_amount,
            categories.len()
        );

        // Newest first by effective date.
        expenses.sort_by_cached_key(|e| std::cmp::Reverse(e.effective_millis()));

        Ok(Self {
            total_amount,
            total_expenses: expenses.len(),
            expenses,
            last_updated: last_updated(),
            categories,
        })
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn total_expenses(&self) -> usize {
        self.total_expenses
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &BTreeMap<String, i64> {
        &self.categories
    }
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.filter(|s| !s.trim().is_empty())
}

fn text(cell: Option<&str>) -> String {
    cell.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::expense_csv;

    #[test]
    fn test_category_totals() {
        let csv = "Timestamp,Title,Category,Amount\n\
                   2024-01-01,Lunch,Food,50\n\
                   2024-01-02,Dinner,Food,30\n\
                   2024-01-03,Bus,Travel,20\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.total_amount(), 100);
        assert_eq!(report.categories().get("Food"), Some(&80));
        assert_eq!(report.categories().get("Travel"), Some(&20));
        assert_eq!(report.categories().len(), 2);
    }

    #[test]
    fn test_zero_amount_row_with_text_is_kept() {
        let csv = "Timestamp,Title,Category,Amount\n\
                   2024-01-01,Donated venue,Logistics,0\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.total_expenses(), 1);
        assert_eq!(report.expenses()[0].amount().value(), 0);
        assert_eq!(report.categories().get("Logistics"), Some(&0));
    }

    #[test]
    fn test_category_defaults_to_uncategorized() {
        let csv = "Timestamp,Title,Amount\n2024-01-01,Paint,500\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].category(), "Uncategorized");
        assert_eq!(report.categories().get("Uncategorized"), Some(&500));
    }

    #[test]
    fn test_title_defaults() {
        let csv = "Timestamp,Category,Amount\n2024-01-01,Food,500\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].title(), "No title");
    }

    #[test]
    fn test_expense_date_and_timestamp_kept_distinct() {
        let csv = "Timestamp,Expense Date,Title,Amount\n\
                   1/5/2024 10:00:00,2024-01-03,Paint,500\n";
        let report = ExpenseReport::build(csv).unwrap();
        let e = &report.expenses()[0];
        assert_eq!(e.timestamp(), "1/5/2024 10:00:00");
        assert_eq!(e.expense_date(), "2024-01-03");
    }

    #[test]
    fn test_sort_prefers_expense_date_over_timestamp() {
        // The older submission has the newer expense date and must sort first.
        let csv = "Timestamp,Expense Date,Title,Amount\n\
                   1/1/2024 10:00:00,2024-03-01,Late,100\n\
                   2/1/2024 10:00:00,2024-02-01,Early,100\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].title(), "Late");
    }

    #[test]
    fn test_sort_falls_back_to_timestamp() {
        let csv = "Timestamp,Title,Amount\n\
                   2024-01-01,Old,100\n\
                   2024-02-01,New,100\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].title(), "New");
    }

    #[test]
    fn test_undated_records_sort_last() {
        let csv = "Timestamp,Title,Amount\n\
                   2024-02-01,Dated,100\n\
                   not a date,Undated,900\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[1].title(), "Undated");
    }

    #[test]
    fn test_invoice_fallback_header() {
        let csv = "Timestamp,Title,Amount,Upload your invoice here\n\
                   2024-01-01,Paint,500, https://example.com/inv.pdf \n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].invoice(), "https://example.com/inv.pdf");
    }

    #[test]
    fn test_photos_fallback_header() {
        let csv = "Timestamp,Title,Amount,Any photos?\n\
                   2024-01-01,Paint,500,https://example.com/p.jpg\n";
        let report = ExpenseReport::build(csv).unwrap();
        assert_eq!(report.expenses()[0].photos(), "https://example.com/p.jpg");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(ExpenseReport::build("").unwrap_err(), DataError::EmptyInput);
        assert_eq!(
            ExpenseReport::build("Timestamp,Title,Amount\n").unwrap_err(),
            DataError::EmptyInput
        );
    }

    #[test]
    fn test_fixture_report_shape() {
        let report = ExpenseReport::build(expense_csv()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("totalAmount").is_some());
        assert!(json.get("totalExpenses").is_some());
        assert!(json.get("categories").is_some());
        assert!(json.get("lastUpdated").is_some());
        let first = &json["expenses"][0];
        for key in [
            "timestamp",
            "expenseDate",
            "title",
            "category",
            "description",
            "amount",
            "receipt",
            "remarks",
            "invoice",
            "photos",
        ] {
            assert!(first.get(key).is_some(), "missing key {key}");
        }
    }
}
