//! Exercises the crate's public surface the way an external consumer does.

use fundboard::model::DonationReport;
use fundboard::{DataError, Result};

#[test]
fn test_result_alias_usable_externally() -> Result<()> {
    let report = DonationReport::build("Timestamp,Name,Amount\n2024-01-01,Alice,100\n", 1000)?;
    assert_eq!(report.total_amount(), 100);
    Ok(())
}

#[test]
fn test_data_error_exposed() {
    assert_eq!(
        DonationReport::build("", 1000).unwrap_err(),
        DataError::EmptyInput
    );
}
