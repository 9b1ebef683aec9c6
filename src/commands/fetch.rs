use crate::api::{self, Dataset, Mode};
use crate::commands::Out;
use crate::model::{DonationReport, ExpenseReport};
use crate::{Config, Result};
use anyhow::Context;
use serde_json::Value;

/// Fetches one dataset, runs it through the pipeline and prints the aggregate JSON to
/// stdout. Useful for checking what the dashboard will show without running the server.
pub async fn fetch(config: &Config, dataset: Dataset, mode: Mode) -> Result<Out<Value>> {
    let source = api::source(config, dataset, mode);
    let csv = source.fetch().await?;
    let report = match dataset {
        Dataset::Donations => {
            let report = DonationReport::build(&csv, config.target_amount())?;
            serde_json::to_value(&report)
        }
        Dataset::Expenses => {
            let report = ExpenseReport::build(&csv)?;
            serde_json::to_value(&report)
        }
    }
    .context("Unable to serialize the report")?;
    let pretty = serde_json::to_string_pretty(&report)
        .context("Unable to serialize the report")?;
    println!("{pretty}");
    Ok(Out::new(format!("Fetched the {dataset} dataset"), report))
}
