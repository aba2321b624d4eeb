//! Report Module
//! Terminal tables for the suggestion view and JSON outputs consumed by
//! the presentation layer.

use crate::stats::HypothesisSummary;
use crate::suggestions::FinancialSummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One marker on the point map.
#[derive(Debug, Clone, Serialize)]
pub struct LocationRecord {
    pub id: i64,
    pub price: f64,
    pub lat: f64,
    pub long: f64,
}

/// Render up to `limit` rows of a DataFrame as a terminal table.
pub fn dataframe_table(df: &DataFrame, limit: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    );
    let n = df.height().min(limit);
    for i in 0..n {
        let row: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| {
                c.get(i)
                    .map(|v| v.to_string().trim_matches('"').to_string())
                    .unwrap_or_default()
            })
            .collect();
        table.add_row(row);
    }
    table
}

/// The financial-results row: count, total investment, total profit.
pub fn financial_table(summary: &FinancialSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Number of Properties",
        "Total Investment (U$)",
        "Total Profit (U$)",
    ]);
    table.add_row(vec![
        summary.properties.to_string(),
        format!("{:.2}", summary.total_investment),
        format!("{:.2}", summary.total_profit),
    ]);
    table
}

/// Convert the `[id, price, lat, long]` projection into serializable
/// records for the map.
pub fn location_records(df: &DataFrame) -> Result<Vec<LocationRecord>, ReportError> {
    let ids = df
        .column("id")?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let prices = df
        .column("price")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let lats = df
        .column("lat")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let longs = df
        .column("long")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let ids = ids.i64()?;
    let prices = prices.f64()?;
    let lats = lats.f64()?;
    let longs = longs.f64()?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(id), Some(price), Some(lat), Some(long)) =
            (ids.get(i), prices.get(i), lats.get(i), longs.get(i))
        {
            records.push(LocationRecord {
                id,
                price,
                lat,
                long,
            });
        }
    }
    Ok(records)
}

/// Write the hypothesis summaries as pretty-printed JSON.
pub fn write_summaries_json(
    summaries: &[HypothesisSummary],
    path: &Path,
) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(summaries)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write the location list as pretty-printed JSON.
pub fn write_locations_json(records: &[LocationRecord], path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
