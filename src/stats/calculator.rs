//! Statistics Calculator Module
//! Descriptive aggregation helpers shared by the hypothesis evaluator and
//! the suggestion scorer.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("No rows matched for '{0}'")]
    EmptyGroup(String),
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// Percentage difference of `a` relative to `b`: `(a/b - 1) * 100`.
pub fn pct_diff(a: f64, b: f64) -> f64 {
    (a / b - 1.0) * 100.0
}

/// Successive percentage change over an ordered series. The first period
/// has no predecessor, so its change is `None`.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i == 0 {
                None
            } else {
                Some(pct_diff(v, values[i - 1]))
            }
        })
        .collect()
}

/// Mean of `value_col` over the rows matching `predicate`.
/// `label` names the bucket in the empty-group error.
pub fn filtered_mean(
    df: &DataFrame,
    predicate: Expr,
    value_col: &str,
    label: &str,
) -> Result<f64, StatsError> {
    let filtered = df
        .clone()
        .lazy()
        .filter(predicate)
        .select([col(value_col).cast(DataType::Float64)])
        .collect()?;
    filtered
        .column(value_col)?
        .as_materialized_series()
        .f64()?
        .mean()
        .ok_or_else(|| StatsError::EmptyGroup(label.to_string()))
}

/// Mean of `value_col` per distinct value of `group_col`, sorted by the
/// group key ascending. Labels are stringified group values.
pub fn grouped_mean(
    df: &DataFrame,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<(String, f64)>, StatsError> {
    let out = df
        .clone()
        .lazy()
        .group_by([col(group_col)])
        .agg([col(value_col)
            .cast(DataType::Float64)
            .mean()
            .alias("__mean")])
        .sort([group_col], SortMultipleOptions::default())
        .collect()?;

    let groups = out.column(group_col)?.as_materialized_series().clone();
    let means = out.column("__mean")?.as_materialized_series().f64()?.clone();

    let mut rows = Vec::with_capacity(out.height());
    for i in 0..out.height() {
        let label = match groups.get(i) {
            Ok(v) if !v.is_null() => v.to_string().trim_matches('"').to_string(),
            _ => continue,
        };
        if let Some(m) = means.get(i) {
            rows.push((label, m));
        }
    }
    if rows.is_empty() {
        return Err(StatsError::EmptyGroup(group_col.to_string()));
    }
    Ok(rows)
}
