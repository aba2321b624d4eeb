//! Hypothesis Evaluator Module
//! Ten fixed, independent descriptive comparisons over the enriched
//! dataset. Each evaluation is stateless and returns a small summary
//! table ready for bar/line charting.

use crate::data::RENOVATION_SENTINEL_YEAR;
use crate::stats::calculator::{
    filtered_mean, grouped_mean, mean, pct_change, pct_diff, StatsError,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// One labelled bar (or time bucket) of a hypothesis summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: f64,
    /// Change versus the previous row for the time-series hypotheses
    /// (H4, H5); `None` for the first period and for plain groupings.
    pub pct_change: Option<f64>,
}

impl SummaryRow {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            pct_change: None,
        }
    }
}

/// Chart-ready result of a single hypothesis.
#[derive(Debug, Clone, Serialize)]
pub struct HypothesisSummary {
    pub number: u8,
    pub title: String,
    pub group_label: String,
    pub metric_label: String,
    pub rows: Vec<SummaryRow>,
    /// Scalar comparison percentage, `(a/b - 1) * 100`. `None` for H5,
    /// whose comparison is the per-row change series.
    pub comparison_pct: Option<f64>,
}

impl HypothesisSummary {
    /// True for the hypotheses whose rows form a chronological series.
    pub fn is_time_series(&self) -> bool {
        self.rows.iter().any(|r| r.pct_change.is_some())
    }
}

/// Evaluates the ten business hypotheses. Order of evaluation is
/// irrelevant; no hypothesis reads another's result.
pub struct HypothesisEvaluator;

impl HypothesisEvaluator {
    pub fn evaluate_all(df: &DataFrame) -> Result<Vec<HypothesisSummary>, StatsError> {
        let summaries = vec![
            Self::h1_waterfront(df)?,
            Self::h2_built_before_1955(df)?,
            Self::h3_basement_area(df)?,
            Self::h4_price_by_year(df)?,
            Self::h5_three_bathrooms_monthly(df)?,
            Self::h6_renovation_period(df)?,
            Self::h7_bedroom_count(df)?,
            Self::h8_renovated(df)?,
            Self::h9_winter_prices(df)?,
            Self::h10_condition(df)?,
        ];
        for s in &summaries {
            debug!(number = s.number, rows = s.rows.len(), "evaluated hypothesis");
        }
        Ok(summaries)
    }

    /// H1: waterfront properties vs the rest, mean price.
    pub fn h1_waterfront(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let rows = grouped_mean(df, "waterfront", "price")?;
        let comparison = Self::compare_labels(&rows, "yes", "no");
        Ok(HypothesisSummary {
            number: 1,
            title: "Waterfront properties are more expensive".into(),
            group_label: "Waterfront?".into(),
            metric_label: "Average Price (U$)".into(),
            rows: rows
                .into_iter()
                .map(|(label, value)| SummaryRow::new(label, value))
                .collect(),
            comparison_pct: comparison,
        })
    }

    /// H2: construction date strictly before vs strictly after 1955.
    pub fn h2_built_before_1955(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let before = filtered_mean(df, col("yr_built").lt(lit(1955)), "price", "before 1955")?;
        let after = filtered_mean(df, col("yr_built").gt(lit(1955)), "price", "after 1955")?;
        Ok(HypothesisSummary {
            number: 2,
            title: "Pre-1955 construction is cheaper".into(),
            group_label: "Construction Period".into(),
            metric_label: "Average Price (U$)".into(),
            rows: vec![
                SummaryRow::new("before 1955", before),
                SummaryRow::new("after 1955", after),
            ],
            comparison_pct: Some(pct_diff(before, after)),
        })
    }

    /// H3: living area with vs without a basement.
    pub fn h3_basement_area(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let rows = grouped_mean(df, "basement", "sqft_living")?;
        let comparison = Self::compare_labels(&rows, "without basement", "with basement");
        Ok(HypothesisSummary {
            number: 3,
            title: "Properties without a basement are larger".into(),
            group_label: "Structure".into(),
            metric_label: "Average Living Area (sqft)".into(),
            rows: rows
                .into_iter()
                .map(|(label, value)| SummaryRow::new(label, value))
                .collect(),
            comparison_pct: comparison,
        })
    }

    /// H4: year-over-year mean price growth.
    pub fn h4_price_by_year(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let grouped = grouped_mean(df, "year", "price")?;
        let values: Vec<f64> = grouped.iter().map(|(_, v)| *v).collect();
        let changes = pct_change(&values);
        let rows = grouped
            .into_iter()
            .zip(changes)
            .map(|((label, value), change)| SummaryRow {
                label,
                value,
                pct_change: change,
            })
            .collect::<Vec<_>>();
        let comparison = if values.len() > 1 {
            Some(pct_diff(values[values.len() - 1], values[0]))
        } else {
            None
        };
        Ok(HypothesisSummary {
            number: 4,
            title: "YoY property price growth".into(),
            group_label: "Year".into(),
            metric_label: "Average Price (U$)".into(),
            rows,
            comparison_pct: comparison,
        })
    }

    /// H5: month-over-month mean price where `bathrooms == 3`.
    ///
    /// Buckets sort chronologically before the change series is computed;
    /// the first bucket's change is undefined. A single-bucket series is a
    /// documented edge case, not an error.
    pub fn h5_three_bathrooms_monthly(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let out = df
            .clone()
            .lazy()
            .filter(col("bathrooms").eq(lit(3.0)))
            .group_by([
                col("year"),
                col("date").dt().month().cast(DataType::Int32).alias("month"),
            ])
            .agg([col("price").cast(DataType::Float64).mean().alias("__mean")])
            .sort(["year", "month"], SortMultipleOptions::default())
            .collect()?;

        let years = out.column("year")?.as_materialized_series().i32()?.clone();
        let months = out.column("month")?.as_materialized_series().i32()?.clone();
        let means = out.column("__mean")?.as_materialized_series().f64()?.clone();

        let mut labels = Vec::with_capacity(out.height());
        let mut values = Vec::with_capacity(out.height());
        for i in 0..out.height() {
            if let (Some(y), Some(m), Some(v)) = (years.get(i), months.get(i), means.get(i)) {
                labels.push(format!("{y:04}-{m:02}"));
                values.push(v);
            }
        }

        let changes = pct_change(&values);
        let rows = labels
            .into_iter()
            .zip(values)
            .zip(changes)
            .map(|((label, value), change)| SummaryRow {
                label,
                value,
                pct_change: change,
            })
            .collect();
        Ok(HypothesisSummary {
            number: 5,
            title: "MoM price growth for 3-bathroom homes".into(),
            group_label: "Month/Year".into(),
            metric_label: "Average Price (U$)".into(),
            rows,
            comparison_pct: None,
        })
    }

    /// H6: renovated before vs from 2000 onwards, sentinel excluded.
    ///
    /// Two-stage mean: price is first averaged per renovation year, then
    /// the yearly means are averaged on each side of 2000.
    pub fn h6_renovation_period(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let per_year = df
            .clone()
            .lazy()
            .filter(col("yr_renovated").neq(lit(RENOVATION_SENTINEL_YEAR)))
            .group_by([col("yr_renovated")])
            .agg([col("price").cast(DataType::Float64).mean().alias("__mean")])
            .collect()?;

        let years = per_year
            .column("yr_renovated")?
            .as_materialized_series()
            .i32()?
            .clone();
        let means = per_year
            .column("__mean")?
            .as_materialized_series()
            .f64()?
            .clone();

        let mut before = Vec::new();
        let mut after = Vec::new();
        for i in 0..per_year.height() {
            if let (Some(y), Some(m)) = (years.get(i), means.get(i)) {
                if y < 2000 {
                    before.push(m);
                } else {
                    after.push(m);
                }
            }
        }
        let before =
            mean(&before).ok_or_else(|| StatsError::EmptyGroup("renovated before 2000".into()))?;
        let after =
            mean(&after).ok_or_else(|| StatsError::EmptyGroup("renovated after 2000".into()))?;

        Ok(HypothesisSummary {
            number: 6,
            title: "Renovations from 2000 onwards raise prices more".into(),
            group_label: "Reform Period".into(),
            metric_label: "Average Price (U$)".into(),
            rows: vec![
                SummaryRow::new("before 2000", before),
                SummaryRow::new("after 2000", after),
            ],
            comparison_pct: Some(pct_diff(after, before)),
        })
    }

    /// H7: up to 2 bedrooms vs 2 or more (overlapping buckets).
    pub fn h7_bedroom_count(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let small = filtered_mean(df, col("bedrooms").lt_eq(lit(2)), "price", "up to 2")?;
        let large = filtered_mean(df, col("bedrooms").gt_eq(lit(2)), "price", "more than 2")?;
        Ok(HypothesisSummary {
            number: 7,
            title: "Properties with up to 2 bedrooms are cheaper".into(),
            group_label: "Number of Bedrooms".into(),
            metric_label: "Average Price (U$)".into(),
            rows: vec![
                SummaryRow::new("up to 2", small),
                SummaryRow::new("more than 2", large),
            ],
            comparison_pct: Some(pct_diff(small, large)),
        })
    }

    /// H8: renovated vs unrenovated (sentinel check).
    pub fn h8_renovated(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let unrenovated = filtered_mean(
            df,
            col("yr_renovated").eq(lit(RENOVATION_SENTINEL_YEAR)),
            "price",
            "unrenovated",
        )?;
        let renovated = filtered_mean(
            df,
            col("yr_renovated").neq(lit(RENOVATION_SENTINEL_YEAR)),
            "price",
            "renovated",
        )?;
        Ok(HypothesisSummary {
            number: 8,
            title: "Renovated properties are more expensive".into(),
            group_label: "Condition".into(),
            metric_label: "Average Price (U$)".into(),
            rows: vec![
                SummaryRow::new("unrenovated", unrenovated),
                SummaryRow::new("renovated", renovated),
            ],
            comparison_pct: Some(pct_diff(renovated, unrenovated)),
        })
    }

    /// H9: per-season means, compared as winter vs the rest of the year.
    pub fn h9_winter_prices(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let rows = grouped_mean(df, "season", "price")?;
        let winter = filtered_mean(df, col("season").eq(lit("winter")), "price", "winter")?;
        let rest = filtered_mean(
            df,
            col("season").neq(lit("winter")),
            "price",
            "rest of the year",
        )?;
        Ok(HypothesisSummary {
            number: 9,
            title: "Winter is the cheapest season to buy".into(),
            group_label: "Buying Season".into(),
            metric_label: "Average Price (U$)".into(),
            rows: rows
                .into_iter()
                .map(|(label, value)| SummaryRow::new(label, value))
                .collect(),
            comparison_pct: Some(pct_diff(winter, rest)),
        })
    }

    /// H10: condition 4-5 vs the rest; the comparison is reported as an
    /// absolute percentage.
    pub fn h10_condition(df: &DataFrame) -> Result<HypothesisSummary, StatsError> {
        let best = filtered_mean(df, col("condition").gt_eq(lit(4)), "price", "best")?;
        let worst = filtered_mean(df, col("condition").lt(lit(4)), "price", "worst")?;
        Ok(HypothesisSummary {
            number: 10,
            title: "Better-condition properties are more expensive".into(),
            group_label: "Property Condition".into(),
            metric_label: "Average Price (U$)".into(),
            rows: vec![
                SummaryRow::new("best", best),
                SummaryRow::new("worst", worst),
            ],
            comparison_pct: Some(pct_diff(best, worst).abs()),
        })
    }

    fn compare_labels(rows: &[(String, f64)], a: &str, b: &str) -> Option<f64> {
        let a = rows.iter().find(|(label, _)| label == a)?.1;
        let b = rows.iter().find(|(label, _)| label == b)?.1;
        Some(pct_diff(a, b))
    }
}
