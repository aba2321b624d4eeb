//! Stats module - aggregation helpers and the ten business hypotheses

mod calculator;
mod hypotheses;

pub use calculator::{
    filtered_mean, grouped_mean, mean, median, pct_change, pct_diff, StatsError,
};
pub use hypotheses::{HypothesisEvaluator, HypothesisSummary, SummaryRow};
