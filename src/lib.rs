//! House Insights - Real-Estate Purchase Suggestion Engine
//!
//! Loads a property sales dataset (two CSV files joined on `id`), derives
//! analytical columns, evaluates ten fixed business hypotheses and computes
//! a table of suggested purchases with resale price and profit.

pub mod charts;
pub mod data;
pub mod report;
pub mod stats;
pub mod suggestions;

pub use data::{DataLoader, FeatureDeriver};
pub use stats::{HypothesisEvaluator, HypothesisSummary, SummaryRow};
pub use suggestions::{FinancialSummary, SuggestionFilter, SuggestionScorer};
