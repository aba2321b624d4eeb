//! Suggestions module - purchase recommendation scoring and filtering

mod scorer;

pub use scorer::{
    FinancialSummary, SuggestError, SuggestionFilter, SuggestionScorer, NOT_SUGGESTED, SUGGESTED,
};
