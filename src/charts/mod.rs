//! Charts module - static chart rendering for hypothesis summaries

mod renderer;

pub use renderer::{ChartError, ChartRenderer};
