//! Data module - CSV loading, joining and feature derivation

mod loader;
mod processor;

pub use loader::{join_on_id, DataLoader, LoaderError};
pub use processor::{FeatureDeriver, ProcessorError, RENOVATION_SENTINEL_YEAR};
