//! CSV Data Loader Module
//! Reads the property-facts and address tables and joins them on `id`.

use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Column carried by the properties export that is internal to the scraping
/// step and never used downstream.
const QUERY_COLUMN: &str = "query";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Input '{0}' has no 'id' key column")]
    MissingKeyColumn(String),
    #[error("Joining properties and addresses on 'id' produced zero rows")]
    EmptyJoin,
    #[error("No data loaded")]
    NoData,
}

/// Loads the two tabular inputs and memoizes the joined raw dataset.
///
/// The memo is read-only after load; derivation and scoring operate on
/// copies, so repeated renders can share it safely.
pub struct DataLoader {
    properties_path: PathBuf,
    addresses_path: PathBuf,
    df: Option<DataFrame>,
}

impl DataLoader {
    pub fn new(properties_path: impl Into<PathBuf>, addresses_path: impl Into<PathBuf>) -> Self {
        Self {
            properties_path: properties_path.into(),
            addresses_path: addresses_path.into(),
            df: None,
        }
    }

    /// Load both CSV files and inner-join them on `id`, dropping the
    /// internal `query` column. The result is memoized; subsequent calls
    /// return the cached DataFrame without touching the filesystem.
    pub fn load(&mut self) -> Result<&DataFrame, LoaderError> {
        if self.df.is_none() {
            let properties = Self::read_csv(&self.properties_path)?;
            let addresses = Self::read_csv(&self.addresses_path)?;
            let joined = join_on_id(properties, addresses)?;
            info!(rows = joined.height(), "loaded raw dataset");
            self.df = Some(joined);
        }
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get a reference to the joined DataFrame, if loaded.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get the number of rows in the joined DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    fn read_csv(path: &PathBuf) -> Result<DataFrame, LoaderError> {
        // Lazy scan for memory efficiency, then collect
        let df = LazyCsvReader::new(path.clone())
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }
}

/// Inner-join the property-facts table with the address table on `id`.
///
/// Fails if either side lacks the `id` column or the join is empty; both
/// are treated as fatal configuration errors by the caller.
pub fn join_on_id(properties: DataFrame, addresses: DataFrame) -> Result<DataFrame, LoaderError> {
    require_id(&properties, "properties")?;
    require_id(&addresses, "addresses")?;

    let mut joined = properties
        .lazy()
        .join(
            addresses.lazy(),
            [col("id")],
            [col("id")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    if has_column(&joined, QUERY_COLUMN) {
        joined = joined.drop(QUERY_COLUMN)?;
    }

    if joined.height() == 0 {
        return Err(LoaderError::EmptyJoin);
    }
    Ok(joined)
}

fn require_id(df: &DataFrame, name: &str) -> Result<(), LoaderError> {
    if has_column(df, "id") {
        Ok(())
    } else {
        Err(LoaderError::MissingKeyColumn(name.to_string()))
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn props() -> DataFrame {
        df!(
            "id" => [1i64, 2, 3],
            "price" => [221900.0, 538000.0, 180000.0],
            "query" => ["q1", "q2", "q3"],
        )
        .unwrap()
    }

    fn addrs() -> DataFrame {
        df!(
            "id" => [1i64, 2, 3],
            "road" => ["Main St", "Oak Ave", "Pine Rd"],
            "house_number" => [12i64, 7, 90],
        )
        .unwrap()
    }

    #[test]
    fn join_keeps_all_columns_except_query() {
        let joined = join_on_id(props(), addrs()).unwrap();
        assert_eq!(joined.height(), 3);
        let names: Vec<String> = joined
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.contains(&"price".to_string()));
        assert!(names.contains(&"road".to_string()));
        assert!(!names.contains(&"query".to_string()));
    }

    #[test]
    fn join_is_inner() {
        let addrs = df!(
            "id" => [2i64],
            "road" => ["Oak Ave"],
            "house_number" => [7i64],
        )
        .unwrap();
        let joined = join_on_id(props(), addrs).unwrap();
        assert_eq!(joined.height(), 1);
    }

    #[test]
    fn missing_id_is_fatal() {
        let bad = df!("road" => ["Main St"]).unwrap();
        let err = join_on_id(props(), bad).unwrap_err();
        assert!(matches!(err, LoaderError::MissingKeyColumn(_)));
    }

    #[test]
    fn empty_join_is_fatal() {
        let addrs = df!(
            "id" => [99i64],
            "road" => ["Nowhere"],
            "house_number" => [0i64],
        )
        .unwrap();
        let err = join_on_id(props(), addrs).unwrap_err();
        assert!(matches!(err, LoaderError::EmptyJoin));
    }

    #[test]
    fn loads_and_memoizes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let p_path = dir.path().join("props.csv");
        let a_path = dir.path().join("addrs.csv");

        let mut f = std::fs::File::create(&p_path).unwrap();
        writeln!(f, "id,price,query").unwrap();
        writeln!(f, "1,221900.0,q1").unwrap();
        writeln!(f, "2,538000.0,q2").unwrap();

        let mut f = std::fs::File::create(&a_path).unwrap();
        writeln!(f, "id,road,house_number").unwrap();
        writeln!(f, "1,Main St,12").unwrap();
        writeln!(f, "2,Oak Ave,7").unwrap();

        let mut loader = DataLoader::new(&p_path, &a_path);
        assert_eq!(loader.get_row_count(), 0);
        loader.load().unwrap();
        assert_eq!(loader.get_row_count(), 2);

        // Deleting the files must not matter: the dataset is memoized.
        drop(dir);
        loader.load().unwrap();
        assert_eq!(loader.get_row_count(), 2);
    }
}
