//! Feature Deriver Module
//! Cleans the joined raw table and enriches it with the derived columns
//! used by the hypothesis evaluator and the suggestion scorer.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

/// Year value standing in for "never renovated" (`yr_renovated == 0`).
pub const RENOVATION_SENTINEL_YEAR: i32 = 1900;

/// The property with 33 bedrooms in the source data is a data-entry error.
const BEDROOMS_TYPO: i64 = 33;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Derivation requires column '{0}'")]
    MissingColumn(String),
    #[error("{0} rows have a null 'date' after parsing")]
    NullDates(usize),
}

const REQUIRED_COLUMNS: [&str; 9] = [
    "id",
    "date",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_basement",
    "yr_built",
    "yr_renovated",
    "waterfront",
];

/// Applies the deterministic enrichment pipeline to the joined raw table.
///
/// Intended to run exactly once per load. The date-parse and waterfront
/// steps are gated on the incoming dtype so an accidental second
/// application leaves already-normalized columns untouched.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Produce the enriched table: dedup by `id`, parse `date`, normalize
    /// the year columns, drop the bedrooms typo row, and derive
    /// `renovated`, `basement`, `year` and `season`.
    pub fn enrich(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(ProcessorError::MissingColumn(name.to_string()));
            }
        }

        let date_is_string = matches!(df.column("date")?.dtype(), DataType::String);
        let waterfront_is_flag = matches!(
            df.column("waterfront")?.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        );

        let date_expr = if date_is_string {
            col("date").str().to_date(StrptimeOptions {
                format: None,
                ..Default::default()
            })
        } else {
            col("date")
        };

        let waterfront_expr = if waterfront_is_flag {
            when(col("waterfront").eq(lit(1)))
                .then(lit("yes"))
                .otherwise(lit("no"))
                .alias("waterfront")
        } else {
            col("waterfront")
        };

        let month = col("date").dt().month().cast(DataType::Int32);

        let enriched = df
            .clone()
            .lazy()
            // duplicate ids: keep the first occurrence
            .unique_stable(Some(vec!["id".into()]), UniqueKeepStrategy::First)
            .with_column(date_expr)
            .with_column(
                when(col("yr_renovated").eq(lit(0)))
                    .then(lit(RENOVATION_SENTINEL_YEAR))
                    .otherwise(col("yr_renovated"))
                    .cast(DataType::Int32)
                    .alias("yr_renovated"),
            )
            .with_column(
                when(col("yr_renovated").eq(lit(RENOVATION_SENTINEL_YEAR)))
                    .then(lit("no"))
                    .otherwise(lit("yes"))
                    .alias("renovated"),
            )
            .with_column(col("yr_built").cast(DataType::Int32))
            .filter(col("bedrooms").neq(lit(BEDROOMS_TYPO)))
            .with_column(
                when(col("sqft_basement").gt(lit(0)))
                    .then(lit("with basement"))
                    .otherwise(lit("without basement"))
                    .alias("basement"),
            )
            .with_column(col("date").dt().year().cast(DataType::Int32).alias("year"))
            .with_column(
                when(month.clone().gt_eq(lit(6)).and(month.clone().lt_eq(lit(8))))
                    .then(lit("summer"))
                    .when(month.clone().gt_eq(lit(9)).and(month.clone().lt_eq(lit(11))))
                    .then(lit("autumn"))
                    .when(month.clone().eq(lit(12)).or(month.lt_eq(lit(2))))
                    .then(lit("winter"))
                    .otherwise(lit("spring"))
                    .alias("season"),
            )
            .with_column(waterfront_expr)
            .collect()?;

        // A null date would silently mislabel season/year downstream.
        let null_dates = enriched.column("date")?.null_count();
        if null_dates > 0 {
            return Err(ProcessorError::NullDates(null_dates));
        }

        let enriched = Self::round_bathrooms(enriched)?;
        info!(rows = enriched.height(), "derived features");
        Ok(enriched)
    }

    /// Round `bathrooms` to two decimal places in place.
    fn round_bathrooms(mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        let rounded = df
            .column("bathrooms")?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .f64()?
            .apply_values(|v| (v * 100.0).round() / 100.0)
            .into_series()
            .with_name("bathrooms".into());
        df.with_column(rounded)?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> DataFrame {
        df!(
            "id" => [1i64, 1, 2, 3, 4],
            "date" => ["2014-07-15", "2014-07-15", "2015-01-10", "2014-10-02", "2014-04-01"],
            "price" => [300000.0, 300000.0, 450000.0, 275000.0, 520000.0],
            "bedrooms" => [3i64, 3, 33, 2, 4],
            "bathrooms" => [2.256, 2.256, 1.0, 1.75, 3.0],
            "sqft_living" => [1800i64, 1800, 2400, 1300, 2100],
            "sqft_basement" => [0i64, 0, 600, 0, 300],
            "condition" => [4i64, 4, 5, 3, 4],
            "waterfront" => [0i64, 0, 1, 0, 0],
            "yr_built" => [1962i64, 1962, 2001, 1987, 1955],
            "yr_renovated" => [0i64, 0, 2010, 0, 1999],
            "zipcode" => [98001i64, 98001, 98002, 98001, 98002],
            "lat" => [47.51, 47.51, 47.62, 47.50, 47.61],
            "long" => [-122.25, -122.25, -122.10, -122.26, -122.12],
        )
        .unwrap()
    }

    fn str_col(df: &DataFrame, name: &str) -> Vec<String> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn dedup_keeps_first_and_drops_bedrooms_typo() {
        let enriched = FeatureDeriver::enrich(&raw()).unwrap();
        // 5 rows -> dedup id 1 -> 4 -> drop bedrooms==33 -> 3
        assert_eq!(enriched.height(), 3);
        let bedrooms: Vec<i64> = enriched
            .column("bedrooms")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(bedrooms.iter().all(|&b| b != 33));
    }

    #[test]
    fn renovation_sentinel_and_flag() {
        let enriched = FeatureDeriver::enrich(&raw()).unwrap();
        let yr: Vec<i32> = enriched
            .column("yr_renovated")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        let flags = str_col(&enriched, "renovated");
        for (y, f) in yr.iter().zip(&flags) {
            assert_eq!(*f == "yes", *y != RENOVATION_SENTINEL_YEAR);
        }
        // id 1 had yr_renovated == 0
        assert_eq!(yr[0], RENOVATION_SENTINEL_YEAR);
        assert_eq!(flags[0], "no");
    }

    #[test]
    fn basement_waterfront_and_season() {
        let enriched = FeatureDeriver::enrich(&raw()).unwrap();
        assert_eq!(
            str_col(&enriched, "basement"),
            vec!["without basement", "without basement", "with basement"]
        );
        assert_eq!(str_col(&enriched, "waterfront"), vec!["no", "no", "no"]);
        // 2014-07-15 -> summer, 2014-10-02 -> autumn, 2014-04-01 -> spring
        assert_eq!(
            str_col(&enriched, "season"),
            vec!["summer", "autumn", "spring"]
        );
        let years: Vec<i32> = enriched
            .column("year")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(years, vec![2014, 2014, 2014]);
    }

    #[test]
    fn season_rule_covers_every_month() {
        let dates: Vec<String> = (1..=12).map(|m| format!("2014-{m:02}-15")).collect();
        let df = df!(
            "id" => (1..=12i64).collect::<Vec<_>>(),
            "date" => dates,
            "price" => vec![100000.0; 12],
            "bedrooms" => vec![2i64; 12],
            "bathrooms" => vec![1.0; 12],
            "sqft_living" => vec![1000i64; 12],
            "sqft_basement" => vec![0i64; 12],
            "condition" => vec![3i64; 12],
            "waterfront" => vec![0i64; 12],
            "yr_built" => vec![1990i64; 12],
            "yr_renovated" => vec![0i64; 12],
            "zipcode" => vec![98001i64; 12],
            "lat" => vec![47.5; 12],
            "long" => vec![-122.2; 12],
        )
        .unwrap();

        let enriched = FeatureDeriver::enrich(&df).unwrap();
        let expected = [
            "winter", "winter", "spring", "spring", "spring", "summer", "summer", "summer",
            "autumn", "autumn", "autumn", "winter",
        ];
        assert_eq!(str_col(&enriched, "season"), expected);
    }

    #[test]
    fn bathrooms_rounded_to_two_decimals() {
        let enriched = FeatureDeriver::enrich(&raw()).unwrap();
        let bathrooms: Vec<f64> = enriched
            .column("bathrooms")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!((bathrooms[0] - 2.26).abs() < 1e-9);
    }

    #[test]
    fn missing_column_fails_fast() {
        let df = df!("id" => [1i64], "date" => ["2014-07-15"]).unwrap();
        let err = FeatureDeriver::enrich(&df).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(_)));
    }

    #[test]
    fn reapplication_does_not_corrupt() {
        let once = FeatureDeriver::enrich(&raw()).unwrap();
        let twice = FeatureDeriver::enrich(&once).unwrap();
        assert_eq!(once.height(), twice.height());
        assert_eq!(str_col(&once, "waterfront"), str_col(&twice, "waterfront"));
        assert_eq!(str_col(&once, "season"), str_col(&twice, "season"));
        assert_eq!(str_col(&once, "renovated"), str_col(&twice, "renovated"));
    }
}
