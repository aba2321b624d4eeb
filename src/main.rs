//! House Insights - Real-Estate Purchase Suggestion Engine
//!
//! Loads the property and address CSV files, derives analytical columns,
//! renders the ten hypothesis charts and prints the filtered suggestion
//! table with its financial totals.

use anyhow::Result;
use clap::Parser;
use house_insights::charts::ChartRenderer;
use house_insights::report;
use house_insights::{
    DataLoader, FeatureDeriver, HypothesisEvaluator, SuggestionFilter, SuggestionScorer,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Purchase-suggestion and insights engine for a real-estate portfolio.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the property-facts CSV.
    #[arg(long, default_value = "data/kc_house_data.csv")]
    properties: PathBuf,

    /// Path to the address CSV.
    #[arg(long, default_value = "data/address.csv")]
    addresses: PathBuf,

    /// Directory for chart images and JSON outputs.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Remove renovated properties from the suggestion table.
    #[arg(long)]
    exclude_renovated: bool,

    /// Remove properties with a water view.
    #[arg(long)]
    exclude_waterfront: bool,

    /// Keep only properties with at most this many bedrooms.
    #[arg(long, default_value_t = 11)]
    max_bedrooms: i64,

    /// Maximum number of suggestion rows to print.
    #[arg(long, default_value_t = 25)]
    table_rows: usize,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let mut loader = DataLoader::new(&cli.properties, &cli.addresses);
    let raw = loader.load()?;
    let enriched = FeatureDeriver::enrich(raw)?;

    let summaries = HypothesisEvaluator::evaluate_all(&enriched)?;
    let written = ChartRenderer::render_all(&summaries, &cli.out_dir)?;
    info!(charts = written.len(), "rendered hypothesis charts");
    report::write_summaries_json(&summaries, &cli.out_dir.join("hypotheses.json"))?;

    for summary in &summaries {
        if let Some(pct) = summary.comparison_pct {
            println!("H{}: {} ({:+.2}%)", summary.number, summary.title, pct);
        } else {
            println!("H{}: {}", summary.number, summary.title);
        }
    }

    let filter = SuggestionFilter {
        exclude_renovated: cli.exclude_renovated,
        exclude_waterfront: cli.exclude_waterfront,
        max_bedrooms: cli.max_bedrooms,
    };
    let table = SuggestionScorer::build(&enriched)?;
    let filtered = SuggestionScorer::apply_filter(&table, &filter)?;
    let totals = SuggestionScorer::financial_summary(&filtered)?;

    println!("\nSuggested Properties");
    println!("{}", report::dataframe_table(&filtered, cli.table_rows));
    println!("\nFinancial Results");
    println!("{}", report::financial_table(&totals));

    let locations = SuggestionScorer::location_list(&filtered)?;
    let records = report::location_records(&locations)?;
    report::write_locations_json(&records, &cli.out_dir.join("locations.json"))?;
    info!(
        suggestions = totals.properties,
        "wrote charts and location list"
    );
    Ok(())
}
