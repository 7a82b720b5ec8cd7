// Entry point and high-level CLI flow.
//
// Each subcommand is one batch pass over an in-memory table:
// - `products` loads the sales CSV, runs ABC analysis, multi-criteria ABC
//   and the per-country multi-criteria breakdown.
// - `suppliers` loads the supplier survey CSV, scores risk and places every
//   supplier on Kraljic's matrix.
// All classification finishes before any report is written, so a bad row
// aborts the run without leaving a partial set of files behind.
mod abc;
mod aggregate;
mod config;
mod error;
mod kraljic;
mod loader;
mod multi_criteria;
mod output;
mod reports;
mod risk;
mod types;
mod util;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{AnalysisArgs, AnalysisConfig};
use error::SegmentResult;
use kraljic::SupplierPosition;
use loader::{LoadReport, DEFAULT_SUPPLIER_ID_COLUMN};
use types::AbcRow;

/// Product and supplier segmentation reports
#[derive(Parser)]
#[command(
    name = "segment_report",
    version,
    about = "Product and supplier segmentation reports",
    long_about = "Classifies products with ABC and multi-criteria ABC analysis \
                  (globally and per country) and suppliers with Kraljic's matrix. \
                  Results are written as CSV tables plus a JSON summary."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    analysis: AnalysisArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// ABC and multi-criteria ABC analysis of a sales table
    Products(ProductArgs),
    /// Kraljic's matrix segmentation of a supplier survey table
    Suppliers(SupplierArgs),
    /// Print version information
    Version,
}

#[derive(Args)]
struct ProductArgs {
    /// Sales CSV (PRODUCTCODE, COUNTRY, QUANTITYORDERED, SALES)
    #[arg(short, long)]
    input: PathBuf,

    /// Also export the product mix counts of a single country
    #[arg(long)]
    country: Option<String>,
}

#[derive(Args)]
struct SupplierArgs {
    /// Supplier survey CSV (<DIMENSION>_Q1..Q5, PRICEEACH, QUANTITYORDERED)
    #[arg(short, long)]
    input: PathBuf,

    /// Column holding the supplier name; row numbers are used when absent
    #[arg(long, default_value = DEFAULT_SUPPLIER_ID_COLUMN)]
    id_column: String,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(report.total_rows),
        util::format_int(report.loaded_rows)
    );
    if report.duplicate_rows > 0 {
        println!("Note: {} duplicate rows dropped.", util::format_int(report.duplicate_rows));
    }
    if report.incomplete_rows > 0 {
        println!(
            "Note: {} rows dropped due to empty fields.",
            util::format_int(report.incomplete_rows)
        );
    }
    println!();
}

fn file_slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Handle `products`: classify first, then write every report.
fn handle_products(args: ProductArgs, config: &AnalysisConfig) -> SegmentResult<()> {
    let (records, load_report) = loader::load_sales(&args.input)?;
    print_load_report(&load_report);

    let grouped = aggregate::by_product(&records);
    let by_store = aggregate::by_country_product(&records);
    info!(products = grouped.len(), store_groups = by_store.len(), "sales aggregated");

    let quantities: Vec<(String, f64)> = grouped.iter().map(|g| (g.key.clone(), g.total_quantity)).collect();
    let abc_results = abc::classify(&quantities, &config.thresholds)?;
    let mix = multi_criteria::classify(&grouped, &config.thresholds)?;
    let store_mix = multi_criteria::classify_partitioned(&by_store, |k| k.country.clone(), &config.thresholds)?;

    println!("Generating reports...\n");
    let n = config.preview_rows;

    let abc_table: Vec<AbcRow> = reports::abc_rows(&abc_results);
    let path = config.out_path("abc_analysis.csv");
    output::write_csv(&path, &abc_table)?;
    output::preview_table("Report 1: ABC Analysis (by total quantity)", &abc_table, n, &path);

    let tiers = reports::tier_summary(&abc_results);
    let path = config.out_path("abc_summary.csv");
    output::write_csv(&path, &tiers)?;
    output::preview_table("Report 2: ABC Category Summary", &tiers, 3, &path);

    let mix_table = reports::product_mix_rows(&mix);
    let path = config.out_path("product_mix.csv");
    output::write_csv(&path, &mix_table)?;
    output::preview_table("Report 3: Multi-Criteria ABC Analysis", &mix_table, n, &path);

    let mix_counts = reports::mix_summary(&mix);
    let path = config.out_path("product_mix_summary.csv");
    output::write_csv(&path, &mix_counts)?;
    output::preview_table("Report 4: Product Mix Summary", &mix_counts, 9, &path);

    let store_table = reports::store_mix_rows(&store_mix);
    let path = config.out_path("store_product_mix.csv");
    output::write_csv(&path, &store_table)?;
    output::preview_table("Report 5: Multi-Criteria ABC Analysis by Country", &store_table, n, &path);

    let store_counts = reports::store_mix_counts(&store_mix);
    let path = config.out_path("store_mix_counts.csv");
    output::write_csv(&path, &store_counts)?;
    output::preview_table("Report 6: Product Mix Counts by Country", &store_counts, n, &path);

    if let Some(country) = args.country.as_deref() {
        let rows = reports::country_mix(&store_counts, country);
        if rows.is_empty() {
            warn!(country, "no sales found for country");
        }
        let path = config.out_path(&format!("country_mix_{}.csv", file_slug(country)));
        output::write_csv(&path, &rows)?;
        output::preview_table(&format!("Product Mix: {}", country), &rows, 9, &path);
    }

    let summary = reports::generate_product_summary(
        &load_report,
        &config.thresholds,
        &abc_results,
        &mix,
        &store_mix,
    );
    output::write_json(&config.out_path("product_summary.json"), &summary)?;
    println!("Summary Stats (product_summary.json):");
    println!(
        "{{\"total_products\": {}, \"total_countries\": {}, \"abc_counts\": {}}}\n",
        summary.total_products,
        summary.total_countries,
        serde_json::to_string(&summary.abc_counts)?
    );
    Ok(())
}

/// Handle `suppliers`: score, classify, then write every report.
fn handle_suppliers(args: SupplierArgs, config: &AnalysisConfig) -> SegmentResult<()> {
    let (raw_rows, load_report) = loader::load_suppliers(&args.input, &args.id_column)?;
    print_load_report(&load_report);

    let suppliers = risk::score_all(&raw_rows)?;
    let positions: Vec<SupplierPosition> = suppliers.iter().map(SupplierPosition::from).collect();
    let outcome = kraljic::classify(&positions, config.risk_cutoff)?;
    if let Some(median) = outcome.value_median {
        info!(median, "supplier value median");
    }

    println!("Generating reports...\n");
    let n = config.preview_rows;

    let matrix = reports::kraljic_rows(&suppliers, &outcome.results);
    let path = config.out_path("kraljic.csv");
    output::write_csv(&path, &matrix)?;
    output::preview_table("Report 1: Kraljic's Matrix", &matrix, n, &path);

    let quadrants = reports::quadrant_summary(&outcome.results);
    let path = config.out_path("quadrant_summary.csv");
    output::write_csv(&path, &quadrants)?;
    output::preview_table("Report 2: Suppliers per Quadrant", &quadrants, 4, &path);

    let distribution = reports::risk_distribution(&outcome.results);
    let path = config.out_path("risk_distribution.csv");
    output::write_csv(&path, &distribution)?;
    output::preview_table("Report 3: Risk Index Distribution", &distribution, n, &path);

    let summary = reports::generate_supplier_summary(&load_report, config.risk_cutoff, &outcome);
    output::write_json(&config.out_path("supplier_summary.json"), &summary)?;
    println!("Summary Stats (supplier_summary.json):");
    println!(
        "{{\"value_median\": {}, \"quadrant_counts\": {}}}\n",
        outcome
            .value_median
            .map(|m| util::format_number(m, 2))
            .unwrap_or_else(|| "null".to_string()),
        serde_json::to_string(&summary.quadrant_counts)?
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Version => {
            println!("segment_report {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        command => AnalysisConfig::try_from(cli.analysis).and_then(|config| match command {
            Commands::Products(args) => handle_products(args, &config),
            Commands::Suppliers(args) => handle_suppliers(args, &config),
            Commands::Version => Ok(()),
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
