// Entry point and high-level flow.
//
// One forward pass over a fixed spreadsheet:
// - load the first worksheet and print shape, column info and a preview,
// - clean it (duplicates, missing values, date columns),
// - print descriptive statistics, the charts and a few insights.
// Any load or schema error stops the run with its message.
mod charts;
mod config;
mod error;
mod loader;
mod output;
mod prepare;
mod summary;
mod types;
mod util;

use config::AnalysisConfig;
use error::AnalysisError;
use std::error::Error;
use tracing::info;
use types::ListingTable;

fn init_tracing() {
    // Logs go to stderr so the report on stdout stays readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the dataset and print what it looks like before cleaning.
fn handle_load(config: &AnalysisConfig) -> Result<ListingTable, AnalysisError> {
    let (table, load_report) = loader::load_table(&config.data_file)?;
    println!("Dataset loaded successfully.\n");
    if load_report.blank_rows > 0 || load_report.parse_errors > 0 {
        println!(
            "Note: {} blank rows and {} unreadable rows skipped.\n",
            util::format_int(load_report.blank_rows),
            util::format_int(load_report.parse_errors)
        );
    }

    output::print_title("Dataset Information");
    println!(
        "{} rows x {} columns\n",
        util::format_int(table.height()),
        util::format_int(table.width())
    );
    let info_rows = summary::dataset_info(&table);
    output::preview_table_rows(&info_rows, info_rows.len());

    output::print_title(&format!("First {} Rows of Data", config.head_rows));
    output::print_grid(&table.columns, &summary::head(&table, config.head_rows));
    Ok(table)
}

/// Clean the table in place and report what changed.
fn handle_clean(table: &mut ListingTable) -> Result<(), AnalysisError> {
    println!("Data cleaning...");
    let report = prepare::prepare(table)?;
    println!(
        "Removed {} duplicate rows.",
        util::format_int(report.duplicates_removed + report.settle_duplicates_removed)
    );
    println!(
        "Filled {} names, {} countries and {} prices (mean price {}).",
        util::format_int(report.names_filled),
        util::format_int(report.countries_filled),
        util::format_int(report.prices_filled),
        util::format_number(report.price_fill_value, 2)
    );
    if !report.date_columns.is_empty() {
        println!(
            "Converted date columns [{}]; {} unparseable values set to missing.",
            report.date_columns.join(", "),
            util::format_int(report.dates_unparseable)
        );
    }
    println!("Missing values handled & data cleaned.\n");
    Ok(())
}

fn handle_summary(table: &ListingTable) {
    output::print_title("Dataset Summary");
    let stats = summary::describe(table);
    let (header, records) = summary::describe_grid(&stats);
    output::print_grid(&header, &records);
}

fn handle_insights(table: &ListingTable) -> Result<(), Box<dyn Error>> {
    let insights = summary::generate_insights(table).map_err(AnalysisError::from)?;
    output::print_title("Project Insights");
    if let Some(room) = &insights.most_common_room_type {
        println!("1. Most common room type is: {}", room);
    }
    println!(
        "2. Average price is approximately: ${}",
        util::format_number(insights.average_price, 2)
    );
    if let Some(n) = insights.distinct_countries {
        println!("3. Dataset contains listings from: {} countries.", n);
    }
    println!();
    output::print_json(&insights)?;
    Ok(())
}

fn run(config: &AnalysisConfig) -> Result<(), Box<dyn Error>> {
    let mut table = handle_load(config)?;
    handle_clean(&mut table)?;
    handle_summary(&table);
    charts::render_charts(&table, config).map_err(AnalysisError::from)?;
    handle_insights(&table)?;
    Ok(())
}

fn main() {
    init_tracing();
    let config = AnalysisConfig::default();
    info!("analysis started for {}", config.data_file);

    if let Err(e) = run(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    println!("Analysis completed.");
}
