// Dataset preparation: duplicate removal, missing-value fills and date
// coercion.
//
// Steps run in a fixed order on a table the caller owns:
// 1. Deduplicate (whole-row equality, first occurrence wins)
// 2. FillMissing (`Name`, `country` → "Unknown"; `price` → mean)
// 3. CoerceDates (every column whose name contains "date")
// 4. Deduplicate again, since 2 and 3 can turn distinct rows into equal ones

use crate::config::{COUNTRY_COLUMN, DATE_MARKER, NAME_COLUMN, PRICE_COLUMN, UNKNOWN};
use crate::error::SchemaError;
use crate::types::{Cell, CellKey, ListingTable};
use crate::util::{average, parse_datetime_safe};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareReport {
    pub duplicates_removed: usize,
    pub settle_duplicates_removed: usize,
    pub names_filled: usize,
    pub countries_filled: usize,
    pub prices_filled: usize,
    pub price_fill_value: f64,
    pub date_columns: Vec<String>,
    pub dates_unparseable: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub names_filled: usize,
    pub countries_filled: usize,
    pub prices_filled: usize,
    pub price_fill_value: f64,
}

/// Run the full preparation pass.
///
/// The final deduplication also drops rows that only became equal through
/// filling or coercion. For `[100, None, 100]` with matching `Name` and
/// `country`, the filled second row equals the first, so one row is left
/// rather than two; a plain drop-then-fill pass would keep both.
pub fn prepare(table: &mut ListingTable) -> Result<PrepareReport, SchemaError> {
    let duplicates_removed = deduplicate(table);
    let fill = fill_missing(table)?;
    let date_columns = date_columns(&table.columns);
    let dates_unparseable = coerce_dates(table, &date_columns);
    let settle_duplicates_removed = deduplicate(table);

    let report = PrepareReport {
        duplicates_removed,
        settle_duplicates_removed,
        names_filled: fill.names_filled,
        countries_filled: fill.countries_filled,
        prices_filled: fill.prices_filled,
        price_fill_value: fill.price_fill_value,
        date_columns: date_columns
            .iter()
            .map(|&i| table.columns[i].clone())
            .collect(),
        dates_unparseable,
    };
    info!(
        duplicates = report.duplicates_removed + report.settle_duplicates_removed,
        prices_filled = report.prices_filled,
        date_columns = report.date_columns.len(),
        rows = table.height(),
        "dataset prepared"
    );
    Ok(report)
}

/// Remove rows that equal an earlier row in every column. Returns the number
/// of rows removed.
pub fn deduplicate(table: &mut ListingTable) -> usize {
    let before = table.height();
    let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(before);
    table
        .rows
        .retain(|row| seen.insert(row.iter().map(Cell::key).collect()));
    let removed = before - table.height();
    if removed > 0 {
        debug!("Removed {} duplicate rows", removed);
    } else {
        debug!("No duplicate rows found");
    }
    removed
}

/// Fill `Name` and `country` with "Unknown" and `price` with the mean of
/// its non-missing values. The mean is taken once, before any substitution.
///
/// `Name` and `country` are optional; a table without `price` is rejected.
pub fn fill_missing(table: &mut ListingTable) -> Result<FillReport, SchemaError> {
    let price_idx = table
        .column_index(PRICE_COLUMN)
        .ok_or_else(|| SchemaError::MissingColumn(PRICE_COLUMN.to_string()))?;
    let price_fill_value = column_mean(table, price_idx)?;

    let names_filled = fill_column(table, NAME_COLUMN, || Cell::Text(UNKNOWN.to_string()));
    let countries_filled =
        fill_column(table, COUNTRY_COLUMN, || Cell::Text(UNKNOWN.to_string()));
    let prices_filled = fill_column(table, PRICE_COLUMN, || Cell::Number(price_fill_value));

    Ok(FillReport {
        names_filled,
        countries_filled,
        prices_filled,
        price_fill_value,
    })
}

fn column_mean(table: &ListingTable, idx: usize) -> Result<f64, SchemaError> {
    let mut values = Vec::with_capacity(table.height());
    for (row, cell) in table.column(idx).enumerate() {
        match cell {
            Cell::Missing => {}
            Cell::Number(n) => values.push(*n),
            other => {
                return Err(SchemaError::NonNumeric {
                    column: table.columns[idx].clone(),
                    row,
                    value: other.to_string(),
                })
            }
        }
    }
    if values.is_empty() {
        return Err(SchemaError::NoValidValues(table.columns[idx].clone()));
    }
    Ok(average(&values))
}

fn fill_column(table: &mut ListingTable, name: &str, fill: impl Fn() -> Cell) -> usize {
    let Some(idx) = table.column_index(name) else {
        info!("column '{}' not present, skipping fill", name);
        return 0;
    };
    let mut filled = 0;
    for row in &mut table.rows {
        if row[idx].is_missing() {
            row[idx] = fill();
            filled += 1;
        }
    }
    if filled > 0 {
        debug!("Filled {} missing values in '{}'", filled, name);
    }
    filled
}

pub fn is_date_column(name: &str) -> bool {
    name.to_lowercase().contains(DATE_MARKER)
}

/// Positions of the columns CoerceDates will touch, fixed up front.
pub fn date_columns(columns: &[String]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, name)| is_date_column(name))
        .map(|(i, _)| i)
        .collect()
}

/// Parse every value of the given columns into a datetime. Anything that
/// does not parse becomes `Cell::Missing`. Returns how many non-missing
/// values were replaced that way.
pub fn coerce_dates(table: &mut ListingTable, targets: &[usize]) -> usize {
    let mut unparseable = 0;
    for &idx in targets {
        let mut column_failures = 0;
        for row in &mut table.rows {
            let coerced = coerce_date_cell(&row[idx]);
            if coerced.is_missing() && !row[idx].is_missing() {
                column_failures += 1;
            }
            row[idx] = coerced;
        }
        if column_failures > 0 {
            debug!(
                "{} values in '{}' could not be parsed as dates",
                column_failures, table.columns[idx]
            );
        }
        unparseable += column_failures;
    }
    unparseable
}

fn coerce_date_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::DateTime(dt) => Cell::DateTime(*dt),
        Cell::Text(s) => parse_datetime_safe(Some(s))
            .map(Cell::DateTime)
            .unwrap_or(Cell::Missing),
        // Bare numbers and booleans are not read as dates.
        _ => Cell::Missing,
    }
}
