use crate::config::{COUNTRY_COLUMN, PRICE_COLUMN, ROOM_TYPE_COLUMN};
use crate::error::SchemaError;
use crate::types::{Cell, ColumnInfoRow, Insights, ListingTable};
use crate::util::{average, format_int, format_number, quantile, sample_std};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn require_column(table: &ListingTable, name: &str) -> Result<usize, SchemaError> {
    table
        .column_index(name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

/// Per-column non-missing counts and the kind of values each column holds.
pub fn dataset_info(table: &ListingTable) -> Vec<ColumnInfoRow> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut kinds: Vec<&'static str> = Vec::new();
            let mut non_null = 0usize;
            for cell in table.column(idx).filter(|c| !c.is_missing()) {
                non_null += 1;
                if !kinds.contains(&cell.kind()) {
                    kinds.push(cell.kind());
                }
            }
            let kind = match kinds.as_slice() {
                [] => "empty",
                [only] => *only,
                _ => "mixed",
            };
            ColumnInfoRow {
                position: idx,
                column: name.clone(),
                non_null: format!("{} non-null", format_int(non_null)),
                kind: kind.to_string(),
            }
        })
        .collect()
}

pub fn head(table: &ListingTable, n: usize) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .take(n)
        .map(|row| row.iter().map(Cell::to_string).collect())
        .collect()
}

/// Descriptive statistics for every purely numeric column.
pub fn describe(table: &ListingTable) -> Vec<ColumnStats> {
    (0..table.width())
        .filter(|&idx| table.is_numeric_column(idx))
        .map(|idx| {
            let values = table.numeric_values(idx);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            ColumnStats {
                column: table.columns[idx].clone(),
                count: values.len(),
                mean: average(&values),
                std: sample_std(&values),
                min,
                q25: quantile(values.clone(), 0.25),
                q50: quantile(values.clone(), 0.5),
                q75: quantile(values, 0.75),
                max,
            }
        })
        .collect()
}

/// Lay out `describe` output with statistics as rows and columns across.
pub fn describe_grid(stats: &[ColumnStats]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = vec![String::new()];
    header.extend(stats.iter().map(|s| s.column.clone()));

    let lines: [(&str, fn(&ColumnStats) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.q50),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];
    let records = lines
        .iter()
        .map(|(label, get)| {
            let mut record = vec![label.to_string()];
            record.extend(stats.iter().map(|s| format_number(get(s), 2)));
            record
        })
        .collect();
    (header, records)
}

/// Value counts of a column's non-missing cells, most frequent first.
/// Ties keep the order in which values first appear.
pub fn value_counts(table: &ListingTable, idx: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in table.column(idx).filter(|c| !c.is_missing()) {
        let label = cell.to_string();
        let e = counts.entry(label.clone()).or_insert(0);
        if *e == 0 {
            order.push(label);
        }
        *e += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|label| {
            let n = counts[&label];
            (label, n)
        })
        .collect();
    // `sort_by` is stable, which is what keeps the tie order.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Most frequent value; ties go to the smallest label.
pub fn mode(table: &ListingTable, idx: usize) -> Option<String> {
    let counts = value_counts(table, idx);
    let top = counts.first()?.1;
    counts
        .into_iter()
        .filter(|(_, n)| *n == top)
        .map(|(label, _)| label)
        .min()
}

pub fn generate_insights(table: &ListingTable) -> Result<Insights, SchemaError> {
    let room_idx = require_column(table, ROOM_TYPE_COLUMN)?;
    let price_idx = require_column(table, PRICE_COLUMN)?;

    let distinct_countries = table.column_index(COUNTRY_COLUMN).map(|idx| {
        table
            .column(idx)
            .filter(|c| !c.is_missing())
            .map(Cell::key)
            .collect::<HashSet<_>>()
            .len()
    });

    Ok(Insights {
        most_common_room_type: mode(table, room_idx),
        average_price: average(&table.numeric_values(price_idx)),
        distinct_countries,
    })
}
