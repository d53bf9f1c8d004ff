// Terminal charts for the cleaned dataset.
//
// Each chart is computed into plain data first and then printed as a
// markdown table with a bar column, so the numbers can be tested without
// capturing stdout. Nothing is written to disk.
use crate::config::{AnalysisConfig, HOST_COLUMN, PRICE_COLUMN, ROOM_TYPE_COLUMN};
use crate::error::SchemaError;
use crate::output::{bar, preview_table_rows, print_grid, print_title};
use crate::summary::{require_column, value_counts};
use crate::types::{CountRow, ListingTable};
use crate::util::{format_int, format_number, pearson};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Mean price per room type, in the order room types first appear.
pub fn average_price_by_room_type(
    table: &ListingTable,
    room_idx: usize,
    price_idx: usize,
) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, (f64, usize)> = HashMap::new();
    for row in &table.rows {
        let room = &row[room_idx];
        if room.is_missing() {
            continue;
        }
        let label = room.to_string();
        if !acc.contains_key(&label) {
            order.push(label.clone());
        }
        let e = acc.entry(label).or_insert((0.0, 0));
        if let Some(p) = row[price_idx].as_f64() {
            e.0 += p;
            e.1 += 1;
        }
    }
    order
        .into_iter()
        .map(|label| {
            let (sum, n) = acc[&label];
            let avg = if n == 0 { f64::NAN } else { sum / n as f64 };
            (label, avg)
        })
        .collect()
}

/// Equal-width histogram over [min, max]; the last bin includes `max`.
/// A constant column gets the range [v - 0.5, v + 0.5].
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Pearson correlations between every pair of numeric columns.
pub fn correlation_matrix(table: &ListingTable) -> CorrelationMatrix {
    let numeric: Vec<usize> = (0..table.width())
        .filter(|&idx| table.is_numeric_column(idx))
        .collect();
    let series: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|&idx| table.column(idx).map(|c| c.as_f64()).collect())
        .collect();
    let values = series
        .iter()
        .map(|a| series.iter().map(|b| pearson(a, b)).collect())
        .collect();
    CorrelationMatrix {
        columns: numeric.iter().map(|&i| table.columns[i].clone()).collect(),
        values,
    }
}

fn count_rows(counts: &[(String, usize)], bar_width: usize) -> Vec<CountRow> {
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;
    counts
        .iter()
        .map(|(label, n)| CountRow {
            label: label.clone(),
            value: format_int(*n),
            bar: bar(*n as f64, max, bar_width),
        })
        .collect()
}

fn print_room_type_frequency(table: &ListingTable, room_idx: usize, config: &AnalysisConfig) {
    print_title("Most Common Room Types");
    let rows = count_rows(&value_counts(table, room_idx), config.bar_width);
    preview_table_rows(&rows, rows.len());
}

fn print_average_price(
    table: &ListingTable,
    room_idx: usize,
    price_idx: usize,
    config: &AnalysisConfig,
) {
    print_title("Average Price by Room Type");
    let averages = average_price_by_room_type(table, room_idx, price_idx);
    let max = averages
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    let rows: Vec<CountRow> = averages
        .iter()
        .map(|(label, avg)| CountRow {
            label: label.clone(),
            value: format!("${}", format_number(*avg, 2)),
            bar: bar(*avg, max, config.bar_width),
        })
        .collect();
    preview_table_rows(&rows, rows.len());
}

fn print_price_histogram(table: &ListingTable, price_idx: usize, config: &AnalysisConfig) {
    print_title("Price Distribution");
    let bins = histogram(&table.numeric_values(price_idx), config.histogram_bins);
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let rows: Vec<CountRow> = bins
        .iter()
        .map(|b| CountRow {
            label: format!(
                "{} - {}",
                format_number(b.lower, 2),
                format_number(b.upper, 2)
            ),
            value: format_int(b.count),
            bar: bar(b.count as f64, max, config.bar_width),
        })
        .collect();
    preview_table_rows(&rows, rows.len());
}

fn print_correlations(table: &ListingTable) {
    print_title("Correlation Between Numerical Features");
    let matrix = correlation_matrix(table);
    let mut header = vec![String::new()];
    header.extend(matrix.columns.iter().cloned());
    let records: Vec<Vec<String>> = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, row)| {
            let mut record = vec![name.clone()];
            record.extend(row.iter().map(|v| format_number(*v, 2)));
            record
        })
        .collect();
    print_grid(&header, &records);
}

fn print_top_hosts(table: &ListingTable, config: &AnalysisConfig) {
    let Some(host_idx) = table.column_index(HOST_COLUMN) else {
        info!("column '{}' not present, skipping host chart", HOST_COLUMN);
        return;
    };
    print_title(&format!("Top {} Hosts by Number of Listings", config.top_hosts));
    let counts: Vec<(String, usize)> = value_counts(table, host_idx)
        .into_iter()
        .take(config.top_hosts)
        .collect();
    let rows = count_rows(&counts, config.bar_width);
    preview_table_rows(&rows, rows.len());
}

/// Print every chart in a fixed order. The room-type and price columns are
/// required; the host chart is skipped when `host_name` is absent.
pub fn render_charts(table: &ListingTable, config: &AnalysisConfig) -> Result<(), SchemaError> {
    let room_idx = require_column(table, ROOM_TYPE_COLUMN)?;
    let price_idx = require_column(table, PRICE_COLUMN)?;

    print_room_type_frequency(table, room_idx, config);
    print_average_price(table, room_idx, price_idx, config);
    print_price_histogram(table, price_idx, config);
    print_correlations(table);
    print_top_hosts(table, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn listings() -> ListingTable {
        let mut t = ListingTable::new(
            ["room type", "price", "minimum nights", "Name"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        t.push_row(vec![text("Private room"), Cell::Number(100.0), Cell::Number(1.0), text("a")]);
        t.push_row(vec![text("Entire home/apt"), Cell::Number(300.0), Cell::Number(3.0), text("b")]);
        t.push_row(vec![text("Private room"), Cell::Number(50.0), Cell::Missing, text("c")]);
        t.push_row(vec![Cell::Missing, Cell::Number(10.0), Cell::Number(5.0), text("d")]);
        t
    }

    #[test]
    fn test_average_price_by_room_type_in_first_seen_order() {
        let t = listings();
        assert_eq!(
            average_price_by_room_type(&t, 0, 1),
            vec![
                ("Private room".to_string(), 75.0),
                ("Entire home/apt".to_string(), 300.0),
            ]
        );
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[4].upper, 10.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = histogram(&[7.0, 7.0], 2);
        assert_eq!(bins[0].lower, 6.5);
        assert_eq!(bins[1].upper, 7.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 50).is_empty());
    }

    #[test]
    fn test_correlation_matrix_over_numeric_columns() {
        let matrix = correlation_matrix(&listings());
        assert_eq!(matrix.columns, vec!["price", "minimum nights"]);
        assert!((matrix.values[0][0] - 1.0).abs() < 1e-12);
        assert!((matrix.values[0][1] - matrix.values[1][0]).abs() < 1e-12);
        // price vs nights over rows 0, 1 and 3: (100,1), (300,3), (10,5)
        assert!(matrix.values[0][1] < 0.0);
    }

    #[test]
    fn test_render_charts_requires_room_type() {
        let mut t = listings();
        t.columns[0] = "room_type".to_string();
        assert_eq!(
            render_charts(&t, &AnalysisConfig::default()),
            Err(SchemaError::MissingColumn("room type".to_string()))
        );
    }

    #[test]
    fn test_render_charts_without_host_column() {
        assert_eq!(render_charts(&listings(), &AnalysisConfig::default()), Ok(()));
    }
}
