use crate::config::NA_VALUES;
use crate::error::LoadError;
use crate::types::{Cell, ListingTable};
use crate::util::{parse_bool_safe, parse_f64_safe};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub blank_rows: usize,
    pub parse_errors: usize,
}

/// Load the first worksheet of a workbook, or a CSV file when the path ends
/// in `.csv`, into a `ListingTable`.
pub fn load_table(path: &str) -> Result<(ListingTable, LoadReport), LoadError> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let (table, report) = if is_csv {
        load_csv(path)?
    } else {
        load_workbook(path)?
    };
    info!(
        rows = table.height(),
        columns = table.width(),
        blank_rows = report.blank_rows,
        parse_errors = report.parse_errors,
        "loaded {}",
        path
    );
    Ok((table, report))
}

fn load_workbook(path: &str) -> Result<(ListingTable, LoadReport), LoadError> {
    // calamine picks the reader from the extension: xls, xlsx, xlsb, ods.
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet(path.to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| LoadError::NoHeader(path.to_string()))?;
    let header: Vec<String> = header.iter().map(header_text).collect();

    let mut table = ListingTable::new(normalize_headers(header));
    let mut report = LoadReport::default();
    for row in rows {
        report.total_rows += 1;
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(Cell::is_missing) {
            report.blank_rows += 1;
            continue;
        }
        table.push_row(cells);
    }
    Ok((table, report))
}

fn load_csv(path: &str) -> Result<(ListingTable, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let header: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if header.is_empty() {
        return Err(LoadError::NoHeader(path.to_string()));
    }

    let mut table = ListingTable::new(normalize_headers(header));
    let mut report = LoadReport::default();
    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping unreadable CSV record: {}", e);
                report.parse_errors += 1;
                continue;
            }
        };
        if record.len() > table.width() {
            debug!(
                "skipping CSV record {} with {} fields, header has {}",
                report.total_rows,
                record.len(),
                table.width()
            );
            report.parse_errors += 1;
            continue;
        }
        let cells: Vec<Cell> = record.iter().map(|s| infer_cell(Some(s))).collect();
        if cells.iter().all(Cell::is_missing) {
            report.blank_rows += 1;
            continue;
        }
        table.push_row(cells);
    }
    Ok((table, report))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Blank headers become `Unnamed: <i>` and repeated names get a `.<n>`
/// suffix, so every column can be addressed by a unique name.
pub fn normalize_headers(header: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Convert a workbook cell into a `Cell`. Text cells go through the same
/// inference as CSV fields so `"$1,200"` ends up numeric either way.
fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => infer_cell(Some(s)),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Text(cell.to_string()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        // Empty cells and spreadsheet errors such as #N/A.
        _ => Cell::Missing,
    }
}

/// Type a raw text field: blank or an `NA_VALUES` spelling → missing,
/// numeric-looking → number, `true`/`false` → bool, anything else stays
/// text (trimmed).
pub fn infer_cell(raw: Option<&str>) -> Cell {
    let Some(s) = raw
        .map(str::trim)
        .filter(|s| !s.is_empty() && !NA_VALUES.contains(s))
    else {
        return Cell::Missing;
    };
    if let Some(n) = parse_f64_safe(Some(s)) {
        return Cell::Number(n);
    }
    if let Some(b) = parse_bool_safe(Some(s)) {
        return Cell::Bool(b);
    }
    Cell::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(Some("  ")), Cell::Missing);
        assert_eq!(infer_cell(None), Cell::Missing);
        assert_eq!(infer_cell(Some("$1,250")), Cell::Number(1250.0));
        assert_eq!(infer_cell(Some("TRUE")), Cell::Bool(true));
        assert_eq!(
            infer_cell(Some(" Entire home/apt ")),
            Cell::Text("Entire home/apt".to_string())
        );
        // Dates stay text until the preparer coerces them.
        assert_eq!(
            infer_cell(Some("2021-05-03")),
            Cell::Text("2021-05-03".to_string())
        );
    }

    #[test]
    fn test_infer_cell_reads_na_spellings_as_missing() {
        for na in ["NaN", "N/A", "NA", "null", "None", "#N/A", " nan "] {
            assert_eq!(infer_cell(Some(na)), Cell::Missing, "{na}");
        }
        // Only exact spellings count.
        assert_eq!(infer_cell(Some("Nanaimo")), Cell::Text("Nanaimo".to_string()));
    }

    #[test]
    fn test_cell_from_data_workbook_values() {
        assert_eq!(cell_from_data(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(cell_from_data(&Data::Float(12.5)), Cell::Number(12.5));
        assert_eq!(cell_from_data(&Data::Bool(false)), Cell::Bool(false));
        assert_eq!(
            cell_from_data(&Data::String("$1,200".to_string())),
            Cell::Number(1200.0)
        );
        assert_eq!(
            cell_from_data(&Data::String("N/A".to_string())),
            Cell::Missing
        );
        assert_eq!(
            cell_from_data(&Data::String(" Private room ".to_string())),
            Cell::Text("Private room".to_string())
        );
        assert_eq!(
            cell_from_data(&Data::Error(calamine::CellErrorType::NA)),
            Cell::Missing
        );
        assert_eq!(cell_from_data(&Data::Empty), Cell::Missing);
    }

    #[test]
    fn test_workbook_datetimes_survive_date_coercion() {
        let expected = chrono::NaiveDate::from_ymd_opt(2021, 5, 3)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        let cell = cell_from_data(&Data::DateTimeIso("2021-05-03T14:30:00".to_string()));
        assert_eq!(cell, Cell::DateTime(expected));

        let mut table = ListingTable::new(vec!["price".to_string(), "last review date".to_string()]);
        table.push_row(vec![Cell::Number(10.0), cell]);
        let targets = crate::prepare::date_columns(&table.columns);
        assert_eq!(crate::prepare::coerce_dates(&mut table, &targets), 0);
        assert_eq!(table.rows[0][1], Cell::DateTime(expected));
    }

    #[test]
    fn test_normalize_headers() {
        let header = vec![
            "price".to_string(),
            String::new(),
            "price".to_string(),
            "price".to_string(),
        ];
        assert_eq!(
            normalize_headers(header),
            vec!["price", "Unnamed: 1", "price.1", "price.2"]
        );
    }

    #[test]
    fn test_load_csv_types_cells_and_skips_blank_rows() {
        let file = write_csv(
            "Name,country,price,room type,last review date\n\
             Cozy loft,United States,$120,Private room,2021-05-03\n\
             ,,,,\n\
             ,United States,,Entire home/apt,garbage\n",
        );
        let path = file.path().to_str().unwrap();
        let (table, report) = load_table(path).unwrap();

        assert_eq!(
            table.columns,
            vec!["Name", "country", "price", "room type", "last review date"]
        );
        assert_eq!(table.height(), 2);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.blank_rows, 1);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(table.rows[0][2], Cell::Number(120.0));
        assert_eq!(table.rows[1][0], Cell::Missing);
        assert_eq!(table.rows[1][2], Cell::Missing);
        assert_eq!(table.rows[1][4], Cell::Text("garbage".to_string()));
    }

    #[test]
    fn test_load_csv_pads_short_records() {
        let file = write_csv("Name,price,room type\nA,10\n");
        let (table, _) = load_table(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], Cell::Missing);
    }

    #[test]
    fn test_load_csv_skips_records_wider_than_header() {
        let file = write_csv("Name,price\nA,10,EXTRA,MORE\nB,20\n");
        let (table, report) = load_table(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.rows[0], vec![Cell::Text("B".to_string()), Cell::Number(20.0)]);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.parse_errors, 1);
    }

    #[test]
    fn test_load_csv_na_values_then_prepare_fills_them() {
        let file = write_csv(
            "Name,country,price,room type\n\
             N/A,NaN,100,Private room\n\
             Loft,US,NaN,Entire home/apt\n",
        );
        let (mut table, _) = load_table(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.rows[0][0], Cell::Missing);
        assert_eq!(table.rows[0][1], Cell::Missing);
        assert_eq!(table.rows[1][2], Cell::Missing);

        let report = crate::prepare::prepare(&mut table).unwrap();
        assert_eq!(report.prices_filled, 1);
        assert_eq!(table.rows[0][0], Cell::Text("Unknown".to_string()));
        assert_eq!(table.rows[0][1], Cell::Text("Unknown".to_string()));
        assert_eq!(table.rows[1][2], Cell::Number(100.0));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(load_table("does-not-exist.csv").is_err());
        assert!(load_table("does-not-exist.xlsx").is_err());
    }
}
