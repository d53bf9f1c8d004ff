use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// A single spreadsheet value after loading.
///
/// `Missing` doubles as the marker for dates that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Hashable view used for whole-row equality.
    pub fn key(&self) -> CellKey {
        match self {
            Cell::Missing => CellKey::Missing,
            Cell::Text(s) => CellKey::Text(s.clone()),
            Cell::Number(n) => {
                // -0.0 and 0.0 are the same listing price.
                let n = if *n == 0.0 { 0.0 } else { *n };
                let bits = if n.is_nan() { f64::NAN.to_bits() } else { n.to_bits() };
                CellKey::Number(bits)
            }
            Cell::Bool(b) => CellKey::Bool(*b),
            Cell::DateTime(dt) => CellKey::DateTime(*dt),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Missing => "empty",
            Cell::Text(_) => "text",
            Cell::Number(_) => "number",
            Cell::Bool(_) => "bool",
            Cell::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.1}", n),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) if dt.time() == chrono::NaiveTime::MIN => {
                write!(f, "{}", dt.date())
            }
            Cell::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Missing,
    Text(String),
    Number(u64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// The listing dataset: ordered column names and rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ListingTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row, padding it to the header width. Loaders reject rows
    /// wider than the header before they get here.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Exact, case-sensitive lookup of a column's position.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |r| &r[idx])
    }

    /// Non-missing numeric values of a column, in row order.
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column(idx).filter_map(Cell::as_f64).collect()
    }

    /// True when the column has at least one value and every value present
    /// is a number.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen = false;
        for cell in self.column(idx) {
            match cell {
                Cell::Missing => {}
                Cell::Number(_) => seen = true,
                _ => return false,
            }
        }
        seen
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct ColumnInfoRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Non-Null Count")]
    pub non_null: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct CountRow {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Insights {
    pub most_common_room_type: Option<String>,
    pub average_price: f64,
    pub distinct_countries: Option<usize>,
}
