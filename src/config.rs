// Fixed run settings.
//
// The analysis has no command-line flags and reads no environment variables;
// everything it needs to know about its input lives here.

/// Workbook analysed by the binary, relative to the working directory.
pub const DATA_FILE: &str = "1730285881-Airbnb_Open_Data.xlsx";

/// Replacement for missing `Name` and `country` entries.
pub const UNKNOWN: &str = "Unknown";

pub const NAME_COLUMN: &str = "Name";
pub const COUNTRY_COLUMN: &str = "country";
pub const PRICE_COLUMN: &str = "price";
/// Canonical room-type column. `room_type` is not accepted as an alias.
pub const ROOM_TYPE_COLUMN: &str = "room type";
pub const HOST_COLUMN: &str = "host_name";

/// Text values read as missing, matched exactly after trimming. Mirrors the
/// usual spreadsheet/pandas spellings of "no value".
pub const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Case-insensitive substring that marks a column as holding dates.
pub const DATE_MARKER: &str = "date";

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub data_file: String,
    pub head_rows: usize,
    pub histogram_bins: usize,
    pub top_hosts: usize,
    pub bar_width: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_file: DATA_FILE.to_string(),
            head_rows: 5,
            histogram_bins: 50,
            top_hosts: 10,
            bar_width: 40,
        }
    }
}
