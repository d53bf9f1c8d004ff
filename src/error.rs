// Error taxonomy for the analysis run.

use thiserror::Error;

/// Failures while reading the input file into a table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No worksheet found in '{0}'")]
    NoWorksheet(String),

    #[error("No header row found in '{0}'")]
    NoHeader(String),
}

/// The table does not have the shape the analysis needs.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    #[error("Column '{column}' holds a non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    #[error("Data schema error: {0}")]
    Schema(#[from] SchemaError),
}
