pub mod clean;
pub mod database;
pub mod schema;
pub mod workbook;

pub use clean::*;
pub use database::*;
pub use schema::*;
pub use workbook::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Missing sheet or table: {0}")]
    MissingTable(String),

    #[error("Missing column {column} in {table}")]
    MissingColumn { table: String, column: String },

    #[error("{table} row {row}: missing required value in {column}")]
    MissingValue {
        table: String,
        row: usize,
        column: String,
    },

    #[error("{table} row {row}: cannot parse {column} value {value:?} as a date")]
    InvalidDate {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{table} row {row}: cannot parse {column} value {value:?} as a number")]
    InvalidNumber {
        table: String,
        row: usize,
        column: String,
        value: String,
    },
}
