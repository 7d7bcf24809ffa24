use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse export {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("File name does not match <YYYY-MM-DD>-reporter-export.json: {file_name}")]
    DateFormat { file_name: String },

    #[error("No export for {date} at {path:?}")]
    NotFound { date: NaiveDate, path: PathBuf },

    #[error("Record has no '{field}' field")]
    MissingField { field: &'static str },

    #[error("Unknown {field} code: {code}")]
    UnknownCode { field: &'static str, code: i64 },

    #[error("{field} is not an integer code: {value}")]
    InvalidCode {
        field: &'static str,
        value: serde_json::Value,
    },

    #[error("Could not determine home directory")]
    NoDefaultDirectory,
}

pub type Result<T> = std::result::Result<T, ExportError>;
