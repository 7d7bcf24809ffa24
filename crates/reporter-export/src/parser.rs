use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{ExportError, Result};
use crate::export::{Export, ExportDocument};

/// Every export file is named `<YYYY-MM-DD>` followed by this suffix.
pub const EXPORT_SUFFIX: &str = "-reporter-export.json";

/// Date format of the leading token in an export file name.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// File name of the export for `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}{}", date.format(DATE_FORMAT), EXPORT_SUFFIX)
}

/// Whether a file name carries the export suffix. The date token is not
/// checked here so that malformed names surface as errors on load.
pub fn is_export_file_name(file_name: &str) -> bool {
    file_name.len() > EXPORT_SUFFIX.len() && file_name.ends_with(EXPORT_SUFFIX)
}

/// Extract the export date from a path's file name.
pub fn date_from_path(path: &Path) -> Result<NaiveDate> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let date_format_error = || ExportError::DateFormat {
        file_name: path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let token = file_name
        .strip_suffix(EXPORT_SUFFIX)
        .ok_or_else(date_format_error)?;

    let date = NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| date_format_error())?;

    // chrono also takes unpadded fields, a leading sign or whitespace; only the
    // canonical spelling names an export.
    if date.format(DATE_FORMAT).to_string() != token {
        return Err(date_format_error());
    }

    Ok(date)
}

/// Decode an export document from a file.
pub fn parse_document(path: &Path) -> Result<ExportDocument> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a single export file, taking its date from the file name.
pub fn parse_export(path: &Path) -> Result<Export> {
    let date = date_from_path(path)?;
    let document = parse_document(path)?;

    tracing::debug!(
        date = %date,
        snapshots = document.snapshots.len(),
        questions = document.questions.len(),
        "Loaded export {:?}",
        path
    );

    Ok(Export::new(date, document))
}

/// Path of the export for `date` inside `dir`.
pub fn export_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(export_file_name(date))
}
