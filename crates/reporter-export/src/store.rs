use std::collections::BTreeMap;
use std::fs::ReadDir;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ExportError, Result};
use crate::export::Export;
use crate::parser::{export_path, is_export_file_name, parse_export};
use crate::records::AnswerKind;

/// The set of exports loaded from one directory, newest first.
#[derive(Debug)]
pub struct ReporterApp {
    directory: PathBuf,
    exports: BTreeMap<NaiveDate, Export>,
}

/// Aggregate figures over the loaded exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStats {
    pub total_exports: usize,
    pub total_snapshots: usize,
    pub total_responses: usize,
    pub distinct_questions: usize,
    pub responses_by_kind: BTreeMap<AnswerKind, usize>,
    pub avg_battery: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl ReporterApp {
    /// Collection over the directory the Reporter app syncs to,
    /// `~/Dropbox/Apps/Reporter-App`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(ExportError::NoDefaultDirectory)?;
        Ok(Self::with_dir(home.join("Dropbox").join("Apps").join("Reporter-App")))
    }

    pub fn with_dir(directory: PathBuf) -> Self {
        Self {
            directory,
            exports: BTreeMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Scan the directory for export files. Each call rescans; paths come
    /// back in directory order. A missing directory yields nothing.
    pub fn export_files(&self) -> Result<ExportFiles> {
        if !self.directory.exists() {
            return Ok(ExportFiles { entries: None });
        }

        let directory = std::path::absolute(&self.directory).map_err(|source| ExportError::Io {
            path: self.directory.clone(),
            source,
        })?;
        let entries = std::fs::read_dir(&directory).map_err(|source| ExportError::Io {
            path: directory.clone(),
            source,
        })?;

        Ok(ExportFiles {
            entries: Some((directory, entries)),
        })
    }

    /// Load one export file without adding it to the collection.
    pub fn load_file(&self, path: &Path) -> Result<Export> {
        parse_export(path)
    }

    /// Load every export file in the directory. Stops at the first file that
    /// fails and leaves the collection untouched in that case. Returns the
    /// number of exports loaded.
    pub fn load_all(&mut self) -> Result<usize> {
        let mut loaded = Vec::new();
        for path in self.export_files()? {
            loaded.push(self.load_file(&path?)?);
        }

        let count = loaded.len();
        for export in loaded {
            self.insert(export);
        }

        tracing::info!(
            count,
            total = self.exports.len(),
            "Loaded exports from {:?}",
            self.directory
        );

        Ok(count)
    }

    /// Load the export for a single date. The collection is replaced by that
    /// one export.
    pub fn get(&mut self, date: NaiveDate) -> Result<&Export> {
        let path = export_path(&self.directory, date);
        if !path.is_file() {
            return Err(ExportError::NotFound { date, path });
        }

        let export = self.load_file(&path)?;
        self.exports.clear();
        Ok(self.exports.entry(date).or_insert(export))
    }

    /// Add an export, replacing and returning any export with the same date.
    pub fn insert(&mut self, export: Export) -> Option<Export> {
        let replaced = self.exports.insert(export.date(), export);
        if replaced.is_some() {
            tracing::debug!("Replaced existing export");
        }
        replaced
    }

    /// Exports sorted by date, most recent first.
    pub fn exports(&self) -> impl DoubleEndedIterator<Item = &Export> + ExactSizeIterator {
        self.exports.values().rev()
    }

    pub fn find(&self, date: NaiveDate) -> Option<&Export> {
        self.exports.get(&date)
    }

    pub fn latest(&self) -> Option<&Export> {
        self.exports.values().next_back()
    }

    /// Loaded export dates, most recent first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.exports.keys().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Compute aggregate statistics over the loaded exports.
    pub fn stats(&self) -> ExportStats {
        let mut total_snapshots = 0;
        let mut total_responses = 0;
        let mut responses_by_kind: BTreeMap<AnswerKind, usize> = BTreeMap::new();
        let mut questions = std::collections::HashSet::new();
        let mut battery_sum = 0.0;
        let mut battery_count = 0usize;

        for export in self.exports.values() {
            total_snapshots += export.snapshots().len();

            for snapshot in export.snapshots() {
                if let Some(battery) = snapshot.battery() {
                    battery_sum += battery;
                    battery_count += 1;
                }
            }

            for response in export.responses() {
                total_responses += 1;
                *responses_by_kind.entry(response.kind()).or_insert(0) += 1;
            }

            // Prompt-less questions have no identity to count.
            questions.extend(export.questions().iter().filter_map(|q| q.md5().ok()));
        }

        let avg_battery = if battery_count == 0 {
            None
        } else {
            Some(battery_sum / battery_count as f64)
        };

        ExportStats {
            total_exports: self.exports.len(),
            total_snapshots,
            total_responses,
            distinct_questions: questions.len(),
            responses_by_kind,
            avg_battery,
            first_date: self.exports.keys().next().copied(),
            last_date: self.exports.keys().next_back().copied(),
        }
    }
}

/// Lazy scan over a directory's export files.
pub struct ExportFiles {
    entries: Option<(PathBuf, ReadDir)>,
}

impl Iterator for ExportFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        let (directory, entries) = self.entries.as_mut()?;

        for entry in entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(ExportError::Io {
                        path: directory.clone(),
                        source,
                    }))
                }
            };

            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(is_export_file_name);

            if matches && path.is_file() {
                return Some(Ok(path));
            }
        }

        None
    }
}
