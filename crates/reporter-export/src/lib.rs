//! # reporter-export
//!
//! Read-only object model over the JSON exports written by the Reporter app.
//!
//! ## Key Types
//!
//! - [`ReporterApp`] - Collection of exports found in a directory, newest first
//! - [`Export`] - One dated export with its snapshots and questions
//! - [`Snapshot`] - A single report: device state plus responses
//! - [`Response`] / [`Answer`] - One answered question
//! - [`ExportError`] - Everything that can go wrong while loading or reading
//!
//! ## File naming
//!
//! Exports are discovered by name: `<YYYY-MM-DD>-reporter-export.json`. The
//! date in the name is the export's identity; the document itself is never
//! consulted for it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reporter_export::ReporterApp;
//!
//! let mut app = ReporterApp::with_dir("/path/to/Reporter-App".into());
//! app.load_all()?;
//!
//! for export in app.exports() {
//!     println!("{}: {} snapshots", export.date(), export.snapshots().len());
//! }
//! ```

mod error;
mod export;
pub mod parser;
mod records;
mod snapshot;
mod store;
mod truthy;

pub use error::{ExportError, Result};
pub use export::{Export, ExportDocument};
pub use parser::{date_from_path, export_file_name, parse_export, EXPORT_SUFFIX};
pub use records::{
    fingerprint, Answer, AnswerKind, Audio, Location, Placemark, Question, Response, Weather,
};
pub use snapshot::{Connection, ReportImpetus, Snapshot};
pub use store::{ExportFiles, ExportStats, ReporterApp};
