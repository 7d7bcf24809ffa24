use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::records::{Question, Response};
use crate::snapshot::Snapshot;
use crate::truthy;

/// The decoded body of one export file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, deserialize_with = "truthy::list")]
    pub snapshots: Vec<Snapshot>,
    #[serde(default, deserialize_with = "truthy::list")]
    pub questions: Vec<Question>,
}

/// One dated export. The date comes from the file name, not the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Export {
    date: NaiveDate,
    #[serde(flatten)]
    document: ExportDocument,
}

impl Export {
    pub fn new(date: NaiveDate, document: ExportDocument) -> Self {
        Self { date, document }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.document.snapshots
    }

    pub fn questions(&self) -> &[Question] {
        &self.document.questions
    }

    /// All responses across snapshots, in snapshot order.
    pub fn responses(&self) -> impl Iterator<Item = &Response> {
        self.document
            .snapshots
            .iter()
            .flat_map(|s| s.responses().iter())
    }

    /// Responses whose prompt fingerprint matches the question's.
    /// Responses without a prompt never match.
    pub fn responses_to(&self, question: &Question) -> Result<Vec<&Response>> {
        let md5 = question.md5()?;
        Ok(self
            .responses()
            .filter(|r| r.md5().is_ok_and(|m| m == md5))
            .collect())
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Export({})", self.date.format("%Y-%m-%d"))
    }
}
