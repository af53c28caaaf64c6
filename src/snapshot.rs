//! Caller-owned immutable snapshot of the three source tables.
//!
//! Each computation pass reads one snapshot; refresh is explicit and
//! returns a whole new value, so there is no global cache to invalidate
//! and overlapping recomputations stay independent.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ingest::IngestError;
use crate::models::{ConsultationRecord, DispensationRecord, PatientRecord};

/// A source that can produce a fresh snapshot on demand.
///
/// Every `load` re-reads the source in full. Refreshing means calling
/// `load` again and swapping the value at the caller.
pub trait DataSource {
    fn load(&self) -> Result<Snapshot, IngestError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub dispensations: Vec<DispensationRecord>,
    pub consultations: Vec<ConsultationRecord>,
    pub patients: Vec<PatientRecord>,
    /// Local wall-clock time the snapshot was assembled.
    pub loaded_at: NaiveDateTime,
}

impl Snapshot {
    pub fn new(
        dispensations: Vec<DispensationRecord>,
        consultations: Vec<ConsultationRecord>,
        patients: Vec<PatientRecord>,
    ) -> Self {
        Self {
            dispensations,
            consultations,
            patients,
            loaded_at: chrono::Local::now().naive_local(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dispensations.is_empty()
            && self.consultations.is_empty()
            && self.patients.is_empty()
    }
}
