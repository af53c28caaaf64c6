use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient whose most recent consultation predates the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueAlert {
    pub patient_id: i64,
    pub last_consultation_date: NaiveDate,
}
