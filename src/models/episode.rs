use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A continuous treatment period for one patient and drug.
///
/// Derived from dispensations, never persisted. `end_date` carries the
/// supply coverage window past the last dispensation, so a one-row
/// episode still spans the covered month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentEpisode {
    pub patient_id: i64,
    pub drug_name: String,
    /// 0-based position within the (patient, drug) group.
    pub episode_index: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: f64,
}

impl TreatmentEpisode {
    /// Row label used by the timeline view.
    pub fn series_label(&self) -> String {
        format!("{} - {}", self.patient_id, self.drug_name)
    }
}
