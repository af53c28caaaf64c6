use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One medication dispensation row after cleaning (quantity > 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispensationRecord {
    pub patient_id: i64,
    pub drug_name: String,
    pub dispensation_date: NaiveDate,
    pub quantity: f64,
    pub amount: f64,
    pub document_type: String,
    pub family: String,
}
