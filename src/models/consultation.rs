use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub patient_id: i64,
    pub activity_type_code: String,
    pub consultation_date: NaiveDate,
    pub schedule_description: Option<String>,
}
