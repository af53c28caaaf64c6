use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::Sex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: i64,
    pub birth_date: NaiveDate,
    pub death_date: Option<NaiveDate>,
    pub district: String,
    pub sex: Sex,
}

impl PatientRecord {
    pub fn is_deceased(&self) -> bool {
        self.death_date.is_some()
    }
}
