//! Row-level cleaning rules shared by every data source.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{ConsultationRecord, DispensationRecord};

/// Sentinel for absent categorical values.
pub const UNKNOWN: &str = "unknown";

/// Normalize a raw categorical value; absent or blank becomes [`UNKNOWN`].
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Dates in the source exports are either ISO or day-first.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .ok()
}

/// A consultation row as read from the source, before required-field checks.
#[derive(Debug, Clone)]
pub struct RawConsultation {
    pub patient_id: Option<i64>,
    pub activity_type_code: Option<String>,
    pub consultation_date: Option<NaiveDate>,
    pub schedule_description: Option<String>,
}

/// Drop dispensations that never enter analysis (quantity <= 0).
pub fn clean_dispensations(rows: Vec<DispensationRecord>) -> Vec<DispensationRecord> {
    let before = rows.len();
    let kept: Vec<DispensationRecord> =
        rows.into_iter().filter(|r| r.quantity > 0.0).collect();
    if kept.len() < before {
        debug!(
            dropped = before - kept.len(),
            "dispensations with non-positive quantity dropped"
        );
    }
    kept
}

/// Apply the consultation rules: drop rows missing patient or date, coerce
/// absent activity codes to the unknown sentinel, deduplicate exact
/// repeats preserving first-seen order.
pub fn clean_consultations(rows: Vec<RawConsultation>) -> Vec<ConsultationRecord> {
    let before = rows.len();

    let mut seen: HashSet<ConsultationRecord> = HashSet::new();
    let mut kept: Vec<ConsultationRecord> = Vec::new();
    for raw in rows {
        let (Some(patient_id), Some(consultation_date)) =
            (raw.patient_id, raw.consultation_date)
        else {
            continue;
        };
        let record = ConsultationRecord {
            patient_id,
            activity_type_code: normalize_category(raw.activity_type_code.as_deref()),
            consultation_date,
            schedule_description: raw.schedule_description,
        };
        if seen.insert(record.clone()) {
            kept.push(record);
        }
    }

    if kept.len() < before {
        debug!(
            dropped = before - kept.len(),
            "incomplete or duplicate consultations dropped"
        );
    }
    kept
}
