use chrono::Datelike;

use super::dispensation::DispensationRecord;

/// Multi-select filters mirroring the dashboard dropdowns.
/// `None` means "no restriction" on that dimension.
#[derive(Debug, Clone, Default)]
pub struct DispensationFilter {
    pub patients: Option<Vec<i64>>,
    pub drugs: Option<Vec<String>>,
    pub years: Option<Vec<i32>>,
}

impl DispensationFilter {
    pub fn matches(&self, record: &DispensationRecord) -> bool {
        if let Some(ref patients) = self.patients {
            if !patients.contains(&record.patient_id) {
                return false;
            }
        }
        if let Some(ref drugs) = self.drugs {
            if !drugs.contains(&record.drug_name) {
                return false;
            }
        }
        if let Some(ref years) = self.years {
            if !years.contains(&record.dispensation_date.year()) {
                return false;
            }
        }
        true
    }
}
