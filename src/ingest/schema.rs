//! Expected shape of the three logical tables.
//!
//! Validation runs once per load, before any row is read, so a renamed or
//! dropped column fails fast with the table and column named instead of a
//! transformation silently skipping.

use std::collections::HashMap;

use super::IngestError;

pub const DISPENSATIONS_TABLE: &str = "dispensations";
pub const CONSULTATIONS_TABLE: &str = "consultations";
pub const PATIENTS_TABLE: &str = "patients";

pub const DISPENSATION_COLUMNS: [&str; 7] = [
    "patient_id",
    "drug_name",
    "dispensation_date",
    "quantity",
    "amount",
    "document_type",
    "family",
];

pub const CONSULTATION_COLUMNS: [&str; 4] = [
    "patient_id",
    "activity_type_code",
    "consultation_date",
    "schedule_description",
];

pub const PATIENT_COLUMNS: [&str; 5] =
    ["patient_id", "birth_date", "death_date", "district", "sex"];

/// Check that every expected column is present. Matching is trimmed and
/// case-insensitive; extra columns are ignored.
pub fn ensure_columns(
    table: &str,
    expected: &[&str],
    available: &[String],
) -> Result<(), IngestError> {
    for column in expected {
        let found = available
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(column));
        if !found {
            return Err(IngestError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Column name to position mapping for one sheet, resolved from its header
/// row against the expected column list.
#[derive(Debug)]
pub struct ColumnMap {
    table: String,
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn resolve(
        table: &str,
        expected: &[&str],
        headers: &[String],
    ) -> Result<Self, IngestError> {
        ensure_columns(table, expected, headers)?;

        let mut positions = HashMap::new();
        for column in expected {
            // ensure_columns guarantees a match exists
            if let Some(pos) = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
            {
                positions.insert(column.to_string(), pos);
            }
        }

        Ok(Self {
            table: table.to_string(),
            positions,
        })
    }

    pub fn index_of(&self, column: &str) -> Result<usize, IngestError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| IngestError::MissingColumn {
                table: self.table.clone(),
                column: column.to_string(),
            })
    }
}
