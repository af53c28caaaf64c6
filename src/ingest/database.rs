//! Relational source.
//!
//! Mirror of the workbook layout: three tables of the same names and
//! columns, dates stored as ISO-8601 text. Schema validation runs against
//! `PRAGMA table_info` before any row is read.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::models::enums::Sex;
use crate::models::{DispensationRecord, PatientRecord};
use crate::snapshot::{DataSource, Snapshot};

use super::clean::{
    clean_consultations, clean_dispensations, normalize_category, parse_date_str,
    RawConsultation,
};
use super::schema::{
    ensure_columns, CONSULTATIONS_TABLE, CONSULTATION_COLUMNS, DISPENSATIONS_TABLE,
    DISPENSATION_COLUMNS, PATIENTS_TABLE, PATIENT_COLUMNS,
};
use super::IngestError;

pub struct DatabaseSource {
    path: PathBuf,
}

impl DatabaseSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for DatabaseSource {
    fn load(&self) -> Result<Snapshot, IngestError> {
        let conn = Connection::open(&self.path)?;

        validate_table(&conn, DISPENSATIONS_TABLE, &DISPENSATION_COLUMNS)?;
        validate_table(&conn, CONSULTATIONS_TABLE, &CONSULTATION_COLUMNS)?;
        validate_table(&conn, PATIENTS_TABLE, &PATIENT_COLUMNS)?;

        let dispensations = clean_dispensations(load_dispensations(&conn)?);
        let consultations = clean_consultations(load_consultations(&conn)?);
        let patients = load_patients(&conn)?;

        info!(
            path = %self.path.display(),
            dispensations = dispensations.len(),
            consultations = consultations.len(),
            patients = patients.len(),
            "database snapshot loaded"
        );

        Ok(Snapshot::new(dispensations, consultations, patients))
    }
}

/// A missing table shows up as an empty `PRAGMA table_info` result.
fn validate_table(
    conn: &Connection,
    table: &str,
    expected: &[&str],
) -> Result<(), IngestError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;

    if columns.is_empty() {
        return Err(IngestError::MissingTable(table.to_string()));
    }
    ensure_columns(table, expected, &columns)
}

fn load_dispensations(conn: &Connection) -> Result<Vec<DispensationRecord>, IngestError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id, drug_name, dispensation_date, quantity, amount,
                document_type, family
         FROM dispensations",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<f64>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let row_no = idx + 1;
        let (patient_id, drug_name, date, quantity, amount, document_type, family) = row?;

        let patient_id =
            patient_id.ok_or_else(|| missing(DISPENSATIONS_TABLE, row_no, "patient_id"))?;
        let drug_name = drug_name
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| missing(DISPENSATIONS_TABLE, row_no, "drug_name"))?;
        let dispensation_date =
            required_date(DISPENSATIONS_TABLE, row_no, "dispensation_date", date)?;

        records.push(DispensationRecord {
            patient_id,
            drug_name: drug_name.trim().to_string(),
            dispensation_date,
            quantity: quantity.unwrap_or(0.0),
            amount: amount.unwrap_or(0.0),
            document_type: normalize_category(document_type.as_deref()),
            family: normalize_category(family.as_deref()),
        });
    }
    Ok(records)
}

fn load_consultations(conn: &Connection) -> Result<Vec<RawConsultation>, IngestError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id, activity_type_code, consultation_date, schedule_description
         FROM consultations",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let row_no = idx + 1;
        let (patient_id, activity_type_code, date, schedule_description) = row?;

        records.push(RawConsultation {
            patient_id,
            activity_type_code,
            consultation_date: optional_date(
                CONSULTATIONS_TABLE,
                row_no,
                "consultation_date",
                date,
            )?,
            schedule_description,
        });
    }
    Ok(records)
}

fn load_patients(conn: &Connection) -> Result<Vec<PatientRecord>, IngestError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id, birth_date, death_date, district, sex FROM patients",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let row_no = idx + 1;
        let (patient_id, birth_date, death_date, district, sex) = row?;

        let patient_id =
            patient_id.ok_or_else(|| missing(PATIENTS_TABLE, row_no, "patient_id"))?;
        let birth_date = required_date(PATIENTS_TABLE, row_no, "birth_date", birth_date)?;
        let death_date = optional_date(PATIENTS_TABLE, row_no, "death_date", death_date)?;

        records.push(PatientRecord {
            patient_id,
            birth_date,
            death_date,
            district: normalize_category(district.as_deref()),
            sex: Sex::from_source(sex.as_deref()),
        });
    }
    Ok(records)
}

fn missing(table: &str, row: usize, column: &str) -> IngestError {
    IngestError::MissingValue {
        table: table.to_string(),
        row,
        column: column.to_string(),
    }
}

fn optional_date(
    table: &str,
    row: usize,
    column: &str,
    raw: Option<String>,
) -> Result<Option<NaiveDate>, IngestError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date_str(&s)
            .map(Some)
            .ok_or_else(|| IngestError::InvalidDate {
                table: table.to_string(),
                row,
                column: column.to_string(),
                value: s,
            }),
    }
}

fn required_date(
    table: &str,
    row: usize,
    column: &str,
    raw: Option<String>,
) -> Result<NaiveDate, IngestError> {
    optional_date(table, row, column, raw)?.ok_or_else(|| missing(table, row, column))
}
