//! Spreadsheet workbook source.
//!
//! The care unit's canonical export is a workbook with one sheet per
//! logical table, headers in the first row. Date cells may be native
//! spreadsheet dates or text; the export is day-first when textual.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Range, Reader, Sheets};
use chrono::NaiveDate;
use tracing::info;

use crate::models::enums::Sex;
use crate::models::{DispensationRecord, PatientRecord};
use crate::snapshot::{DataSource, Snapshot};

use super::clean::{
    clean_consultations, clean_dispensations, normalize_category, parse_date_str,
    RawConsultation,
};
use super::schema::{
    ColumnMap, CONSULTATIONS_TABLE, CONSULTATION_COLUMNS, DISPENSATIONS_TABLE,
    DISPENSATION_COLUMNS, PATIENTS_TABLE, PATIENT_COLUMNS,
};
use super::IngestError;

pub struct WorkbookSource {
    path: PathBuf,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for WorkbookSource {
    fn load(&self) -> Result<Snapshot, IngestError> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let dispensations = clean_dispensations(read_dispensations(&sheet(
            &mut workbook,
            DISPENSATIONS_TABLE,
        )?)?);
        let consultations = clean_consultations(read_consultations(&sheet(
            &mut workbook,
            CONSULTATIONS_TABLE,
        )?)?);
        let patients = read_patients(&sheet(&mut workbook, PATIENTS_TABLE)?)?;

        info!(
            path = %self.path.display(),
            dispensations = dispensations.len(),
            consultations = consultations.len(),
            patients = patients.len(),
            "workbook snapshot loaded"
        );

        Ok(Snapshot::new(dispensations, consultations, patients))
    }
}

fn sheet(
    workbook: &mut Sheets<BufReader<File>>,
    name: &str,
) -> Result<Range<Data>, IngestError> {
    if !workbook.sheet_names().iter().any(|s| s.as_str() == name) {
        return Err(IngestError::MissingTable(name.to_string()));
    }
    Ok(workbook.worksheet_range(name)?)
}

fn read_dispensations(range: &Range<Data>) -> Result<Vec<DispensationRecord>, IngestError> {
    let mut rows = range.rows();
    let headers = header_row(rows.next());
    let map = ColumnMap::resolve(DISPENSATIONS_TABLE, &DISPENSATION_COLUMNS, &headers)?;

    let c_patient = map.index_of("patient_id")?;
    let c_drug = map.index_of("drug_name")?;
    let c_date = map.index_of("dispensation_date")?;
    let c_quantity = map.index_of("quantity")?;
    let c_amount = map.index_of("amount")?;
    let c_document = map.index_of("document_type")?;
    let c_family = map.index_of("family")?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        // 1-based spreadsheet row, header included
        let row_no = idx + 2;
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        let patient_id = opt_i64(row.get(c_patient), DISPENSATIONS_TABLE, row_no, "patient_id")?
            .ok_or_else(|| missing(DISPENSATIONS_TABLE, row_no, "patient_id"))?;
        let drug_name = opt_string(row.get(c_drug))
            .ok_or_else(|| missing(DISPENSATIONS_TABLE, row_no, "drug_name"))?;
        let dispensation_date =
            opt_date(row.get(c_date), DISPENSATIONS_TABLE, row_no, "dispensation_date")?
                .ok_or_else(|| missing(DISPENSATIONS_TABLE, row_no, "dispensation_date"))?;
        let quantity =
            opt_f64(row.get(c_quantity), DISPENSATIONS_TABLE, row_no, "quantity")?.unwrap_or(0.0);
        let amount =
            opt_f64(row.get(c_amount), DISPENSATIONS_TABLE, row_no, "amount")?.unwrap_or(0.0);

        records.push(DispensationRecord {
            patient_id,
            drug_name,
            dispensation_date,
            quantity,
            amount,
            document_type: normalize_category(opt_string(row.get(c_document)).as_deref()),
            family: normalize_category(opt_string(row.get(c_family)).as_deref()),
        });
    }
    Ok(records)
}

fn read_consultations(range: &Range<Data>) -> Result<Vec<RawConsultation>, IngestError> {
    let mut rows = range.rows();
    let headers = header_row(rows.next());
    let map = ColumnMap::resolve(CONSULTATIONS_TABLE, &CONSULTATION_COLUMNS, &headers)?;

    let c_patient = map.index_of("patient_id")?;
    let c_activity = map.index_of("activity_type_code")?;
    let c_date = map.index_of("consultation_date")?;
    let c_schedule = map.index_of("schedule_description")?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let row_no = idx + 2;
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        records.push(RawConsultation {
            patient_id: opt_i64(row.get(c_patient), CONSULTATIONS_TABLE, row_no, "patient_id")?,
            activity_type_code: opt_string(row.get(c_activity)),
            consultation_date: opt_date(
                row.get(c_date),
                CONSULTATIONS_TABLE,
                row_no,
                "consultation_date",
            )?,
            schedule_description: opt_string(row.get(c_schedule)),
        });
    }
    Ok(records)
}

fn read_patients(range: &Range<Data>) -> Result<Vec<PatientRecord>, IngestError> {
    let mut rows = range.rows();
    let headers = header_row(rows.next());
    let map = ColumnMap::resolve(PATIENTS_TABLE, &PATIENT_COLUMNS, &headers)?;

    let c_patient = map.index_of("patient_id")?;
    let c_birth = map.index_of("birth_date")?;
    let c_death = map.index_of("death_date")?;
    let c_district = map.index_of("district")?;
    let c_sex = map.index_of("sex")?;

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let row_no = idx + 2;
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        let patient_id = opt_i64(row.get(c_patient), PATIENTS_TABLE, row_no, "patient_id")?
            .ok_or_else(|| missing(PATIENTS_TABLE, row_no, "patient_id"))?;
        let birth_date = opt_date(row.get(c_birth), PATIENTS_TABLE, row_no, "birth_date")?
            .ok_or_else(|| missing(PATIENTS_TABLE, row_no, "birth_date"))?;
        let death_date = opt_date(row.get(c_death), PATIENTS_TABLE, row_no, "death_date")?;

        records.push(PatientRecord {
            patient_id,
            birth_date,
            death_date,
            district: normalize_category(opt_string(row.get(c_district)).as_deref()),
            sex: Sex::from_source(opt_string(row.get(c_sex)).as_deref()),
        });
    }
    Ok(records)
}

fn header_row(row: Option<&[Data]>) -> Vec<String> {
    row.map(|cells| {
        cells
            .iter()
            .map(|c| c.as_string().unwrap_or_default())
            .collect()
    })
    .unwrap_or_default()
}

fn missing(table: &str, row: usize, column: &str) -> IngestError {
    IngestError::MissingValue {
        table: table.to_string(),
        row,
        column: column.to_string(),
    }
}

fn opt_string(cell: Option<&Data>) -> Option<String> {
    let cell = cell?;
    if cell.is_empty() {
        return None;
    }
    cell.as_string()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn opt_i64(
    cell: Option<&Data>,
    table: &str,
    row: usize,
    column: &str,
) -> Result<Option<i64>, IngestError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    if cell.is_empty() {
        return Ok(None);
    }
    if let Some(v) = cell.as_i64() {
        return Ok(Some(v));
    }
    if let Some(f) = cell.as_f64() {
        if f.fract() == 0.0 {
            return Ok(Some(f as i64));
        }
    }
    if let Some(s) = cell.get_string() {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Some(v));
        }
    }
    Err(IngestError::InvalidNumber {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })
}

fn opt_f64(
    cell: Option<&Data>,
    table: &str,
    row: usize,
    column: &str,
) -> Result<Option<f64>, IngestError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    if cell.is_empty() {
        return Ok(None);
    }
    if let Some(v) = cell.as_f64() {
        return Ok(Some(v));
    }
    if let Some(s) = cell.get_string() {
        let trimmed = s.trim().replace(',', ".");
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Ok(Some(v));
        }
    }
    Err(IngestError::InvalidNumber {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })
}

fn opt_date(
    cell: Option<&Data>,
    table: &str,
    row: usize,
    column: &str,
) -> Result<Option<NaiveDate>, IngestError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    if cell.is_empty() {
        return Ok(None);
    }
    if let Some(date) = cell.as_date() {
        return Ok(Some(date));
    }
    if let Some(s) = cell.get_string() {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Some(date) = parse_date_str(trimmed) {
            return Ok(Some(date));
        }
    }
    Err(IngestError::InvalidDate {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })
}
