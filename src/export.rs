//! Alert-list export for the dashboard's download action.

use std::io::Write;

use thiserror::Error;

use crate::models::OverdueAlert;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the alert list as CSV with a header row and ISO dates.
/// An empty list still produces the header.
pub fn write_alerts_csv<W: Write>(writer: W, alerts: &[OverdueAlert]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["patient_id", "last_consultation_date"])?;
    for alert in alerts {
        csv_writer.write_record([
            alert.patient_id.to_string(),
            alert.last_consultation_date.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize the alert list as pretty-printed JSON.
pub fn alerts_to_json(alerts: &[OverdueAlert]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(alerts)?)
}
