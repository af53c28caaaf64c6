//! Overdue follow-up alerts.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::OverdueOptions;
use crate::models::{ConsultationRecord, OverdueAlert, PatientRecord};

/// Compute the patients overdue for follow-up.
///
/// Consultations dated after `reference_date` are ignored. A roster
/// patient is overdue when their latest remaining consultation is strictly
/// before the effective cutoff. Deceased patients are excluded unless
/// `options.include_deceased` is set. Output is sorted ascending by last
/// consultation date, ties by patient id.
pub fn overdue_alerts(
    consultations: &[ConsultationRecord],
    patients: &[PatientRecord],
    reference_date: NaiveDate,
    options: &OverdueOptions,
) -> Vec<OverdueAlert> {
    let cutoff = options.effective_cutoff(reference_date);

    let mut last_seen: HashMap<i64, NaiveDate> = HashMap::new();
    for consultation in consultations {
        if consultation.consultation_date > reference_date {
            continue;
        }
        let entry = last_seen
            .entry(consultation.patient_id)
            .or_insert(consultation.consultation_date);
        if consultation.consultation_date > *entry {
            *entry = consultation.consultation_date;
        }
    }

    let mut alerts: Vec<OverdueAlert> = patients
        .iter()
        .filter(|p| options.include_deceased || p.death_date.is_none())
        .filter_map(|p| {
            last_seen
                .get(&p.patient_id)
                .copied()
                .map(|last| (p.patient_id, last))
        })
        .filter(|(_, last)| *last < cutoff)
        .map(|(patient_id, last_consultation_date)| OverdueAlert {
            patient_id,
            last_consultation_date,
        })
        .collect();

    alerts.sort_by(|a, b| {
        (a.last_consultation_date, a.patient_id).cmp(&(b.last_consultation_date, b.patient_id))
    });

    debug!(alerts = alerts.len(), cutoff = %cutoff, "overdue pass complete");
    alerts
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::enums::Sex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn consultation(patient_id: i64, consultation_date: NaiveDate) -> ConsultationRecord {
        ConsultationRecord {
            patient_id,
            activity_type_code: "C30".into(),
            consultation_date,
            schedule_description: None,
        }
    }

    fn patient(patient_id: i64, death_date: Option<NaiveDate>) -> PatientRecord {
        PatientRecord {
            patient_id,
            birth_date: date(1958, 7, 14),
            death_date,
            district: "unknown".into(),
            sex: Sex::Female,
        }
    }

    fn reference() -> NaiveDate {
        date(2025, 1, 3)
    }

    #[test]
    fn patient_past_fixed_window_is_alerted() {
        let reference = reference();
        let last = reference - Duration::days(400);
        let alerts = overdue_alerts(
            &[consultation(1, last)],
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        assert_eq!(alerts, vec![OverdueAlert { patient_id: 1, last_consultation_date: last }]);
    }

    #[test]
    fn recent_consultation_suppresses_the_alert() {
        let reference = reference();
        let alerts = overdue_alerts(
            &[
                consultation(1, reference - Duration::days(400)),
                consultation(1, reference - Duration::days(30)),
            ],
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn cutoff_is_strict() {
        let reference = reference();
        let cutoff = reference - Duration::days(365);
        let on_cutoff = overdue_alerts(
            &[consultation(1, cutoff)],
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        assert!(on_cutoff.is_empty(), "last consultation exactly at cutoff is not overdue");

        let one_before = overdue_alerts(
            &[consultation(1, cutoff - Duration::days(1))],
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        assert_eq!(one_before.len(), 1);
    }

    #[test]
    fn deceased_patients_are_excluded_by_default() {
        let reference = reference();
        let last = reference - Duration::days(400);
        let roster = [patient(1, Some(date(2024, 8, 1)))];

        let default_pass = overdue_alerts(
            &[consultation(1, last)],
            &roster,
            reference,
            &OverdueOptions::default(),
        );
        assert!(default_pass.is_empty());

        let inclusive_pass = overdue_alerts(
            &[consultation(1, last)],
            &roster,
            reference,
            &OverdueOptions { include_deceased: true, ..Default::default() },
        );
        assert_eq!(inclusive_pass.len(), 1);
    }

    #[test]
    fn future_dated_consultations_do_not_count() {
        let reference = reference();
        let alerts = overdue_alerts(
            &[
                consultation(1, reference - Duration::days(400)),
                consultation(1, reference + Duration::days(10)),
            ],
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        // the future consultation is ignored, so the patient stays overdue
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].last_consultation_date, reference - Duration::days(400));
    }

    #[test]
    fn explicit_cutoff_replaces_the_window() {
        let reference = reference();
        let options = OverdueOptions {
            cutoff_date: Some(reference - Duration::days(100)),
            include_deceased: false,
        };
        let alerts = overdue_alerts(
            &[
                consultation(1, reference - Duration::days(150)),
                consultation(2, reference - Duration::days(50)),
            ],
            &[patient(1, None), patient(2, None)],
            reference,
            &options,
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].patient_id, 1);
    }

    #[test]
    fn patients_without_consultations_or_off_roster_never_appear() {
        let reference = reference();
        let alerts = overdue_alerts(
            // patient 9 consults but is not on the roster
            &[consultation(9, reference - Duration::days(400))],
            // patient 1 is on the roster but never consulted
            &[patient(1, None)],
            reference,
            &OverdueOptions::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn alerts_sort_ascending_by_last_consultation() {
        let reference = reference();
        let alerts = overdue_alerts(
            &[
                consultation(3, reference - Duration::days(380)),
                consultation(1, reference - Duration::days(500)),
                consultation(2, reference - Duration::days(450)),
            ],
            &[patient(1, None), patient(2, None), patient(3, None)],
            reference,
            &OverdueOptions::default(),
        );
        let order: Vec<i64> = alerts.iter().map(|a| a.patient_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
