//! Treatment episode segmentation.
//!
//! A dispensation continues its predecessor's episode when the gap between
//! them is at most `max_gap_days`; a larger gap starts a new episode. The
//! episode end date carries the supply coverage window past the last
//! dispensation, so the timeline shows covered time rather than pickup
//! dates.

use chrono::Duration;
use tracing::debug;

use crate::config::EpisodeConfig;
use crate::models::{DispensationRecord, TreatmentEpisode};

/// Partition dispensations into continuous treatment episodes.
///
/// Rows are stable-sorted by (patient_id, drug_name, date), so equal dates
/// keep their source order. Expects cleaned input (quantity > 0); episodes
/// come out grouped, each group's episodes indexed from 0 in date order.
pub fn build_episodes(
    rows: &[DispensationRecord],
    config: &EpisodeConfig,
) -> Vec<TreatmentEpisode> {
    let mut sorted: Vec<&DispensationRecord> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        (a.patient_id, &a.drug_name, a.dispensation_date)
            .cmp(&(b.patient_id, &b.drug_name, b.dispensation_date))
    });

    let mut episodes = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let group_start = i;
        let patient_id = sorted[i].patient_id;
        let drug_name = &sorted[i].drug_name;
        while i < sorted.len()
            && sorted[i].patient_id == patient_id
            && sorted[i].drug_name == *drug_name
        {
            i += 1;
        }
        segment_group(&sorted[group_start..i], config, &mut episodes);
    }

    debug!(
        dispensations = rows.len(),
        episodes = episodes.len(),
        "episode segmentation complete"
    );
    episodes
}

/// Segment one (patient, drug) group, already sorted by date.
fn segment_group(
    group: &[&DispensationRecord],
    config: &EpisodeConfig,
    out: &mut Vec<TreatmentEpisode>,
) {
    let mut rows = group.iter();
    let Some(first) = rows.next() else {
        return;
    };

    let mut episode_index = 0u32;
    let mut start = first.dispensation_date;
    let mut last = first.dispensation_date;
    let mut total_cost = first.amount;

    for row in rows {
        if (row.dispensation_date - last).num_days() > config.max_gap_days {
            out.push(close_episode(first, episode_index, start, last, total_cost, config));
            episode_index += 1;
            start = row.dispensation_date;
            total_cost = 0.0;
        }
        last = row.dispensation_date;
        total_cost += row.amount;
    }

    out.push(close_episode(first, episode_index, start, last, total_cost, config));
}

fn close_episode(
    key: &DispensationRecord,
    episode_index: u32,
    start: chrono::NaiveDate,
    last: chrono::NaiveDate,
    total_cost: f64,
    config: &EpisodeConfig,
) -> TreatmentEpisode {
    TreatmentEpisode {
        patient_id: key.patient_id,
        drug_name: key.drug_name.clone(),
        episode_index,
        start_date: start,
        end_date: last + Duration::days(config.coverage_days),
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n - 1)
    }

    fn dispensation(patient_id: i64, drug: &str, date: NaiveDate, amount: f64) -> DispensationRecord {
        DispensationRecord {
            patient_id,
            drug_name: drug.into(),
            dispensation_date: date,
            quantity: 1.0,
            amount,
            document_type: "unknown".into(),
            family: "unknown".into(),
        }
    }

    #[test]
    fn gap_over_threshold_splits_episodes() {
        // days 1, 10, 60, 65: the 50-day gap splits the group in two
        let rows = vec![
            dispensation(42, "X", day(1), 10.0),
            dispensation(42, "X", day(10), 20.0),
            dispensation(42, "X", day(60), 30.0),
            dispensation(42, "X", day(65), 40.0),
        ];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].episode_index, 0);
        assert_eq!(episodes[0].start_date, day(1));
        assert_eq!(episodes[0].end_date, day(40));
        assert_eq!(episodes[0].total_cost, 30.0);
        assert_eq!(episodes[1].episode_index, 1);
        assert_eq!(episodes[1].start_date, day(60));
        assert_eq!(episodes[1].end_date, day(95));
        assert_eq!(episodes[1].total_cost, 70.0);
    }

    #[test]
    fn gap_exactly_at_threshold_stays_one_episode() {
        let rows = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "X", day(41), 1.0),
        ];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_date, day(1));
        assert_eq!(episodes[0].end_date, day(71));
    }

    #[test]
    fn gap_one_past_threshold_splits() {
        let rows = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "X", day(42), 1.0),
        ];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());
        assert_eq!(episodes.len(), 2);
    }

    #[test]
    fn single_dispensation_spans_only_the_coverage_window() {
        let rows = vec![dispensation(1, "X", day(5), 12.5)];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_date, day(5));
        assert_eq!(episodes[0].end_date, day(35));
        assert_eq!(episodes[0].total_cost, 12.5);
    }

    #[test]
    fn groups_are_segmented_independently() {
        let rows = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "Y", day(1), 2.0),
            dispensation(2, "X", day(1), 3.0),
            dispensation(1, "X", day(100), 4.0),
        ];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());

        assert_eq!(episodes.len(), 4);
        let for_group = |pid: i64, drug: &str| {
            episodes
                .iter()
                .filter(|e| e.patient_id == pid && e.drug_name == drug)
                .count()
        };
        assert_eq!(for_group(1, "X"), 2);
        assert_eq!(for_group(1, "Y"), 1);
        assert_eq!(for_group(2, "X"), 1);
    }

    #[test]
    fn equal_dates_merge_and_sum_costs() {
        let rows = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "X", day(1), 2.0),
        ];
        let episodes = build_episodes(&rows, &EpisodeConfig::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].total_cost, 3.0);
        assert_eq!(episodes[0].start_date, day(1));
        assert_eq!(episodes[0].end_date, day(31));
    }

    #[test]
    fn input_order_does_not_change_the_result() {
        let ordered = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "X", day(10), 2.0),
            dispensation(1, "X", day(80), 3.0),
        ];
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 2);

        let config = EpisodeConfig::default();
        assert_eq!(build_episodes(&ordered, &config), build_episodes(&shuffled, &config));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let rows = vec![
            dispensation(1, "X", day(1), 1.0),
            dispensation(1, "X", day(50), 2.0),
            dispensation(2, "Y", day(3), 3.0),
        ];
        let config = EpisodeConfig::default();
        assert_eq!(build_episodes(&rows, &config), build_episodes(&rows, &config));
    }

    #[test]
    fn episode_gap_property_holds() {
        let dates = [1i64, 5, 30, 72, 80, 130, 171, 240];
        let rows: Vec<DispensationRecord> = dates
            .iter()
            .map(|&n| dispensation(9, "X", day(n), 1.0))
            .collect();
        let config = EpisodeConfig::default();
        let episodes = build_episodes(&rows, &config);

        // within an episode every consecutive gap <= threshold; across a
        // boundary the gap from last covered date to next start > threshold
        for pair in episodes.windows(2) {
            let prev_last = pair[0].end_date - Duration::days(config.coverage_days);
            let gap = (pair[1].start_date - prev_last).num_days();
            assert!(gap > config.max_gap_days, "boundary gap was {gap}");
        }
        for episode in &episodes {
            let inside: Vec<NaiveDate> = dates
                .iter()
                .map(|&n| day(n))
                .filter(|d| {
                    *d >= episode.start_date
                        && *d <= episode.end_date - Duration::days(config.coverage_days)
                })
                .collect();
            for pair in inside.windows(2) {
                assert!((pair[1] - pair[0]).num_days() <= config.max_gap_days);
            }
        }
    }

    #[test]
    fn empty_input_yields_no_episodes() {
        let episodes = build_episodes(&[], &EpisodeConfig::default());
        assert!(episodes.is_empty());
    }
}
