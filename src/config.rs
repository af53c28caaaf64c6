//! Analytics constants and option structs.
//!
//! The continuity threshold and coverage window come from the care unit's
//! dispensing practice: supplies cover about a month, so two dispensations
//! more than 40 days apart belong to separate treatment periods.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "Oncodash";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "oncodash=info"
}

/// Maximum gap in days between two dispensations of the same episode.
pub const EPISODE_MAX_GAP_DAYS: i64 = 40;

/// Supply coverage in days added past the last dispensation of an episode.
pub const EPISODE_COVERAGE_DAYS: i64 = 30;

/// Follow-up window in days for the fixed overdue pass.
pub const OVERDUE_WINDOW_DAYS: i64 = 365;

/// Episode segmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    pub max_gap_days: i64,
    pub coverage_days: i64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_gap_days: EPISODE_MAX_GAP_DAYS,
            coverage_days: EPISODE_COVERAGE_DAYS,
        }
    }
}

/// Options for the overdue-alert pass.
///
/// The default is the fixed variant: cutoff at 365 days before the
/// reference date, deceased patients excluded. Setting `cutoff_date`
/// switches to the caller-chosen cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueOptions {
    pub cutoff_date: Option<NaiveDate>,
    pub include_deceased: bool,
}

impl OverdueOptions {
    /// The cutoff actually applied: the explicit date when set, otherwise
    /// the fixed window counted back from the reference date.
    pub fn effective_cutoff(&self, reference_date: NaiveDate) -> NaiveDate {
        self.cutoff_date
            .unwrap_or(reference_date - Duration::days(OVERDUE_WINDOW_DAYS))
    }
}
