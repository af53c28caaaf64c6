//! Cost aggregation for the dashboard's bar and pie charts.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{DispensationFilter, DispensationRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyCost {
    pub year: i32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyCost {
    pub family: String,
    pub total: f64,
}

/// Total medication cost per calendar year, ascending by year.
pub fn yearly_costs(
    rows: &[DispensationRecord],
    filter: &DispensationFilter,
) -> Vec<YearlyCost> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in rows.iter().filter(|r| filter.matches(r)) {
        *totals.entry(record.dispensation_date.year()).or_insert(0.0) += record.amount;
    }
    totals
        .into_iter()
        .map(|(year, total)| YearlyCost { year, total })
        .collect()
}

/// Cost distribution by medication family, largest total first
/// (ties keep family name order).
pub fn family_costs(
    rows: &[DispensationRecord],
    filter: &DispensationFilter,
) -> Vec<FamilyCost> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in rows.iter().filter(|r| filter.matches(r)) {
        *totals.entry(record.family.clone()).or_insert(0.0) += record.amount;
    }

    let mut distribution: Vec<FamilyCost> = totals
        .into_iter()
        .map(|(family, total)| FamilyCost { family, total })
        .collect();
    distribution.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    distribution
}
