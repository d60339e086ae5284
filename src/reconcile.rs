//! Client-side version reconciliation. The backend stores every KPI update as
//! a new immutable record, so the collection fetched from `/kpis` holds many
//! versions per metric name. Dashboards want exactly one record per name (the
//! most recent), and the detail chart wants the full chronological series for
//! one name. Both views are pure functions over an already-fetched slice.

use crate::models::{KpiCategory, KpiRecord, RawKpi};
use crate::normalize::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One chart point of a metric's historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Anything carrying a metric name and a version timestamp. Canonical records
/// always have a valid timestamp; raw records may not, and an unparseable one
/// must never beat a valid one, so recency is optional here and `None` sorts
/// as oldest-possible.
pub trait Versioned {
    fn version_name(&self) -> &str;
    fn recency(&self) -> Option<DateTime<Utc>>;
}

impl Versioned for KpiRecord {
    fn version_name(&self) -> &str {
        &self.name
    }

    fn recency(&self) -> Option<DateTime<Utc>> {
        Some(self.last_updated)
    }
}

impl Versioned for RawKpi {
    fn version_name(&self) -> &str {
        &self.name
    }

    fn recency(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

/// Collapses a flat collection of version records to one record per distinct
/// name: the one with the maximum `last_updated`. Ties keep the first-seen
/// record, and the output preserves first-seen name order, so the result is
/// deterministic for any fixed input order.
pub fn select_current_per_name<T: Versioned + Clone>(records: &[T]) -> Vec<T> {
    let mut current: Vec<T> = Vec::new();
    let mut slot_by_name: HashMap<String, usize> = HashMap::new();

    for record in records {
        match slot_by_name.get(record.version_name()) {
            Some(&slot) => {
                if recency_key(record) > recency_key(&current[slot]) {
                    current[slot] = record.clone();
                }
            }
            None => {
                slot_by_name.insert(record.version_name().to_string(), current.len());
                current.push(record.clone());
            }
        }
    }

    current
}

/// Reconstructs the chronological series for one metric name, ascending by
/// `last_updated`. The sort is stable, so versions sharing a timestamp stay
/// in input order. A result of length <= 1 means there is not enough history
/// to chart; callers render a placeholder instead.
pub fn build_series(records: &[KpiRecord], name: &str) -> Vec<SeriesPoint> {
    let mut versions: Vec<&KpiRecord> = records
        .iter()
        .filter(|record| record.name == name)
        .collect();
    versions.sort_by_key(|record| record.last_updated);

    versions
        .into_iter()
        .map(|record| SeriesPoint {
            timestamp: record.last_updated,
            value: record.value,
        })
        .collect()
}

/// Current-per-name view of one category. Membership is evaluated per version
/// record, not per metric: a metric whose category changed between versions
/// can surface under both its old and new category, whichever version is
/// current within each. That is the documented product behavior, kept as-is.
pub fn filter_by_category(records: &[KpiRecord], category: KpiCategory) -> Vec<KpiRecord> {
    let matching: Vec<KpiRecord> = records
        .iter()
        .filter(|record| record.category == category)
        .cloned()
        .collect();
    select_current_per_name(&matching)
}

fn recency_key<T: Versioned>(record: &T) -> DateTime<Utc> {
    record.recency().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::{build_series, filter_by_category, select_current_per_name};
    use crate::models::{KpiCategory, KpiRecord, KpiTrend, RawKpi};
    use crate::normalize::parse_timestamp;

    fn record(id: i64, name: &str, value: f64, last_updated: &str) -> KpiRecord {
        let stamp = parse_timestamp(last_updated).expect("test timestamp");
        KpiRecord {
            id,
            name: name.to_string(),
            description: None,
            value,
            target: None,
            unit: "%".to_string(),
            trend: KpiTrend::Stable,
            category: KpiCategory::Production,
            owner_id: None,
            last_updated: stamp,
            created_at: stamp,
            progress: 0,
        }
    }

    fn uptime_downtime_fixture() -> Vec<KpiRecord> {
        vec![
            record(1, "Uptime", 90.0, "2024-01-01"),
            record(2, "Uptime", 95.0, "2024-02-01"),
            record(3, "Downtime", 5.0, "2024-01-15"),
        ]
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(select_current_per_name::<KpiRecord>(&[]).is_empty());
    }

    #[test]
    fn one_record_per_distinct_name() {
        let current = select_current_per_name(&uptime_downtime_fixture());
        assert_eq!(current.len(), 2);
        assert_eq!(current[0].name, "Uptime");
        assert_eq!(current[0].value, 95.0);
        assert_eq!(current[1].name, "Downtime");
        assert_eq!(current[1].value, 5.0);
    }

    #[test]
    fn most_recent_version_wins() {
        let records = vec![
            record(1, "Output", 10.0, "2024-01-01"),
            record(3, "Output", 30.0, "2024-03-01"),
            record(2, "Output", 20.0, "2024-02-01"),
        ];
        let current = select_current_per_name(&records);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, 3);
    }

    #[test]
    fn timestamp_ties_keep_the_first_seen_record() {
        let records = vec![
            record(1, "Output", 10.0, "2024-01-01T08:00:00Z"),
            record(2, "Output", 20.0, "2024-01-01T08:00:00Z"),
        ];
        let current = select_current_per_name(&records);
        assert_eq!(current[0].id, 1);
    }

    #[test]
    fn selection_is_idempotent() {
        let once = select_current_per_name(&uptime_downtime_fixture());
        let twice = select_current_per_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unparseable_recency_never_beats_a_valid_one() {
        let raw = |id: i64, last_updated: Option<&str>| RawKpi {
            id,
            name: "Uptime".to_string(),
            description: None,
            value: None,
            target: None,
            unit: String::new(),
            trend: None,
            category: KpiCategory::Production,
            owner_id: None,
            last_updated: last_updated.map(str::to_string),
            created_at: None,
        };
        let records = vec![raw(1, Some("2001-01-01")), raw(2, Some("garbage")), raw(3, None)];
        let current = select_current_per_name(&records);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, 1);
    }

    #[test]
    fn series_is_chronological_for_any_input_order() {
        let mut records = uptime_downtime_fixture();
        records.reverse();
        let series = build_series(&records, "Uptime");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 90.0);
        assert_eq!(series[1].value, 95.0);
        assert!(series[0].timestamp <= series[1].timestamp);
    }

    #[test]
    fn series_for_unknown_name_is_empty() {
        assert!(build_series(&uptime_downtime_fixture(), "Throughput").is_empty());
    }

    #[test]
    fn duplicate_timestamps_stay_in_input_order() {
        let records = vec![
            record(1, "Output", 10.0, "2024-01-01T08:00:00Z"),
            record(2, "Output", 20.0, "2024-01-01T08:00:00Z"),
        ];
        let series = build_series(&records, "Output");
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[1].value, 20.0);
    }

    #[test]
    fn category_filter_applies_current_per_name() {
        let mut records = uptime_downtime_fixture();
        records[2].category = KpiCategory::Logistics;
        let production = filter_by_category(&records, KpiCategory::Production);
        assert_eq!(production.len(), 1);
        assert_eq!(production[0].name, "Uptime");
        assert_eq!(production[0].value, 95.0);
    }

    #[test]
    fn category_reassignment_surfaces_under_both_categories() {
        // Membership is per version record: the old version is still the
        // most recent *within* the old category.
        let mut records = vec![
            record(1, "Fleet Cost", 100.0, "2024-01-01"),
            record(2, "Fleet Cost", 120.0, "2024-02-01"),
        ];
        records[1].category = KpiCategory::Financial;

        let old_view = filter_by_category(&records, KpiCategory::Production);
        let new_view = filter_by_category(&records, KpiCategory::Financial);
        assert_eq!(old_view.len(), 1);
        assert_eq!(old_view[0].id, 1);
        assert_eq!(new_view.len(), 1);
        assert_eq!(new_view[0].id, 2);
    }
}
