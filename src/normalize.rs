use crate::models::{KpiRecord, KpiTrend, RawKpi};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Promotes a raw wire record to the canonical shape. Total over any input:
/// non-numeric values coerce to 0, a non-numeric target is dropped, and
/// missing or malformed timestamps fall back to the current instant so a bad
/// record degrades to a renderable one instead of an error.
pub fn normalize_kpi(raw: &RawKpi) -> KpiRecord {
    normalize_kpi_at(raw, Utc::now())
}

/// Same as [`normalize_kpi`] with an injected clock for the timestamp
/// fallback.
pub fn normalize_kpi_at(raw: &RawKpi, now: DateTime<Utc>) -> KpiRecord {
    let value = raw.value.as_ref().and_then(coerce_number).unwrap_or(0.0);
    let target = raw.target.as_ref().and_then(coerce_number);

    KpiRecord {
        id: raw.id,
        name: raw.name.clone(),
        description: raw.description.clone(),
        value,
        target,
        unit: raw.unit.clone(),
        trend: raw.trend.unwrap_or(KpiTrend::Stable),
        category: raw.category,
        owner_id: raw.owner_id,
        last_updated: raw
            .last_updated
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now),
        created_at: raw
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now),
        progress: progress_for(value, target),
    }
}

/// Percent toward target: `min(round(value / target * 100), 100)` when the
/// target is positive, otherwise 0.
pub fn progress_for(value: f64, target: Option<f64>) -> i64 {
    match target {
        Some(target) if target > 0.0 => {
            let percent = (value / target * 100.0).round();
            percent.min(100.0) as i64
        }
        _ => 0,
    }
}

/// Lenient ISO-8601 parse. The backend emits RFC 3339, but records written by
/// older builds carry naive datetimes or bare dates, so those are accepted
/// too (bare dates resolve to midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
