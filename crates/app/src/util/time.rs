use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::config::RangeParams;
use crate::error::{AppError, Result};
use dashboard_core::TimeRange;

const DEFAULT_RANGE: &str = "last7days";
const EPOCH: &str = "1970-01-01T00:00:00.000Z";

/// Resolves explicit `start`/`end` bounds, or a named window ending now.
pub fn resolve_range(params: &RangeParams) -> Result<TimeRange> {
    resolve_range_at(params, Utc::now())
}

pub(crate) fn resolve_range_at(params: &RangeParams, now: DateTime<Utc>) -> Result<TimeRange> {
    let end = match params.end.as_deref() {
        Some(end) => normalize_rfc3339_to_utc(end)?,
        None => format_utc(now),
    };
    if let Some(start) = params.start.as_deref() {
        let start = normalize_rfc3339_to_utc(start)?;
        if start > end {
            return Err(AppError::InvalidInput(
                "start must not be after end".to_string(),
            ));
        }
        return Ok(TimeRange { start, end });
    }
    let window = match params.range.as_deref().unwrap_or(DEFAULT_RANGE) {
        "last24hours" => Some(Duration::hours(24)),
        "last7days" => Some(Duration::days(7)),
        "last14days" => Some(Duration::days(14)),
        "last30days" => Some(Duration::days(30)),
        "alltime" => None,
        value => {
            return Err(AppError::InvalidInput(format!("unsupported range {value}")));
        }
    };
    let start = match window {
        Some(window) => format_utc(now - window),
        None => EPOCH.to_string(),
    };
    Ok(TimeRange { start, end })
}

pub fn normalize_rfc3339_to_utc(value: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|err| AppError::InvalidInput(format!("invalid datetime: {err}")))?;
    Ok(format_utc(parsed.with_timezone(&Utc)))
}

fn format_utc(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
