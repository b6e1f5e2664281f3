use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use dashboard_core::{UsageRecord, UsageTokens};
use serde_json::{Map, Value};

use crate::types::{IngestError, Result, UsageEntry, UsagePayload, invalid_entry, kind_of};

const ROUTE_KEYS: &[&str] = &["route", "api", "endpoint"];
const MODEL_KEYS: &[&str] = &["model"];
const TIMESTAMP_KEYS: &[&str] = &["occurredAt", "occurred_at", "timestamp"];
const INPUT_KEYS: &[&str] = &["inputTokens", "input_tokens"];
const OUTPUT_KEYS: &[&str] = &["outputTokens", "output_tokens"];
const REASONING_KEYS: &[&str] = &["reasoningTokens", "reasoning_tokens"];
const CACHED_KEYS: &[&str] = &["cachedTokens", "cached_tokens"];
const TOTAL_KEYS: &[&str] = &["totalTokens", "total_tokens"];

/// Decodes an upstream `/usage` body and validates every entry.
pub fn parse_usage_payload(body: &[u8]) -> Result<UsagePayload> {
    let value: Value = serde_json::from_slice(body)?;
    parse_usage_value(&value)
}

pub fn parse_usage_value(value: &Value) -> Result<UsagePayload> {
    let usage = value
        .as_object()
        .and_then(|object| object.get("usage"))
        .ok_or(IngestError::MissingUsage)?;
    let entries = match usage {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_flat_entry(index, item))
            .collect::<Result<Vec<_>>>()?,
        Value::Object(object) => parse_aggregate(object)?,
        other => return Err(IngestError::UnexpectedShape(kind_of(other))),
    };
    Ok(UsagePayload { entries })
}

/// Stamps each entry with the sync time.
pub fn to_usage_records(payload: &UsagePayload, pulled_at: DateTime<Utc>) -> Vec<UsageRecord> {
    let pulled_at = pulled_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    payload
        .entries
        .iter()
        .map(|entry| UsageRecord {
            occurred_at: entry.occurred_at.clone(),
            route: entry.route.clone(),
            model: entry.model.clone(),
            tokens: entry.tokens,
            failed: entry.failed,
            pulled_at: pulled_at.clone(),
            raw_json: serde_json::to_string(&entry.raw).ok(),
        })
        .collect()
}

/// Normalizes RFC 3339, naive `YYYY-MM-DD[T ]HH:MM:SS` (read as UTC) and
/// epoch seconds or milliseconds to `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_utc(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(format_utc(parsed.and_utc()));
        }
    }
    if !raw.is_empty()
        && raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(value) = raw.parse::<i64>()
    {
        return from_epoch(value, raw.len() > 10);
    }
    None
}

fn format_utc(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn from_epoch(value: i64, millis: bool) -> Option<String> {
    let (secs, nanos) = if millis {
        (
            value.div_euclid(1000),
            value.rem_euclid(1000) as u32 * 1_000_000,
        )
    } else {
        (value, 0)
    };
    DateTime::<Utc>::from_timestamp(secs, nanos).map(format_utc)
}

fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => normalize_timestamp(raw),
        Value::Number(number) => {
            let value = number.as_i64()?;
            from_epoch(value, value.unsigned_abs() >= 10_000_000_000)
        }
        _ => None,
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn required_string(
    object: &Map<String, Value>,
    keys: &[&str],
    location: &str,
) -> Result<String> {
    match lookup(object, keys) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(Value::String(_)) => Err(invalid_entry(location, format!("{} is empty", keys[0]))),
        Some(other) => Err(invalid_entry(
            location,
            format!("{} must be a string, got {}", keys[0], kind_of(other)),
        )),
        None => Err(invalid_entry(location, format!("{} is missing", keys[0]))),
    }
}

fn optional_u64(
    object: &Map<String, Value>,
    keys: &[&str],
    location: &str,
) -> Result<Option<u64>> {
    match lookup(object, keys) {
        None => Ok(None),
        // Counters are stored as SQLite INTEGER, so they must fit in an i64.
        Some(value) => value
            .as_i64()
            .filter(|count| *count >= 0)
            .map(|count| Some(count as u64))
            .ok_or_else(|| {
                invalid_entry(
                    location,
                    format!(
                        "{} must be a non-negative integer no larger than {}",
                        keys[0],
                        i64::MAX
                    ),
                )
            }),
    }
}

fn required_timestamp(object: &Map<String, Value>, location: &str) -> Result<String> {
    let raw = lookup(object, TIMESTAMP_KEYS)
        .ok_or_else(|| invalid_entry(location, "occurredAt is missing"))?;
    timestamp_from_value(raw)
        .ok_or_else(|| invalid_entry(location, format!("unparseable timestamp {raw}")))
}

fn parse_failed(object: &Map<String, Value>, location: &str) -> Result<bool> {
    match object.get("failed") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(invalid_entry(
            location,
            format!("failed must be a bool, got {}", kind_of(other)),
        )),
    }
}

fn counters_from(object: &Map<String, Value>, location: &str) -> Result<UsageTokens> {
    Ok(UsageTokens::from_parts(
        optional_u64(object, INPUT_KEYS, location)?,
        optional_u64(object, OUTPUT_KEYS, location)?,
        optional_u64(object, REASONING_KEYS, location)?,
        optional_u64(object, CACHED_KEYS, location)?,
        optional_u64(object, TOTAL_KEYS, location)?,
    ))
}

/// `tokens` is either a nested counter object or a bare total.
fn parse_tokens(object: &Map<String, Value>, location: &str) -> Result<UsageTokens> {
    match object.get("tokens") {
        Some(Value::Object(nested)) => counters_from(nested, location),
        Some(Value::Number(_)) => {
            let total = optional_u64(object, &["tokens"], location)?;
            let mut tokens = counters_from(object, location)?;
            if lookup(object, TOTAL_KEYS).is_none() {
                tokens.total_tokens = total.unwrap_or(tokens.total_tokens);
            }
            Ok(tokens)
        }
        None | Some(Value::Null) => counters_from(object, location),
        Some(other) => Err(invalid_entry(
            location,
            format!("tokens must be a number or object, got {}", kind_of(other)),
        )),
    }
}

fn parse_flat_entry(index: usize, value: &Value) -> Result<UsageEntry> {
    let location = format!("#{index}");
    let object = value.as_object().ok_or_else(|| {
        invalid_entry(
            &location,
            format!("expected object, got {}", kind_of(value)),
        )
    })?;
    Ok(UsageEntry {
        occurred_at: required_timestamp(object, &location)?,
        route: required_string(object, ROUTE_KEYS, &location)?,
        model: required_string(object, MODEL_KEYS, &location)?,
        tokens: parse_tokens(object, &location)?,
        failed: parse_failed(object, &location)?,
        raw: value.clone(),
    })
}

/// Walks `apis -> <route> -> models -> <model> -> details[]`.
fn parse_aggregate(usage: &Map<String, Value>) -> Result<Vec<UsageEntry>> {
    let apis = match usage.get("apis") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(apis)) => apis,
        Some(other) => return Err(IngestError::UnexpectedShape(kind_of(other))),
    };
    let mut entries = Vec::new();
    for (route, api) in apis {
        let models = match api.get("models") {
            None | Some(Value::Null) => continue,
            Some(Value::Object(models)) => models,
            Some(other) => {
                return Err(invalid_entry(
                    route.as_str(),
                    format!("models must be an object, got {}", kind_of(other)),
                ));
            }
        };
        for (model, stats) in models {
            let details = match stats.get("details") {
                None | Some(Value::Null) => continue,
                Some(Value::Array(details)) => details,
                Some(other) => {
                    return Err(invalid_entry(
                        format!("{route}/{model}"),
                        format!("details must be a list, got {}", kind_of(other)),
                    ));
                }
            };
            for (index, detail) in details.iter().enumerate() {
                let location = format!("{route}/{model}#{index}");
                let object = detail.as_object().ok_or_else(|| {
                    invalid_entry(
                        &location,
                        format!("expected object, got {}", kind_of(detail)),
                    )
                })?;
                if route.trim().is_empty() || model.trim().is_empty() {
                    return Err(invalid_entry(location, "route and model must be non-empty"));
                }
                entries.push(UsageEntry {
                    occurred_at: required_timestamp(object, &location)?,
                    route: route.trim().to_string(),
                    model: model.trim().to_string(),
                    tokens: parse_tokens(object, &location)?,
                    failed: parse_failed(object, &location)?,
                    raw: detail.clone(),
                });
            }
        }
    }
    Ok(entries)
}
