use dashboard_core::UsageTokens;
use serde_json::Value;

/// A validated upstream entry that has not yet been stamped by a sync run.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEntry {
    pub occurred_at: String,
    pub route: String,
    pub model: String,
    pub tokens: UsageTokens,
    pub failed: bool,
    pub raw: Value,
}

/// Upstream `/usage` response after validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsagePayload {
    pub entries: Vec<UsageEntry>,
}

impl UsagePayload {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors emitted while validating an upstream usage payload.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response has no usage field")]
    MissingUsage,
    #[error("usage must be a list or an object with apis, got {0}")]
    UnexpectedShape(&'static str),
    #[error("usage entry {location}: {reason}")]
    InvalidEntry { location: String, reason: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;

pub(crate) fn invalid_entry(location: impl Into<String>, reason: impl Into<String>) -> IngestError {
    IngestError::InvalidEntry {
        location: location.into(),
        reason: reason.into(),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
