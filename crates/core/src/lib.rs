use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTokens {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cached_tokens: u64,
    pub total_tokens: u64,
}

impl UsageTokens {
    /// Builds counters from optional upstream values. A missing total is
    /// derived from the input, output and reasoning counts.
    pub fn from_parts(
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
        reasoning_tokens: Option<u64>,
        cached_tokens: Option<u64>,
        total_tokens: Option<u64>,
    ) -> Self {
        let input_tokens = input_tokens.unwrap_or(0);
        let output_tokens = output_tokens.unwrap_or(0);
        let reasoning_tokens = reasoning_tokens.unwrap_or(0);
        let total_tokens = total_tokens.unwrap_or_else(|| {
            input_tokens
                .saturating_add(output_tokens)
                .saturating_add(reasoning_tokens)
        });
        Self {
            input_tokens,
            output_tokens,
            reasoning_tokens,
            cached_tokens: cached_tokens.unwrap_or(0),
            total_tokens,
        }
    }
}

/// One observed usage event pulled from the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub occurred_at: String,
    pub route: String,
    pub model: String,
    pub tokens: UsageTokens,
    pub failed: bool,
    pub pulled_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_json: Option<String>,
}

/// A stored row as returned by read queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUsageRecord {
    pub id: i64,
    pub occurred_at: String,
    pub route: String,
    pub model: String,
    pub tokens: UsageTokens,
    pub failed: bool,
    pub pulled_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub request_count: u64,
    pub failed_count: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cached_tokens: u64,
    pub total_tokens: u64,
    pub last_pulled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBreakdown {
    pub model: String,
    pub request_count: u64,
    pub failed_count: u64,
    pub tokens: UsageTokens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBreakdown {
    pub route: String,
    pub request_count: u64,
    pub failed_count: u64,
    pub tokens: UsageTokens,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_defaults_to_sum_of_counters() {
        let tokens = UsageTokens::from_parts(Some(10), Some(4), Some(2), Some(3), None);
        assert_eq!(tokens.total_tokens, 16);
        assert_eq!(tokens.cached_tokens, 3);
    }

    #[test]
    fn explicit_total_is_kept() {
        let tokens = UsageTokens::from_parts(None, None, None, None, Some(10));
        assert_eq!(tokens.total_tokens, 10);
        assert_eq!(tokens.input_tokens, 0);
    }
}
