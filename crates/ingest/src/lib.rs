mod parser;
mod types;
mod upstream;

pub use parser::{normalize_timestamp, parse_usage_payload, parse_usage_value, to_usage_records};
pub use types::{IngestError, Result, UsageEntry, UsagePayload};
pub use upstream::{FetchError, HttpUsageSource, UpstreamTarget, UsageSource};
