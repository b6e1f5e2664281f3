use serde::Deserialize;

use crate::config::RangeParams;
use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::util::time::resolve_range;
use dashboard_core::{ModelBreakdown, RouteBreakdown, StoredUsageRecord, UsageSummary};
use dashboard_db::{Db, RecordFilter};

const DEFAULT_RECORD_LIMIT: u32 = 100;
const MAX_RECORD_LIMIT: u32 = 1000;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub model: Option<String>,
    pub route: Option<String>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    config: SharedConfig,
}

impl AnalyticsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn summary(&self, params: &RangeParams) -> Result<UsageSummary> {
        let range = resolve_range(params)?;
        Ok(self.db()?.summary(&range)?)
    }

    pub fn models(&self, params: &RangeParams) -> Result<Vec<ModelBreakdown>> {
        let range = resolve_range(params)?;
        Ok(self.db()?.model_breakdown(&range)?)
    }

    pub fn routes(&self, params: &RangeParams) -> Result<Vec<RouteBreakdown>> {
        let range = resolve_range(params)?;
        Ok(self.db()?.route_breakdown(&range)?)
    }

    pub fn records(&self, query: &RecordsQuery) -> Result<Vec<StoredUsageRecord>> {
        let range = resolve_range(&RangeParams {
            range: query.range.clone(),
            start: query.start.clone(),
            end: query.end.clone(),
        })?;
        let filter = RecordFilter {
            model: non_empty(query.model.as_deref()),
            route: non_empty(query.route.as_deref()),
            limit: query
                .limit
                .unwrap_or(DEFAULT_RECORD_LIMIT)
                .min(MAX_RECORD_LIMIT),
            offset: query.offset.unwrap_or(0),
        };
        Ok(self.db()?.list_usage_records(&range, &filter)?)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
