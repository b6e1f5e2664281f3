use rusqlite::{OptionalExtension, params};
use dashboard_core::{ModelBreakdown, RouteBreakdown, TimeRange, UsageSummary};

use crate::Db;
use crate::error::Result;
use crate::helpers::{row_to_model_breakdown, row_to_route_breakdown};

impl Db {
    pub fn summary(&self, range: &TimeRange) -> Result<UsageSummary> {
        let mut summary = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(failed), 0),
                   COALESCE(SUM(input_tokens), 0),
                   COALESCE(SUM(output_tokens), 0),
                   COALESCE(SUM(reasoning_tokens), 0),
                   COALESCE(SUM(cached_tokens), 0),
                   COALESCE(SUM(total_tokens), 0)
            FROM usage_record
            WHERE occurred_at >= ?1 AND occurred_at < ?2
            "#,
            params![range.start, range.end],
            |row| {
                Ok(UsageSummary {
                    request_count: row.get::<_, i64>(0)? as u64,
                    failed_count: row.get::<_, i64>(1)? as u64,
                    input_tokens: row.get::<_, i64>(2)? as u64,
                    output_tokens: row.get::<_, i64>(3)? as u64,
                    reasoning_tokens: row.get::<_, i64>(4)? as u64,
                    cached_tokens: row.get::<_, i64>(5)? as u64,
                    total_tokens: row.get::<_, i64>(6)? as u64,
                    last_pulled_at: None,
                })
            },
        )?;
        summary.last_pulled_at = self.last_pulled_at()?;
        Ok(summary)
    }

    pub fn last_pulled_at(&self) -> Result<Option<String>> {
        let value: Option<Option<String>> = self
            .conn
            .query_row("SELECT MAX(pulled_at) FROM usage_record", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.flatten())
    }

    pub fn model_breakdown(&self, range: &TimeRange) -> Result<Vec<ModelBreakdown>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT model,
                   COUNT(*),
                   COALESCE(SUM(failed), 0),
                   COALESCE(SUM(input_tokens), 0),
                   COALESCE(SUM(output_tokens), 0),
                   COALESCE(SUM(reasoning_tokens), 0),
                   COALESCE(SUM(cached_tokens), 0),
                   COALESCE(SUM(total_tokens), 0) AS total
            FROM usage_record
            WHERE occurred_at >= ?1 AND occurred_at < ?2
            GROUP BY model
            ORDER BY total DESC, model ASC
            "#,
        )?;
        let rows = stmt.query_map(params![range.start, range.end], row_to_model_breakdown)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn route_breakdown(&self, range: &TimeRange) -> Result<Vec<RouteBreakdown>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT route,
                   COUNT(*),
                   COALESCE(SUM(failed), 0),
                   COALESCE(SUM(input_tokens), 0),
                   COALESCE(SUM(output_tokens), 0),
                   COALESCE(SUM(reasoning_tokens), 0),
                   COALESCE(SUM(cached_tokens), 0),
                   COALESCE(SUM(total_tokens), 0) AS total
            FROM usage_record
            WHERE occurred_at >= ?1 AND occurred_at < ?2
            GROUP BY route
            ORDER BY total DESC, route ASC
            "#,
        )?;
        let rows = stmt.query_map(params![range.start, range.end], row_to_route_breakdown)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
