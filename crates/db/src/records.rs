use rusqlite::params;
use dashboard_core::{StoredUsageRecord, TimeRange, UsageRecord};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::row_to_stored_record;
use crate::types::{InsertOutcome, RecordFilter};

impl Db {
    /// Inserts rows in one transaction. A row whose `(occurred_at, route,
    /// model)` already exists is skipped and not counted in `rows_affected`.
    pub fn insert_usage_records(&mut self, records: &[UsageRecord]) -> Result<InsertOutcome> {
        let mut outcome = InsertOutcome {
            attempted: records.len(),
            rows_affected: 0,
        };
        if records.is_empty() {
            return Ok(outcome);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO usage_record (
                  occurred_at, route, model, input_tokens, output_tokens,
                  reasoning_tokens, cached_tokens, total_tokens, failed,
                  pulled_at, raw_json
                ) VALUES (
                  ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
                )
                ON CONFLICT (occurred_at, route, model) DO NOTHING
                "#,
            )?;
            for record in records {
                let tokens = &record.tokens;
                let rows = stmt.execute(params![
                    record.occurred_at,
                    record.route,
                    record.model,
                    to_sql_int("input_tokens", tokens.input_tokens)?,
                    to_sql_int("output_tokens", tokens.output_tokens)?,
                    to_sql_int("reasoning_tokens", tokens.reasoning_tokens)?,
                    to_sql_int("cached_tokens", tokens.cached_tokens)?,
                    to_sql_int("total_tokens", tokens.total_tokens)?,
                    record.failed as i64,
                    record.pulled_at,
                    record.raw_json,
                ])?;
                outcome.rows_affected += rows;
            }
        }
        tx.commit()?;
        Ok(outcome)
    }

    pub fn count_usage_records(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM usage_record", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Newest-first listing inside `range`.
    pub fn list_usage_records(
        &self,
        range: &TimeRange,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredUsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, occurred_at, route, model, input_tokens, output_tokens,
                   reasoning_tokens, cached_tokens, total_tokens, failed, pulled_at
            FROM usage_record
            WHERE occurred_at >= ?1 AND occurred_at < ?2
              AND (?3 IS NULL OR model = ?3)
              AND (?4 IS NULL OR route = ?4)
            ORDER BY occurred_at DESC, id DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                range.start,
                range.end,
                filter.model,
                filter.route,
                filter.limit as i64,
                filter.offset as i64
            ],
            row_to_stored_record,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn to_sql_int(column: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| DbError::CounterOverflow { column, value })
}
