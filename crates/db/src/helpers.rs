use rusqlite::Row;
use dashboard_core::{ModelBreakdown, RouteBreakdown, StoredUsageRecord, UsageTokens};

fn tokens_at(row: &Row<'_>, start: usize) -> std::result::Result<UsageTokens, rusqlite::Error> {
    Ok(UsageTokens {
        input_tokens: row.get::<_, i64>(start)? as u64,
        output_tokens: row.get::<_, i64>(start + 1)? as u64,
        reasoning_tokens: row.get::<_, i64>(start + 2)? as u64,
        cached_tokens: row.get::<_, i64>(start + 3)? as u64,
        total_tokens: row.get::<_, i64>(start + 4)? as u64,
    })
}

pub(crate) fn row_to_stored_record(
    row: &Row<'_>,
) -> std::result::Result<StoredUsageRecord, rusqlite::Error> {
    Ok(StoredUsageRecord {
        id: row.get(0)?,
        occurred_at: row.get(1)?,
        route: row.get(2)?,
        model: row.get(3)?,
        tokens: tokens_at(row, 4)?,
        failed: row.get::<_, i64>(9)? != 0,
        pulled_at: row.get(10)?,
    })
}

pub(crate) fn row_to_model_breakdown(
    row: &Row<'_>,
) -> std::result::Result<ModelBreakdown, rusqlite::Error> {
    Ok(ModelBreakdown {
        model: row.get(0)?,
        request_count: row.get::<_, i64>(1)? as u64,
        failed_count: row.get::<_, i64>(2)? as u64,
        tokens: tokens_at(row, 3)?,
    })
}

pub(crate) fn row_to_route_breakdown(
    row: &Row<'_>,
) -> std::result::Result<RouteBreakdown, rusqlite::Error> {
    Ok(RouteBreakdown {
        route: row.get(0)?,
        request_count: row.get::<_, i64>(1)? as u64,
        failed_count: row.get::<_, i64>(2)? as u64,
        tokens: tokens_at(row, 3)?,
    })
}
