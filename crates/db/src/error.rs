#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{column} = {value} does not fit in an INTEGER column")]
    CounterOverflow { column: &'static str, value: u64 },
}

pub type Result<T> = std::result::Result<T, DbError>;
