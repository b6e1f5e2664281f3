/// Result of a bulk insert. Rows whose natural key already exists are
/// skipped rather than failing the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub attempted: usize,
    pub rows_affected: usize,
}

impl InsertOutcome {
    pub fn skipped(&self) -> usize {
        self.attempted.saturating_sub(self.rows_affected)
    }
}

/// Optional narrowing for record listings.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub model: Option<String>,
    pub route: Option<String>,
    pub limit: u32,
    pub offset: u32,
}
