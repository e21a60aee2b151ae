/// One page of results plus the total row count for the same filter.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub values: Vec<T>,
    pub total: u64,
}

/// Per-owner record counts; `total` includes records that are not yet
/// terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u64,
    pub authentic: u64,
    pub suspicious: u64,
    pub forged: u64,
}
