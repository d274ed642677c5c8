use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A monotonically increasing, process-unique transaction id.
///
/// Equality is by value; the id itself never identifies a thread, only a
/// logical transaction (a single thread drives a `TransactionId` from
/// `start` through `commit`/`abort`).
#[derive(Eq, PartialEq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Allocate the next id in process order.
    pub fn new() -> Self {
        TransactionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Construct a specific id. Used only by tests that need reproducible
    /// ids to assert on wait-for graph edges.
    pub fn from_raw(id: u64) -> Self {
        TransactionId(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx_{}", self.0)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
