use std::sync::Mutex;

use log::debug;

use crate::error::DbResult;
use crate::page_id::PageId;
use crate::transaction_id::TransactionId;

/// The write-ahead log collaborator consumed at commit. The record format
/// and recovery replay are out of scope for the core; only the two calls
/// the buffer pool makes are specified.
pub trait LogManager: Send + Sync {
    /// Record the before/after image pair for one flushed page.
    fn log_write(
        &self,
        tid: TransactionId,
        page_id: PageId,
        before_image: &[u8],
        after_image: &[u8],
    ) -> DbResult<()>;

    /// Force the log to stable storage. FORCE requires this to return
    /// before the page write it covers is considered durable.
    fn force(&self) -> DbResult<()>;
}

/// An in-memory stand-in log manager: opaque to the core, records nothing
/// durable, but preserves call ordering for tests that assert WAL-before-
/// data-page behavior.
pub struct NaiveLogManager {
    records: Mutex<Vec<(TransactionId, PageId)>>,
}

impl NaiveLogManager {
    pub fn new() -> Self {
        NaiveLogManager {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for NaiveLogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LogManager for NaiveLogManager {
    fn log_write(
        &self,
        tid: TransactionId,
        page_id: PageId,
        _before_image: &[u8],
        _after_image: &[u8],
    ) -> DbResult<()> {
        debug!("log_write: {:?} dirtied {:?}", tid, page_id);
        self.records.lock().unwrap().push((tid, page_id));
        Ok(())
    }

    fn force(&self) -> DbResult<()> {
        Ok(())
    }
}
