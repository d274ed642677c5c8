use std::sync::Arc;

use log::debug;

use crate::buffer_pool::BufferPool;
use crate::error::DbResult;
use crate::transaction_id::TransactionId;

/// A transaction's lifecycle handle. The buffer pool does all the actual
/// work (tracking dirtied pages, flushing or reverting them); this type
/// only sequences the calls so a caller can't commit or abort twice, and
/// can't use an id that was never started.
///
/// A `Transaction` is driven by a single thread from `start` through
/// `commit`/`abort`; nothing about `TransactionId` itself is thread-affine,
/// but this handle is not `Sync` in spirit even though it's not enforced
/// at the type level — callers are expected to keep one transaction on
/// one thread.
pub struct Transaction {
    tid: TransactionId,
    buffer_pool: Arc<BufferPool>,
    finished: bool,
}

impl Transaction {
    /// Allocate a new transaction id. Pages aren't locked until the first
    /// `get_page` call the transaction makes.
    pub fn start(buffer_pool: Arc<BufferPool>) -> Self {
        let tid = TransactionId::new();
        debug!("{:?} started", tid);
        Transaction {
            tid,
            buffer_pool,
            finished: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.tid
    }

    /// Flush and log every page this transaction dirtied, then release
    /// all its locks.
    pub fn commit(mut self) -> DbResult<()> {
        // Mark finished before the fallible call: once transaction_complete
        // has been invoked at all, Drop must never also invoke it. On a
        // partial-flush failure it leaves the still-dirty page marked dirty
        // and the locks held (spec §7); an unsolicited Drop-triggered abort
        // would silently revert and release behind the caller's back.
        self.finished = true;
        self.buffer_pool.transaction_complete(self.tid, true)
    }

    /// Revert every page this transaction dirtied to its before-image,
    /// then release all its locks. No bytes of this transaction reach
    /// disk.
    pub fn abort(mut self) -> DbResult<()> {
        self.finished = true;
        self.buffer_pool.transaction_complete(self.tid, false)
    }
}

impl Drop for Transaction {
    /// A transaction dropped without an explicit commit/abort is treated
    /// as an abort: leaking its locks would eventually deadlock every
    /// other transaction waiting on the pages it touched.
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.buffer_pool.transaction_complete(self.tid, false) {
                debug!("{:?} implicit abort on drop failed: {}", self.tid, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::Config;
    use crate::heap_file::HeapFile;
    use crate::log_manager::NaiveLogManager;
    use crate::page_id::PageId;
    use crate::permissions::Permission;
    use crate::tuple::field::Field;
    use crate::tuple::schema::simple_int_schema;
    use crate::tuple::Tuple;

    fn harness() -> (tempfile::TempDir, Arc<BufferPool>) {
        let dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(simple_int_schema(2, "c"));
        let heap_file = Arc::new(HeapFile::new(dir.path().join("t.db"), 0, schema, 4096).unwrap());
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_table(heap_file, "t".to_string());
        let bp = Arc::new(BufferPool::new(Config::default(), catalog, Arc::new(NaiveLogManager::new())));
        (dir, bp)
    }

    #[test]
    fn commit_persists_inserted_rows() {
        let (_dir, bp) = harness();
        let txn = Transaction::start(Arc::clone(&bp));
        bp.insert_tuple(txn.id(), 0, Tuple::new(vec![Field::Int(1), Field::Int(2)]))
            .unwrap();
        txn.commit().unwrap();

        bp.discard_page(PageId::new(0, 0));
        let other = Transaction::start(Arc::clone(&bp));
        let page = bp.get_page(other.id(), PageId::new(0, 0), Permission::ReadOnly).unwrap();
        assert_eq!(page.lock().unwrap().iter_tuples().count(), 1);
    }

    #[test]
    fn dropping_without_commit_aborts() {
        let (_dir, bp) = harness();
        {
            let txn = Transaction::start(Arc::clone(&bp));
            bp.insert_tuple(txn.id(), 0, Tuple::new(vec![Field::Int(1), Field::Int(2)]))
                .unwrap();
            // txn dropped here without commit/abort
        }

        let other = Transaction::start(Arc::clone(&bp));
        let page = bp.get_page(other.id(), PageId::new(0, 0), Permission::ReadOnly).unwrap();
        assert_eq!(page.lock().unwrap().iter_tuples().count(), 0);
    }
}
