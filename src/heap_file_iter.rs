use std::sync::Arc;

use crate::buffer_pool::BufferPool;
use crate::error::DbResult;
use crate::heap_file::HeapFile;
use crate::page_id::PageId;
use crate::permissions::Permission;
use crate::transaction_id::TransactionId;
use crate::tuple::Tuple;

/// A restartable iterator over every tuple in a heap file, in page then
/// slot order. Every step re-fetches its page through the buffer pool
/// under read permission, so a long-lived scan always sees the pages as
/// the lock manager currently admits them rather than a private snapshot.
pub struct HeapFileIterator {
    heap_file: Arc<HeapFile>,
    buffer_pool: Arc<BufferPool>,
    tid: TransactionId,
    page_index: usize,
    slot_cursor: usize,
    buffered: Vec<Tuple>,
    exhausted: bool,
}

impl HeapFileIterator {
    pub fn new(heap_file: Arc<HeapFile>, buffer_pool: Arc<BufferPool>, tid: TransactionId) -> Self {
        HeapFileIterator {
            heap_file,
            buffer_pool,
            tid,
            page_index: 0,
            slot_cursor: 0,
            buffered: Vec::new(),
            exhausted: true,
        }
    }

    /// Reset to the first page. Re-running this scan will re-acquire
    /// shared locks on every page it touches.
    pub fn rewind(&mut self) -> DbResult<()> {
        self.page_index = 0;
        self.slot_cursor = 0;
        self.buffered.clear();
        self.exhausted = false;
        self.load_page(0)
    }

    fn load_page(&mut self, index: usize) -> DbResult<()> {
        let num_pages = self.heap_file.num_pages()?;
        if index >= num_pages {
            self.buffered.clear();
            self.exhausted = true;
            return Ok(());
        }
        let pid = PageId::new(self.heap_file.table_id(), index);
        let page = self
            .buffer_pool
            .get_page(self.tid, pid, Permission::ReadOnly)?;
        let page = page.lock().unwrap();
        self.buffered = page.iter_tuples().cloned().collect();
        self.page_index = index;
        self.slot_cursor = 0;
        Ok(())
    }

    /// Next tuple, or `None` at end of file. A page with no live tuples is
    /// skipped transparently.
    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            if self.slot_cursor < self.buffered.len() {
                let tuple = self.buffered[self.slot_cursor].clone();
                self.slot_cursor += 1;
                return Ok(Some(tuple));
            }
            self.load_page(self.page_index + 1)?;
            if self.exhausted {
                return Ok(None);
            }
        }
    }
}
