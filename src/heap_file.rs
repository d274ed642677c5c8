use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::buffer_pool::BufferPool;
use crate::error::{DbError, DbResult};
use crate::page::Page;
use crate::page_id::PageId;
use crate::permissions::Permission;
use crate::transaction_id::TransactionId;
use crate::tuple::{RecordId, Tuple, TupleSchema};

/// A flat file backing one table: a sequence of fixed-size pages, never
/// shuffled. Holes (fully empty pages) are permitted and reused by
/// `insert_tuple`'s linear scan rather than a persisted freelist.
pub struct HeapFile {
    table_id: u32,
    path: PathBuf,
    file: Mutex<File>,
    schema: Arc<TupleSchema>,
    page_size: usize,
}

impl HeapFile {
    pub fn new<P: AsRef<Path>>(
        path: P,
        table_id: u32,
        schema: Arc<TupleSchema>,
        page_size: usize,
    ) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        Ok(HeapFile {
            table_id,
            path,
            file: Mutex::new(file),
            schema,
            page_size,
        })
    }

    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    pub fn schema(&self) -> &Arc<TupleSchema> {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length divided by page size. The file is always page-size
    /// aligned by construction; any other length is an I/O error, not a
    /// rounding decision.
    pub fn num_pages(&self) -> DbResult<usize> {
        let file = self.file.lock().unwrap();
        let len = file.metadata()?.len() as usize;
        if len % self.page_size != 0 {
            return Err(DbError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "heap file {:?} has length {} not aligned to page size {}",
                    self.path, len, self.page_size
                ),
            )));
        }
        Ok(len / self.page_size)
    }

    /// Seek to `page_index * page_size`, read `page_size` bytes, and parse
    /// a `Page`. Fails if the offset is past end-of-file.
    pub fn read_page(&self, page_index: usize) -> DbResult<Page> {
        let page_id = PageId::new(self.table_id, page_index);
        let offset = (page_index as u64) * (self.page_size as u64);
        let mut file = self.file.lock().unwrap();
        let len = file.metadata()?.len();
        if offset >= len {
            return Err(DbError::InvalidArgument(format!(
                "page {} is past end of file (len {})",
                page_id, len
            )));
        }
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; self.page_size];
        file.read_exact(&mut buf)?;
        Page::new(page_id, Arc::clone(&self.schema), self.page_size, &buf)
    }

    /// Seek to the page's offset and overwrite it in place.
    pub fn write_page(&self, page: &Page) -> DbResult<()> {
        let offset = (page.page_id().page_index as u64) * (self.page_size as u64);
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&page.get_page_data())?;
        file.flush()?;
        Ok(())
    }

    /// Append a freshly constructed empty page at `num_pages * page_size`.
    fn append_empty_page(&self) -> DbResult<PageId> {
        let index = self.num_pages()?;
        let page_id = PageId::new(self.table_id, index);
        let empty = Page::empty(page_id, Arc::clone(&self.schema), self.page_size);
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::End(0))?;
        file.write_all(&empty.get_page_data())?;
        file.flush()?;
        debug!("appended empty page {} to {:?}", page_id, self.path);
        Ok(page_id)
    }

    /// Scan pages in order under exclusive permission; insert into the
    /// first with a free slot. If none fit, append a fresh page and insert
    /// there. The appended page is registered with the buffer pool (via
    /// `get_page`) before this call returns, so it is visible to the
    /// transaction's subsequent commit.
    pub fn insert_tuple(
        &self,
        tid: TransactionId,
        buffer_pool: &BufferPool,
        tuple: Tuple,
    ) -> DbResult<RecordId> {
        let num_pages = self.num_pages()?;
        for index in 0..num_pages {
            let page_id = PageId::new(self.table_id, index);
            let page_lock = buffer_pool.get_page(tid, page_id, Permission::ReadWrite)?;
            let mut page = page_lock.lock().unwrap();
            if page.num_empty_slots() > 0 {
                let record_id = page.insert_tuple(tuple)?;
                page.mark_dirty(Some(tid));
                return Ok(record_id);
            }
        }

        let new_page_id = self.append_empty_page()?;
        let page_lock = buffer_pool.get_page(tid, new_page_id, Permission::ReadWrite)?;
        let mut page = page_lock.lock().unwrap();
        let record_id = page.insert_tuple(tuple)?;
        page.mark_dirty(Some(tid));
        Ok(record_id)
    }

    /// Fetch the page named by the record id's page id under exclusive
    /// permission and clear the slot.
    pub fn delete_tuple(
        &self,
        tid: TransactionId,
        buffer_pool: &BufferPool,
        record_id: RecordId,
    ) -> DbResult<()> {
        let page_lock = buffer_pool.get_page(tid, record_id.page_id, Permission::ReadWrite)?;
        let mut page = page_lock.lock().unwrap();
        page.delete_tuple(record_id)?;
        page.mark_dirty(Some(tid));
        Ok(())
    }
}
