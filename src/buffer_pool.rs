use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{DbError, DbResult};
use crate::lock_manager::LockManager;
use crate::log_manager::LogManager;
use crate::page::Page;
use crate::page_id::PageId;
use crate::permissions::Permission;
use crate::transaction_id::TransactionId;
use crate::tuple::{RecordId, Tuple};

struct PoolState {
    pages: HashMap<PageId, Arc<Mutex<Page>>>,
    /// Insertion order, used only to make eviction's "pick any clean page"
    /// choice deterministic for tests.
    order: VecDeque<PageId>,
}

impl PoolState {
    fn insert(&mut self, pid: PageId, page: Arc<Mutex<Page>>) {
        self.pages.insert(pid, page);
        self.order.push_back(pid);
    }

    /// Evict the first clean page in insertion order. Returns its id, or
    /// `None` if every cached page is dirty.
    fn evict_one_clean(&mut self) -> Option<PageId> {
        let position = self.order.iter().position(|pid| {
            self.pages
                .get(pid)
                .map(|p| p.lock().unwrap().is_dirty().is_none())
                .unwrap_or(true)
        })?;
        let pid = self.order.remove(position).unwrap();
        self.pages.remove(&pid);
        Some(pid)
    }

    fn remove(&mut self, pid: &PageId) {
        if self.pages.remove(pid).is_some() {
            self.order.retain(|p| p != pid);
        }
    }
}

/// Bounded in-memory page cache, the hub every operator and heap file
/// reads and writes through.
///
/// Owns the lock manager. Enforces NO-STEAL (no page is ever written to
/// disk while dirtied by a transaction that hasn't committed) and FORCE
/// (every dirty page of a committing transaction is flushed before commit
/// returns). Abort reverts dirtied pages to their before-image in memory;
/// no bytes of an aborted transaction ever reach disk.
pub struct BufferPool {
    config: Config,
    catalog: Arc<dyn Catalog>,
    log_manager: Arc<dyn LogManager>,
    lock_manager: LockManager,
    pool: Mutex<PoolState>,
}

impl BufferPool {
    pub fn new(config: Config, catalog: Arc<dyn Catalog>, log_manager: Arc<dyn LogManager>) -> Self {
        BufferPool {
            lock_manager: LockManager::new(config.deadlock_wait_timeout),
            config,
            catalog,
            log_manager,
            pool: Mutex::new(PoolState {
                pages: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    /// Fetch a page, acquiring a shared lock for `ReadOnly` or an
    /// exclusive lock for `ReadWrite` before touching the cache. A cache
    /// hit still requires the lock: two transactions may race to read the
    /// same cached page under different declared permissions.
    pub fn get_page(
        &self,
        tid: TransactionId,
        pid: PageId,
        permission: Permission,
    ) -> DbResult<Arc<Mutex<Page>>> {
        if permission.is_read_write() {
            self.lock_manager.acquire_exclusive(tid, pid)?;
        } else {
            self.lock_manager.acquire_shared(tid, pid)?;
        }

        let mut state = self.pool.lock().unwrap();
        if let Some(page) = state.pages.get(&pid) {
            return Ok(Arc::clone(page));
        }

        if state.pages.len() >= self.config.buffer_pool_capacity {
            if state.evict_one_clean().is_none() {
                drop(state);
                self.lock_manager.release(tid, pid);
                return Err(DbError::DbException(
                    "buffer pool is full and every cached page is dirty".to_string(),
                ));
            }
        }

        let heap_file = match self.catalog.get_database_file(pid.table_id) {
            Ok(f) => f,
            Err(e) => {
                drop(state);
                self.lock_manager.release(tid, pid);
                return Err(e);
            }
        };
        let page = match heap_file.read_page(pid.page_index) {
            Ok(p) => p,
            Err(e) => {
                drop(state);
                self.lock_manager.release(tid, pid);
                return Err(e);
            }
        };

        let page = Arc::new(Mutex::new(page));
        state.insert(pid, Arc::clone(&page));
        Ok(page)
    }

    /// Insert a tuple into `table_id`, delegating to its heap file, which
    /// itself calls back through `get_page` with exclusive permission.
    pub fn insert_tuple(&self, tid: TransactionId, table_id: u32, tuple: Tuple) -> DbResult<RecordId> {
        let heap_file = self.catalog.get_database_file(table_id)?;
        heap_file.insert_tuple(tid, self, tuple)
    }

    pub fn delete_tuple(&self, tid: TransactionId, record_id: RecordId) -> DbResult<()> {
        let heap_file = self.catalog.get_database_file(record_id.page_id.table_id)?;
        heap_file.delete_tuple(tid, self, record_id)
    }

    /// Flush one page: write its WAL record and force it, then write the
    /// page itself, then roll its before-image forward and clear the
    /// dirtier. A no-op if the page isn't currently dirty.
    fn flush_page(&self, page: &Arc<Mutex<Page>>) -> DbResult<()> {
        let mut page = page.lock().unwrap();
        let tid = match page.is_dirty() {
            Some(tid) => tid,
            None => return Ok(()),
        };
        let pid = page.page_id();
        let heap_file = self.catalog.get_database_file(pid.table_id)?;

        let before_image = page.before_image().to_vec();
        let after_image = page.get_page_data();
        self.log_manager.log_write(tid, pid, &before_image, &after_image)?;
        self.log_manager.force()?;

        heap_file.write_page(&page)?;
        page.set_before_image();
        page.mark_dirty(None);
        Ok(())
    }

    /// Commit flushes and logs every page `tid` dirtied, then releases its
    /// locks; abort reverts those pages to their before-image in memory,
    /// then releases its locks. Either way, `tid`'s locks are held until
    /// this call, honoring strict two-phase locking.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> DbResult<()> {
        let state = self.pool.lock().unwrap();
        let dirtied: Vec<Arc<Mutex<Page>>> = state
            .pages
            .values()
            .filter(|p| p.lock().unwrap().is_dirty() == Some(tid))
            .cloned()
            .collect();
        drop(state);

        if commit {
            for page in &dirtied {
                self.flush_page(page)?;
            }
            debug!("{:?} committed, flushed {} page(s)", tid, dirtied.len());
        } else {
            for page in &dirtied {
                page.lock().unwrap().revert_to_before_image()?;
            }
            debug!("{:?} aborted, reverted {} page(s)", tid, dirtied.len());
        }

        self.lock_manager.release_all(tid);
        Ok(())
    }

    /// Write every dirty page to disk regardless of owning transaction.
    /// Unsafe to call during normal NO-STEAL execution (it can persist an
    /// uncommitted transaction's writes); intended for shutdown and tests.
    pub fn flush_all_pages(&self) -> DbResult<()> {
        let state = self.pool.lock().unwrap();
        let pages: Vec<Arc<Mutex<Page>>> = state.pages.values().cloned().collect();
        drop(state);
        for page in &pages {
            self.flush_page(page)?;
        }
        Ok(())
    }

    /// Drop a page from cache without flushing. Used by recovery when
    /// replaying a known-clean state.
    pub fn discard_page(&self, pid: PageId) {
        self.pool.lock().unwrap().remove(&pid);
    }

    pub fn contains(&self, pid: PageId) -> bool {
        self.pool.lock().unwrap().pages.contains_key(&pid)
    }

    pub fn cached_page_count(&self) -> usize {
        self.pool.lock().unwrap().pages.len()
    }

    /// Drop every cached page without flushing. Test-only, for resetting
    /// pool state between cases within a single test.
    #[cfg(test)]
    pub fn clear(&self) {
        let mut state = self.pool.lock().unwrap();
        state.pages.clear();
        state.order.clear();
    }
}
