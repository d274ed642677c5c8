use std::sync::Arc;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::log_manager::LogManager;

/// A convenience bundle of the three collaborators a call site otherwise
/// has to thread through by hand: catalog, log manager, and the buffer
/// pool built from them. Operators and tests that don't want to carry
/// three separate `Arc`s can hold one `Database` instead.
///
/// This is never a process-wide singleton — construct as many as you
/// need, typically one per embedded instance under test.
#[derive(Clone)]
pub struct Database {
    buffer_pool: Arc<BufferPool>,
    catalog: Arc<dyn Catalog>,
}

impl Database {
    pub fn new(config: Config, catalog: Arc<dyn Catalog>, log_manager: Arc<dyn LogManager>) -> Self {
        let buffer_pool = Arc::new(BufferPool::new(config, Arc::clone(&catalog), log_manager));
        Database { buffer_pool, catalog }
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }
}
