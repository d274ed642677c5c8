use std::sync::Arc;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::error::DbResult;
use crate::heap_file_iter::HeapFileIterator;
use crate::operator::OpIterator;
use crate::transaction_id::TransactionId;
use crate::tuple::{Tuple, TupleSchema};

/// Streams every tuple of one table, prefixing each field name with a
/// table alias so a downstream join or projection can resolve
/// `alias.column` unambiguously.
pub struct SequentialScan {
    tid: TransactionId,
    buffer_pool: Arc<BufferPool>,
    table_id: u32,
    schema: TupleSchema,
    iter: Option<HeapFileIterator>,
}

impl SequentialScan {
    /// `table_alias` defaults to the catalog's registered table name when
    /// `None`, matching the convention for an unaliased `FROM` clause.
    pub fn new(
        tid: TransactionId,
        buffer_pool: Arc<BufferPool>,
        table_id: u32,
        table_alias: Option<&str>,
    ) -> DbResult<Self> {
        let catalog = buffer_pool.catalog();
        let base_schema = catalog.get_tuple_desc(table_id)?;
        let alias = match table_alias {
            Some(a) => a.to_string(),
            None => catalog.get_table_name(table_id)?,
        };
        let schema = base_schema.with_alias(&alias);
        Ok(SequentialScan {
            tid,
            buffer_pool,
            table_id,
            schema,
            iter: None,
        })
    }
}

impl OpIterator for SequentialScan {
    fn open(&mut self) -> DbResult<()> {
        let heap_file = self.buffer_pool.catalog().get_database_file(self.table_id)?;
        let mut iter = HeapFileIterator::new(heap_file, Arc::clone(&self.buffer_pool), self.tid);
        iter.rewind()?;
        self.iter = Some(iter);
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Tuple>> {
        match &mut self.iter {
            Some(iter) => iter.next(),
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.open()
    }

    fn close(&mut self) {
        self.iter = None;
    }

    fn schema(&self) -> &TupleSchema {
        &self.schema
    }
}
