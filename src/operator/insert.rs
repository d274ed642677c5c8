use std::sync::Arc;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::error::{DbError, DbResult};
use crate::operator::OpIterator;
use crate::transaction_id::TransactionId;
use crate::tuple::schema::FieldItem;
use crate::tuple::{Field, FieldType, Tuple, TupleSchema};

/// Consumes every child tuple, inserting each into `table_id` through the
/// buffer pool, and emits exactly one tuple: the count inserted. A second
/// `next` call (or any call after the first) returns `None` rather than
/// re-running the insert.
pub struct Insert {
    child: Box<dyn OpIterator>,
    buffer_pool: Arc<BufferPool>,
    tid: TransactionId,
    table_id: u32,
    schema: TupleSchema,
    done: bool,
}

impl Insert {
    pub fn new(child: Box<dyn OpIterator>, buffer_pool: Arc<BufferPool>, tid: TransactionId, table_id: u32) -> Self {
        Insert {
            child,
            buffer_pool,
            tid,
            table_id,
            schema: TupleSchema::new(vec![FieldItem::new("count", FieldType::Int)]),
            done: false,
        }
    }
}

impl OpIterator for Insert {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        let target_schema = self.buffer_pool.catalog().get_tuple_desc(self.table_id)?;
        if *self.child.schema() != *target_schema {
            return Err(DbError::DbException(format!(
                "insert schema mismatch: child produces {}, table {} expects {}",
                self.child.schema(),
                self.table_id,
                target_schema
            )));
        }
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Tuple>> {
        if self.done {
            return Ok(None);
        }
        let mut count = 0i32;
        while let Some(tuple) = self.child.next()? {
            self.buffer_pool.insert_tuple(self.tid, self.table_id, tuple)?;
            count += 1;
        }
        self.done = true;
        Ok(Some(Tuple::new(vec![Field::Int(count)])))
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.done = false;
        self.child.rewind()
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn schema(&self) -> &TupleSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::Config;
    use crate::heap_file::HeapFile;
    use crate::log_manager::NaiveLogManager;
    use crate::operator::seq_scan::SequentialScan;
    use crate::tuple::schema::simple_int_schema;

    fn two_table_harness() -> (tempfile::TempDir, tempfile::TempDir, Arc<BufferPool>) {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(simple_int_schema(1, "v"));
        let src = Arc::new(HeapFile::new(src_dir.path().join("src.db"), 0, Arc::clone(&schema), 4096).unwrap());
        let dst = Arc::new(HeapFile::new(dst_dir.path().join("dst.db"), 1, schema, 4096).unwrap());

        let catalog = Arc::new(InMemoryCatalog::new());
        // Both tables share column name "v0" so a scan aliased to match
        // the insert target's own naming produces an identical schema.
        catalog.add_table(src, "v".to_string());
        catalog.add_table(dst, "dst".to_string());
        let bp = Arc::new(BufferPool::new(Config::default(), catalog, Arc::new(NaiveLogManager::new())));
        (src_dir, dst_dir, bp)
    }

    #[test]
    fn insert_emits_row_count_and_persists_rows_on_commit() {
        let (_src_dir, _dst_dir, bp) = two_table_harness();

        let seed_tid = TransactionId::new();
        for v in [1, 2, 3] {
            bp.insert_tuple(seed_tid, 0, Tuple::new(vec![Field::Int(v)])).unwrap();
        }
        bp.transaction_complete(seed_tid, true).unwrap();

        let tid = TransactionId::new();
        let scan = SequentialScan::new(tid, Arc::clone(&bp), 0, Some("v")).unwrap();
        let mut insert = Insert::new(Box::new(scan), Arc::clone(&bp), tid, 1);
        insert.open().unwrap();

        let count_row = insert.next().unwrap().unwrap();
        assert_eq!(count_row.get_field(0).as_int().unwrap(), 3);
        assert!(insert.next().unwrap().is_none(), "end of stream must be idempotent");

        bp.transaction_complete(tid, true).unwrap();

        let check_tid = TransactionId::new();
        let mut check = SequentialScan::new(check_tid, Arc::clone(&bp), 1, Some("d")).unwrap();
        check.open().unwrap();
        let mut total = 0;
        while check.next().unwrap().is_some() {
            total += 1;
        }
        assert_eq!(total, 3);
    }

    #[test]
    fn schema_mismatch_is_rejected_before_any_insert() {
        // A two-field source scanning into a one-field target can never
        // match, regardless of naming (schema equality compares types).
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let wide_schema = Arc::new(simple_int_schema(2, "c"));
        let narrow_schema = Arc::new(simple_int_schema(1, "v"));
        let wide = Arc::new(HeapFile::new(src_dir.path().join("wide.db"), 0, wide_schema, 4096).unwrap());
        let narrow = Arc::new(HeapFile::new(dst_dir.path().join("narrow.db"), 1, narrow_schema, 4096).unwrap());

        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_table(wide, "wide".to_string());
        catalog.add_table(narrow, "narrow".to_string());
        let bp = Arc::new(BufferPool::new(Config::default(), catalog, Arc::new(NaiveLogManager::new())));

        let tid = TransactionId::new();
        let scan = SequentialScan::new(tid, Arc::clone(&bp), 0, Some("wide")).unwrap();
        let mut insert = Insert::new(Box::new(scan), Arc::clone(&bp), tid, 1);
        let err = insert.open().unwrap_err();
        assert!(matches!(err, DbError::DbException(_)));
    }
}
