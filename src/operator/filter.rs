use crate::error::DbResult;
use crate::operator::OpIterator;
use crate::predicate::Predicate;
use crate::tuple::{Tuple, TupleSchema};

/// Forwards only the child's tuples for which `predicate` holds, with the
/// child's schema unchanged.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn OpIterator>,
}

impl Filter {
    pub fn new(predicate: Predicate, child: Box<dyn OpIterator>) -> Self {
        Filter { predicate, child }
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()
    }

    fn next(&mut self) -> DbResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.predicate.matches(&tuple) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()
    }

    fn close(&mut self) {
        self.child.close()
    }

    fn schema(&self) -> &TupleSchema {
        self.child.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_pool::BufferPool;
    use crate::catalog::InMemoryCatalog;
    use crate::config::Config;
    use crate::heap_file::HeapFile;
    use crate::log_manager::NaiveLogManager;
    use crate::operator::seq_scan::SequentialScan;
    use crate::predicate::Op;
    use crate::transaction_id::TransactionId;
    use crate::tuple::field::Field;
    use crate::tuple::schema::simple_int_schema;
    use std::sync::Arc;

    #[test]
    fn filter_forwards_only_matching_tuples() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(simple_int_schema(1, "v"));
        let heap_file = Arc::new(HeapFile::new(dir.path().join("t.db"), 0, schema, 4096).unwrap());
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_table(heap_file, "t".to_string());
        let bp = Arc::new(BufferPool::new(Config::default(), catalog, Arc::new(NaiveLogManager::new())));

        let tid = TransactionId::new();
        for v in [1, 5, 9, 2] {
            bp.insert_tuple(tid, 0, Tuple::new(vec![Field::Int(v)])).unwrap();
        }
        bp.transaction_complete(tid, true).unwrap();

        let tid2 = TransactionId::new();
        let scan = SequentialScan::new(tid2, Arc::clone(&bp), 0, Some("t")).unwrap();
        let predicate = Predicate::new(0, Op::GreaterThan, Field::Int(3));
        let mut filter = Filter::new(predicate, Box::new(scan));
        filter.open().unwrap();

        let mut seen = Vec::new();
        while let Some(tuple) = filter.next().unwrap() {
            seen.push(tuple.get_field(0).as_int().unwrap());
        }
        assert_eq!(seen, vec![5, 9]);
    }
}
