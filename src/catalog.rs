use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use itertools::Itertools;

use crate::error::{DbError, DbResult};
use crate::heap_file::HeapFile;
use crate::tuple::TupleSchema;

/// The boundary the core consumes to resolve a table id to its backing
/// heap file, schema, and display name. SQL parsing, planning, and how
/// table ids are minted from DDL are all out of scope; this trait is the
/// entire surface the buffer pool needs.
pub trait Catalog: Send + Sync {
    fn get_database_file(&self, table_id: u32) -> DbResult<Arc<HeapFile>>;
    fn get_tuple_desc(&self, table_id: u32) -> DbResult<Arc<TupleSchema>>;
    fn get_table_name(&self, table_id: u32) -> DbResult<String>;
    fn table_ids(&self) -> Vec<u32>;
}

/// A concrete, in-memory catalog for single-process use and tests. Table
/// ids are assigned explicitly by the caller, never derived from hashing a
/// file path (Design Notes).
pub struct InMemoryCatalog {
    tables: RwLock<HashMap<u32, (Arc<HeapFile>, String)>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        InMemoryCatalog {
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_table(&self, heap_file: Arc<HeapFile>, table_name: String) {
        let table_id = heap_file.table_id();
        self.tables
            .write()
            .unwrap()
            .insert(table_id, (heap_file, table_name));
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog for InMemoryCatalog {
    fn get_database_file(&self, table_id: u32) -> DbResult<Arc<HeapFile>> {
        self.tables
            .read()
            .unwrap()
            .get(&table_id)
            .map(|(f, _)| Arc::clone(f))
            .ok_or_else(|| DbError::DbException(format!("no such table: {}", table_id)))
    }

    fn get_tuple_desc(&self, table_id: u32) -> DbResult<Arc<TupleSchema>> {
        self.tables
            .read()
            .unwrap()
            .get(&table_id)
            .map(|(f, _)| Arc::clone(f.schema()))
            .ok_or_else(|| DbError::DbException(format!("no such table: {}", table_id)))
    }

    fn get_table_name(&self, table_id: u32) -> DbResult<String> {
        self.tables
            .read()
            .unwrap()
            .get(&table_id)
            .map(|(_, name)| name.clone())
            .ok_or_else(|| DbError::DbException(format!("no such table: {}", table_id)))
    }

    fn table_ids(&self) -> Vec<u32> {
        self.tables.read().unwrap().keys().copied().sorted().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::schema::simple_int_schema;

    #[test]
    fn unknown_table_is_a_db_exception() {
        let catalog = InMemoryCatalog::new();
        let err = catalog.get_table_name(7).unwrap_err();
        assert!(matches!(err, DbError::DbException(_)));
    }

    #[test]
    fn registered_table_round_trips_name_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(simple_int_schema(1, "c"));
        let heap_file =
            Arc::new(HeapFile::new(dir.path().join("t.db"), 3, Arc::clone(&schema), 4096).unwrap());
        let catalog = InMemoryCatalog::new();
        catalog.add_table(heap_file, "widgets".to_string());

        assert_eq!(catalog.get_table_name(3).unwrap(), "widgets");
        assert_eq!(*catalog.get_tuple_desc(3).unwrap(), *schema);
        assert_eq!(catalog.table_ids(), vec![3]);
    }
}
