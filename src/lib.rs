//! A small transactional storage and execution core: a page-oriented
//! buffer pool enforcing NO-STEAL/FORCE, strict two-phase locking with
//! wait-for-graph deadlock detection, slotted heap files, and a handful of
//! streaming query operators (sequential scan, filter, aggregate, insert).
//!
//! SQL parsing, query planning, and network serving are out of scope;
//! `Catalog` and `LogManager` are the traits a caller implements to supply
//! a schema directory and a write-ahead log respectively.

pub mod buffer_pool;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod heap_file;
pub mod heap_file_iter;
pub mod lock_manager;
pub mod log_manager;
pub mod operator;
pub mod page;
pub mod page_id;
pub mod permissions;
pub mod predicate;
pub mod transaction;
pub mod transaction_id;
pub mod tuple;
pub mod util;
mod wait_for_graph;

pub use buffer_pool::BufferPool;
pub use catalog::{Catalog, InMemoryCatalog};
pub use config::Config;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use heap_file::HeapFile;
pub use lock_manager::{LockKind, LockManager};
pub use log_manager::{LogManager, NaiveLogManager};
pub use page::Page;
pub use page_id::PageId;
pub use permissions::Permission;
pub use predicate::{Op, Predicate};
pub use transaction::Transaction;
pub use transaction_id::TransactionId;
pub use util::init_log;
