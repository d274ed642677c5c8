use std::fmt;
use std::io;

/// The error hierarchy raised by the storage and execution core.
///
/// Nothing inside the core retries on any of these; the transaction
/// coordinator is the sole authority for deciding whether to commit or
/// abort after one is raised.
#[derive(Debug)]
pub enum DbError {
    /// A lock request was aborted after deadlock detection found a cycle
    /// through the wait-for graph, or (as a liveness backstop only) timed
    /// out waiting for the lock.
    TransactionAborted,
    /// All-dirty eviction failure, schema mismatches on insert, a missing
    /// page on flush, and other conditions that are not I/O failures and
    /// not lock failures.
    DbException(String),
    /// Read/write failures and missing files. Not recoverable within the
    /// core.
    Io(io::Error),
    /// Heap-file reads past end of file, unsupported aggregate operators
    /// over string fields, out-of-range page offsets, and similar
    /// caller errors.
    InvalidArgument(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::TransactionAborted => write!(f, "transaction aborted (deadlock detected)"),
            DbError::DbException(msg) => write!(f, "db exception: {}", msg),
            DbError::Io(e) => write!(f, "io error: {}", e),
            DbError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DbError {
    fn from(e: io::Error) -> Self {
        DbError::Io(e)
    }
}

pub type DbResult<T> = Result<T, DbError>;
