pub mod aggregate;
pub mod filter;
pub mod insert;
pub mod seq_scan;

use crate::error::DbResult;
use crate::tuple::{Tuple, TupleSchema};

pub use aggregate::{Aggregate, AggregateOp};
pub use filter::Filter;
pub use insert::Insert;
pub use seq_scan::SequentialScan;

/// The uniform shape every operator presents: a single-producer stream of
/// tuples with an explicit lifecycle. None of these implementations are
/// thread-safe — an operator tree belongs to one transaction's thread.
///
/// A separate `has_next` is deliberately not part of this trait: it would
/// either duplicate `next`'s I/O or force buffering one tuple ahead for
/// no benefit, so end-of-stream is just `next` returning `None`.
pub trait OpIterator {
    /// Acquire whatever resources this operator (and its children) need
    /// before the first `next` call — locks via the buffer pool, eager
    /// materialisation for `Aggregate`, and so on.
    fn open(&mut self) -> DbResult<()>;

    /// The next tuple, or `None` at end of stream. `None` is sticky:
    /// calling `next` again after end of stream returns `None` again
    /// rather than panicking or re-running the operator.
    fn next(&mut self) -> DbResult<Option<Tuple>>;

    /// Reset to the beginning of the stream, as if freshly opened.
    fn rewind(&mut self) -> DbResult<()>;

    /// Release any resources acquired by `open`. Idempotent.
    fn close(&mut self);

    fn schema(&self) -> &TupleSchema;
}
