pub mod field;
pub mod record_id;
pub mod schema;
#[allow(clippy::module_inception)]
pub mod tuple;

pub use field::{Field, FieldType};
pub use record_id::RecordId;
pub use schema::{FieldItem, TupleSchema};
pub use tuple::Tuple;
