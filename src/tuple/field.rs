use std::cmp::Ordering;
use std::fmt;

use crate::error::{DbError, DbResult};

/// The type of a field, carrying the bounded capacity for strings so a
/// schema can compute a fixed tuple width.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FieldType {
    Int,
    /// Fixed on-disk capacity in bytes, independent of the actual string
    /// length at any given moment.
    Str(usize),
}

impl FieldType {
    /// On-disk width of a field of this type: 4 bytes for an integer,
    /// `4 + capacity` for a string (a 32-bit length prefix followed by the
    /// fixed-capacity, zero-padded bytes).
    pub fn byte_len(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Str(capacity) => 4 + capacity,
        }
    }
}

/// A typed field value: either an integer or a bounded string.
#[derive(Clone, Debug)]
pub enum Field {
    Int(i32),
    Str(String),
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Int(_) => FieldType::Int,
            // the capacity is schema-level metadata, not carried by the
            // value itself; callers compare against the schema's declared
            // type when validating.
            Field::Str(_) => FieldType::Str(0),
        }
    }

    pub fn as_int(&self) -> DbResult<i32> {
        match self {
            Field::Int(v) => Ok(*v),
            Field::Str(_) => Err(DbError::InvalidArgument(
                "expected an int field, found a string field".to_string(),
            )),
        }
    }

    pub(crate) fn encode(&self, capacity: usize, out: &mut Vec<u8>) -> DbResult<()> {
        match self {
            Field::Int(v) => {
                out.extend_from_slice(&v.to_be_bytes());
            }
            Field::Str(s) => {
                let bytes = s.as_bytes();
                if bytes.len() > capacity {
                    return Err(DbError::InvalidArgument(format!(
                        "string field {:?} exceeds capacity {}",
                        s, capacity
                    )));
                }
                out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                out.extend_from_slice(bytes);
                out.extend(std::iter::repeat(0u8).take(capacity - bytes.len()));
            }
        }
        Ok(())
    }

    pub(crate) fn decode(field_type: FieldType, bytes: &[u8]) -> Field {
        match field_type {
            FieldType::Int => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&bytes[0..4]);
                Field::Int(i32::from_be_bytes(buf))
            }
            FieldType::Str(capacity) => {
                let mut len_buf = [0u8; 4];
                len_buf.copy_from_slice(&bytes[0..4]);
                let len = u32::from_be_bytes(len_buf) as usize;
                let len = len.min(capacity);
                let s = String::from_utf8_lossy(&bytes[4..4 + len]).into_owned();
                Field::Str(s)
            }
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => a == b,
            (Field::Str(a), Field::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Field {}

/// Grouping keys need `Hash`; the natural derive is unavailable because
/// `Str`'s capacity isn't carried by the value, so hash on the same
/// projection `PartialEq` compares.
impl std::hash::Hash for Field {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Field::Int(v) => v.hash(state),
            Field::Str(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => a.partial_cmp(b),
            (Field::Str(a), Field::Str(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Str(s) => write!(f, "{}", s),
        }
    }
}
