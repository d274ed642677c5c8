use std::fmt;

use crate::error::DbResult;

use super::field::Field;
use super::record_id::RecordId;
use super::schema::TupleSchema;

/// A fixed-schema record: a sequence of typed field values plus, once the
/// tuple is resident in a page, the record id addressing its slot.
#[derive(Clone)]
pub struct Tuple {
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Tuple {
            fields,
            record_id: None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get_field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: RecordId) {
        self.record_id = Some(record_id);
    }

    pub(crate) fn encode(&self, schema: &TupleSchema) -> DbResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(schema.tuple_byte_len());
        for (field, item) in self.fields.iter().zip(schema.fields().iter()) {
            let capacity = match item.field_type {
                crate::tuple::field::FieldType::Str(capacity) => capacity,
                crate::tuple::field::FieldType::Int => 0,
            };
            field.encode(capacity, &mut bytes)?;
        }
        Ok(bytes)
    }

    pub(crate) fn decode(schema: &TupleSchema, bytes: &[u8]) -> Self {
        let mut fields = Vec::with_capacity(schema.num_fields());
        let mut offset = 0;
        for item in schema.fields() {
            let len = item.field_type.byte_len();
            fields.push(Field::decode(item.field_type, &bytes[offset..offset + len]));
            offset += len;
        }
        Tuple::new(fields)
    }

    /// Structural equality over field values only, ignoring the record id
    /// (two freshly constructed and freshly scanned tuples compare equal).
    pub fn equal_values(&self, other: &Tuple) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().zip(other.fields.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|field| field.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
