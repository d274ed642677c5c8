use std::fmt;

use super::field::FieldType;

/// One named, typed column in a `TupleSchema`.
#[derive(Clone, Debug)]
pub struct FieldItem {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldItem {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        FieldItem {
            name: name.to_string(),
            field_type,
        }
    }
}

/// The ordered, fixed set of typed fields every tuple in a table carries.
///
/// Equality compares field types only — names may legitimately differ
/// after a sequential scan prefixes them with a table alias.
#[derive(Clone, Debug, Default)]
pub struct TupleSchema {
    fields: Vec<FieldItem>,
}

impl TupleSchema {
    pub fn new(fields: Vec<FieldItem>) -> Self {
        TupleSchema { fields }
    }

    pub fn fields(&self) -> &[FieldItem] {
        &self.fields
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, i: usize) -> FieldType {
        self.fields[i].field_type
    }

    pub fn field_name(&self, i: usize) -> &str {
        &self.fields[i].name
    }

    /// Width in bytes of one tuple under this schema.
    pub fn tuple_byte_len(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.byte_len()).sum()
    }

    /// Prefix every field name with `alias.`, the way a sequential scan
    /// qualifies columns for downstream name resolution.
    pub fn with_alias(&self, alias: &str) -> TupleSchema {
        let fields = self
            .fields
            .iter()
            .map(|f| FieldItem::new(&format!("{}.{}", alias, f.name), f.field_type))
            .collect();
        TupleSchema::new(fields)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl PartialEq for TupleSchema {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.field_type == b.field_type)
    }
}

impl fmt::Display for TupleSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{}({:?})", field.name, field.field_type))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Build a schema of `count` integer columns named `{prefix}{i}`, for
/// quickly assembling scratch schemas in tests.
pub fn simple_int_schema(count: usize, prefix: &str) -> TupleSchema {
    let fields = (0..count)
        .map(|i| FieldItem::new(&format!("{}{}", prefix, i), FieldType::Int))
        .collect();
    TupleSchema::new(fields)
}
