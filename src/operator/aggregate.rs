use std::collections::HashMap;

use crate::error::{DbError, DbResult};
use crate::operator::OpIterator;
use crate::tuple::schema::{FieldItem, TupleSchema};
use crate::tuple::{Field, FieldType, Tuple};

/// Grouped aggregate operators over integer fields. `Count` is the only
/// one also defined over strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Count,
    Avg,
}

struct Accumulator {
    count: i64,
    sum: i64,
    min: i64,
    max: i64,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator {
            count: 0,
            sum: 0,
            min: i64::MAX,
            max: i64::MIN,
        }
    }

    fn add(&mut self, value: i64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, op: AggregateOp) -> i32 {
        match op {
            AggregateOp::Min => self.min as i32,
            AggregateOp::Max => self.max as i32,
            AggregateOp::Sum => self.sum as i32,
            AggregateOp::Count => self.count as i32,
            AggregateOp::Avg => (self.sum / self.count.max(1)) as i32,
        }
    }
}

/// Consumes every child tuple at `open`, grouping by `group_field` (or a
/// single implicit group when `None`) and folding `agg_field` through
/// `op`. Materialises the whole grouped result eagerly: bounded memory
/// proportional to the group count, not the input size, which a
/// streaming design over unsorted input can't offer without a sort
/// operator.
pub struct Aggregate {
    child: Box<dyn OpIterator>,
    group_field: Option<usize>,
    agg_field: usize,
    op: AggregateOp,
    schema: TupleSchema,
    results: Option<Vec<Tuple>>,
    cursor: usize,
}

impl Aggregate {
    pub fn new(child: Box<dyn OpIterator>, group_field: Option<usize>, agg_field: usize, op: AggregateOp) -> Self {
        let schema = Self::build_schema(group_field, &child);
        Aggregate {
            child,
            group_field,
            agg_field,
            op,
            schema,
            results: None,
            cursor: 0,
        }
    }

    fn build_schema(group_field: Option<usize>, child: &dyn OpIterator) -> TupleSchema {
        let mut fields = Vec::new();
        if let Some(gf) = group_field {
            let name = child.schema().field_name(gf).to_string();
            let ty = child.schema().field_type(gf);
            fields.push(FieldItem::new(&name, ty));
        }
        fields.push(FieldItem::new("aggregate_value", FieldType::Int));
        TupleSchema::new(fields)
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;

        if self.op != AggregateOp::Count {
            let field_type = self.child.schema().field_type(self.agg_field);
            if field_type != FieldType::Int {
                return Err(DbError::InvalidArgument(format!(
                    "aggregate op {:?} is only defined over integer fields",
                    self.op
                )));
            }
        }

        let mut groups: HashMap<Option<Field>, Accumulator> = HashMap::new();
        let mut order: Vec<Option<Field>> = Vec::new();
        while let Some(tuple) = self.child.next()? {
            let key = self.group_field.map(|gf| tuple.get_field(gf).clone());
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            let value = match tuple.get_field(self.agg_field) {
                Field::Int(v) => *v as i64,
                Field::Str(_) => 0,
            };
            groups.entry(key).or_insert_with(Accumulator::new).add(value);
        }

        let op = self.op;
        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let acc = &groups[&key];
            let value = acc.finish(op);
            let mut fields = Vec::new();
            if let Some(k) = &key {
                fields.push(k.clone());
            }
            fields.push(Field::Int(value));
            rows.push(Tuple::new(fields));
        }

        self.results = Some(rows);
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Tuple>> {
        match &self.results {
            Some(rows) if self.cursor < rows.len() => {
                let row = rows[self.cursor].clone();
                self.cursor += 1;
                Ok(Some(row))
            }
            _ => Ok(None),
        }
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.results = None;
    }

    fn schema(&self) -> &TupleSchema {
        &self.schema
    }
}
