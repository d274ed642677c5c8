use std::fmt;

use crate::tuple::Field;

/// Comparison operators a `Predicate` can apply. String pattern matching
/// (`LIKE`) is out of scope: no such comparison is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
}

/// `(tuple) -> bool` as data: compares one field of the tuple under test
/// against a fixed operand field using `op`.
#[derive(Clone)]
pub struct Predicate {
    field_index: usize,
    op: Op,
    operand: Field,
}

impl Predicate {
    pub fn new(field_index: usize, op: Op, operand: Field) -> Self {
        Predicate {
            field_index,
            op,
            operand,
        }
    }

    pub fn matches(&self, tuple: &crate::tuple::Tuple) -> bool {
        let field = tuple.get_field(self.field_index);
        match self.op {
            Op::Equals => field == &self.operand,
            Op::NotEquals => field != &self.operand,
            Op::GreaterThan => field > &self.operand,
            Op::GreaterThanOrEq => field >= &self.operand,
            Op::LessThan => field < &self.operand,
            Op::LessThanOrEq => field <= &self.operand,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field[{}] {:?} {}", self.field_index, self.op, self.operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::Tuple;

    fn tuple(v: i32) -> Tuple {
        Tuple::new(vec![Field::Int(v)])
    }

    #[test]
    fn greater_than_matches_strictly_larger_values() {
        let p = Predicate::new(0, Op::GreaterThan, Field::Int(5));
        assert!(p.matches(&tuple(6)));
        assert!(!p.matches(&tuple(5)));
        assert!(!p.matches(&tuple(4)));
    }

    #[test]
    fn equals_matches_only_equal_values() {
        let p = Predicate::new(0, Op::Equals, Field::Int(5));
        assert!(p.matches(&tuple(5)));
        assert!(!p.matches(&tuple(6)));
    }
}
