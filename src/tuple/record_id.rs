use std::fmt;

use crate::page_id::PageId;

/// The stable address of a tuple while it lives in its slot: a page id
/// plus a slot index. Deletion frees the slot and invalidates any record
/// id pointing at it.
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot_index: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot_index: usize) -> Self {
        RecordId {
            page_id,
            slot_index,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/slot{}", self.page_id, self.slot_index)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
