use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::{DbError, DbResult};
use crate::page_id::PageId;
use crate::transaction_id::TransactionId;
use crate::tuple::{RecordId, Tuple, TupleSchema};

/// A slotted page: a header bitmap of occupied slots followed by the slot
/// array of packed tuples, plus the bookkeeping the buffer pool needs for
/// NO-STEAL/FORCE (the dirtying transaction and the before-image
/// snapshot).
pub struct Page {
    page_id: PageId,
    schema: Arc<TupleSchema>,
    page_size: usize,
    slots: Vec<Option<Tuple>>,
    dirtier: Option<TransactionId>,
    before_image: Vec<u8>,
}

impl Page {
    /// Number of slots a page of `page_size` bytes holds under `schema`:
    /// one header bit plus the tuple body per slot.
    pub fn num_slots(schema: &TupleSchema, page_size: usize) -> usize {
        let tuple_bits = schema.tuple_byte_len() * 8;
        (page_size * 8) / (tuple_bits + 1)
    }

    /// Header size in bytes: one bit per slot, rounded up to a byte.
    pub fn header_size(schema: &TupleSchema, page_size: usize) -> usize {
        (Self::num_slots(schema, page_size) + 7) / 8
    }

    /// Parse a raw page-sized byte array into header and slot array.
    pub fn new(
        page_id: PageId,
        schema: Arc<TupleSchema>,
        page_size: usize,
        bytes: &[u8],
    ) -> DbResult<Self> {
        if bytes.len() != page_size {
            return Err(DbError::InvalidArgument(format!(
                "page {} has {} bytes, expected {}",
                page_id,
                bytes.len(),
                page_size
            )));
        }

        let num_slots = Self::num_slots(&schema, page_size);
        let header_size = Self::header_size(&schema, page_size);
        let header = BitVec::from_bytes(&bytes[0..header_size]);

        let tuple_len = schema.tuple_byte_len();
        let mut slots = Vec::with_capacity(num_slots);
        let mut offset = header_size;
        for slot_index in 0..num_slots {
            let occupied = header.get(slot_index).unwrap_or(false);
            if occupied {
                let mut tuple = Tuple::decode(&schema, &bytes[offset..offset + tuple_len]);
                tuple.set_record_id(RecordId::new(page_id, slot_index));
                slots.push(Some(tuple));
            } else {
                slots.push(None);
            }
            offset += tuple_len;
        }

        Ok(Page {
            page_id,
            schema,
            page_size,
            slots,
            dirtier: None,
            before_image: bytes.to_vec(),
        })
    }

    /// Construct a freshly allocated, entirely empty page (used when the
    /// heap file grows).
    pub fn empty(page_id: PageId, schema: Arc<TupleSchema>, page_size: usize) -> Self {
        let num_slots = Self::num_slots(&schema, page_size);
        let bytes = vec![0u8; page_size];
        Page {
            page_id,
            schema,
            page_size,
            slots: vec![None; num_slots],
            dirtier: None,
            before_image: bytes,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn schema(&self) -> &Arc<TupleSchema> {
        &self.schema
    }

    /// Re-serialize header + slot array into a page-sized byte array.
    pub fn get_page_data(&self) -> Vec<u8> {
        let header_size = Self::header_size(&self.schema, self.page_size);
        let mut header = BitVec::from_elem(header_size * 8, false);
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                header.set(i, true);
            }
        }

        let mut bytes = header.to_bytes();
        for slot in &self.slots {
            match slot {
                Some(tuple) => {
                    let mut encoded = tuple
                        .encode(&self.schema)
                        .expect("tuple was validated against schema on insert");
                    bytes.append(&mut encoded);
                }
                None => {
                    bytes.extend(std::iter::repeat(0u8).take(self.schema.tuple_byte_len()));
                }
            }
        }
        bytes.resize(self.page_size, 0);
        bytes
    }

    /// Live tuples in slot order, each stamped with its record id.
    pub fn iter_tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn num_empty_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Insert into the lowest free slot, stamping the tuple with the
    /// matching record id. Fails if the page is full.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> DbResult<RecordId> {
        let slot_index = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or_else(|| DbError::DbException(format!("page {} is full", self.page_id)))?;
        let record_id = RecordId::new(self.page_id, slot_index);
        tuple.set_record_id(record_id);
        self.slots[slot_index] = Some(tuple);
        Ok(record_id)
    }

    /// Clear the slot named by `record_id`, freeing it for reuse.
    pub fn delete_tuple(&mut self, record_id: RecordId) -> DbResult<()> {
        if record_id.page_id != self.page_id {
            return Err(DbError::InvalidArgument(format!(
                "record id {} does not belong to page {}",
                record_id, self.page_id
            )));
        }
        let slot = self.slots.get_mut(record_id.slot_index).ok_or_else(|| {
            DbError::InvalidArgument(format!("slot {} out of range", record_id.slot_index))
        })?;
        if slot.is_none() {
            return Err(DbError::InvalidArgument(format!(
                "slot {} is already empty",
                record_id.slot_index
            )));
        }
        *slot = None;
        Ok(())
    }

    pub fn is_dirty(&self) -> Option<TransactionId> {
        self.dirtier
    }

    pub fn mark_dirty(&mut self, tid: Option<TransactionId>) {
        self.dirtier = tid;
    }

    /// The byte contents at the moment of load or last commit.
    pub fn before_image(&self) -> &[u8] {
        &self.before_image
    }

    /// Freeze the current contents as the new before-image; called only by
    /// the buffer pool, only at commit.
    pub fn set_before_image(&mut self) {
        self.before_image = self.get_page_data();
    }

    /// Rebuild this page's slots from a previously captured before-image,
    /// used by abort to revert in-memory state.
    pub fn revert_to_before_image(&mut self) -> DbResult<()> {
        let restored = Page::new(
            self.page_id,
            Arc::clone(&self.schema),
            self.page_size,
            &self.before_image.clone(),
        )?;
        self.slots = restored.slots;
        self.dirtier = None;
        Ok(())
    }
}
