/// The permission a caller declares when fetching a page from the buffer
/// pool. Determines which lock mode is acquired: shared for read-only,
/// exclusive for read-write.
///
/// Acquiring only a shared lock for a write would let two writers race
/// on the same page, so `ReadWrite` always takes the exclusive lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

impl Permission {
    pub fn is_read_write(&self) -> bool {
        matches!(self, Permission::ReadWrite)
    }
}
