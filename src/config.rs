use std::time::Duration;

/// Process-wide tunables, enumerated in full by the external interface.
///
/// Built once before any heap file or buffer pool is constructed; nothing
/// in the core reads a global for these, they are threaded through
/// explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Bytes per page.
    pub page_size: usize,
    /// Pages resident in the buffer pool at once.
    pub buffer_pool_capacity: usize,
    /// Per-wait condition timeout, a liveness backstop only: cycle
    /// detection is the authoritative deadlock mechanism.
    pub deadlock_wait_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            page_size: 4096,
            buffer_pool_capacity: 50,
            deadlock_wait_timeout: Duration::from_secs(1),
        }
    }
}

impl Config {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_buffer_pool_capacity(mut self, capacity: usize) -> Self {
        self.buffer_pool_capacity = capacity;
        self
    }

    pub fn with_deadlock_wait_timeout(mut self, timeout: Duration) -> Self {
        self.deadlock_wait_timeout = timeout;
        self
    }
}
