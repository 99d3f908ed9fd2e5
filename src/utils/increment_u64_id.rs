use std::sync::atomic::{AtomicU64, Ordering};

/// A per-owner counter handing out strictly increasing IDs, starting at 0.
///
/// Each `RpcNode` owns one, so IDs are unique per node and are not shared
/// between nodes or persisted across restarts. Wraps around after `u64::MAX`.
#[derive(Debug, Default)]
pub struct IncrementU64Id {
    next: AtomicU64,
}

impl IncrementU64Id {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    #[inline]
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The ID the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
