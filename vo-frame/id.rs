use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing frame ids for one tracking session
#[derive(Debug, Default)]
pub struct FrameIdAllocator {
    next: AtomicU64,
}

impl FrameIdAllocator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Id the next call to `next_id` will return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    /// Start a new session; ids handed out before may repeat afterwards
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}
