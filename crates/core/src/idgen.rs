//! Serial ID generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe serial ID generator
///
/// Hands out strictly increasing IDs starting at `first`. The server uses it
/// for connection IDs, assigned at accept time.
#[derive(Debug)]
pub struct IdGenerator {
    next_id: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    pub const fn starting_at(first: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first),
        }
    }

    /// Get the next available ID
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
