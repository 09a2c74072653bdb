// SPDX-License-Identifier: MIT OR Apache-2.0
//! Millisecond time sources for playback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually advanced clock for deterministic playback
///
/// Clones share the same time, so a test can keep a handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at the given time
    pub fn new(time_ms: u64) -> Self {
        Self {
            time_ms: Arc::new(AtomicU64::new(time_ms)),
        }
    }

    /// Set the current time
    pub fn set(&self, time_ms: u64) {
        self.time_ms.store(time_ms, Ordering::SeqCst);
    }

    /// Advance the current time
    pub fn advance(&self, delta_ms: u64) {
        self.time_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }
}
