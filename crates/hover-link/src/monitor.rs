//! Connection monitor - tracks the time since the last frame arrived
//!
//! **Purpose**: passive link-age observability for diagnostics. The read
//! loop registers every received chunk; callers can query how stale the
//! link is. This never drives reconnection - liveness detection relies on
//! read errors and stream-end signals only.
//!
//! **App Start Relative Time Pattern**:
//! - Uses monotonic time anchored to application start
//! - Unaffected by system clock changes (NTP, manual adjustments)
//! - Safe to store in AtomicU64 for lock-free access

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global anchor point for monotonic time
static APP_START: OnceLock<Instant> = OnceLock::new();

/// Get monotonic time as microseconds since app start
fn monotonic_micros() -> u64 {
    let start = APP_START.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// Tracks the arrival time of the most recent frame
pub struct ConnectionMonitor {
    last_frame: AtomicU64,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self {
            last_frame: AtomicU64::new(monotonic_micros()),
        }
    }

    /// Register that a frame (byte chunk) arrived from the device
    pub fn register_frame(&self) {
        self.last_frame.store(monotonic_micros(), Ordering::Relaxed);
    }

    /// Time since the last registered frame
    pub fn time_since_last_frame(&self) -> Duration {
        let last_us = self.last_frame.load(Ordering::Relaxed);
        let now_us = monotonic_micros();
        Duration::from_micros(now_us.saturating_sub(last_us))
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
