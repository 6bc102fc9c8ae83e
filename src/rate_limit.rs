//! Rate limiting
//!
//! The service consults an `Arc<dyn RateLimitStore>` before every mutating
//! tool, keyed by tool name.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Decides whether a call identified by `key` may proceed
pub trait RateLimitStore: Send + Sync {
    /// Record an attempt for `key`; `true` if it is allowed
    fn check(&self, key: &str) -> bool;
}

/// Allows everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl RateLimitStore for NoopStore {
    fn check(&self, _key: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory fixed-window counter.
///
/// A key's window opens on its first request and closes `window` later; the
/// next request after that opens a fresh one. Not shared across processes.
#[derive(Debug)]
pub struct FixedWindowStore {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowStore {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `check` against an explicit clock reading
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        // Counters stay valid after a poisoning panic
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

impl RateLimitStore for FixedWindowStore {
    fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}
