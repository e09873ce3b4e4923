// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reader runtime configuration.
//!
//! Everything a [`DataReader`](crate::DataReader) needs beyond its QoS is passed
//! explicitly through a [`ReaderConfig`] value; there is no process-wide
//! mutable default.
//!
//! # Example
//!
//! ```
//! use hdds_subscription::config::{ManualClock, ReaderConfig};
//! use std::sync::Arc;
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let clock = Arc::new(ManualClock::new(UNIX_EPOCH + Duration::from_secs(1_000)));
//! let config = ReaderConfig::default()
//!     .with_default_n_chunks(64)
//!     .with_clock(clock.clone());
//!
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(config.default_n_chunks, 64);
//! ```

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Sample allocator capacity used when `ResourceLimits::max_samples` is unlimited.
pub const DEFAULT_N_CHUNKS: usize = 20;

/// Name given to the per-reader timer thread.
pub const READER_TIMER_THREAD_NAME: &str = "hdds-reader-timer";

/// Wall-clock source for activity stamps, lifespan and deadline checks.
///
/// Source timestamps carried by samples are compared against this clock, so
/// writer and reader clocks are assumed to be synchronized.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> SystemTime;
}

/// [`Clock`] backed by `SystemTime::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven [`Clock`] for deterministic tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }

    pub fn set(&self, time: SystemTime) {
        *self.now.lock() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}

/// Runtime configuration for a single reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Allocator capacity when QoS leaves `max_samples` unlimited.
    pub default_n_chunks: usize,
    /// Thread name for the liveliness/deadline timer.
    pub timer_thread_name: String,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_n_chunks: DEFAULT_N_CHUNKS,
            timer_thread_name: READER_TIMER_THREAD_NAME.to_string(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn with_default_n_chunks(mut self, n_chunks: usize) -> Self {
        self.default_n_chunks = n_chunks;
        self
    }

    #[must_use]
    pub fn with_timer_thread_name(mut self, name: impl Into<String>) -> Self {
        self.timer_thread_name = name.into();
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> SystemTime {
        self.clock.now()
    }
}
