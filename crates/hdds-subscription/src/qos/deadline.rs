// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DEADLINE QoS policy (DDS v1.4 Sec.2.2.3.7)
//!
//! A reader requesting a deadline expects every instance to receive a new
//! sample at least once per `period`. When an instance stays silent longer,
//! REQUESTED_DEADLINE_MISSED is raised for it and a new window starts.
//!
//! # Examples
//!
//! ```
//! use hdds_subscription::qos::deadline::{Deadline, DeadlineWindow};
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let t0 = UNIX_EPOCH + Duration::from_secs(100);
//! let mut window = DeadlineWindow::new(t0);
//! let deadline = Deadline::from_millis(100);
//!
//! assert!(!window.check(&deadline, t0 + Duration::from_millis(50)));
//! assert!(window.check(&deadline, t0 + Duration::from_millis(100)));
//! ```

use std::time::{Duration, SystemTime};

/// DEADLINE QoS policy
///
/// Default: Infinite (no deadline enforcement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Maximum time between samples of one instance
    pub period: Duration,
}

impl Default for Deadline {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(u64::MAX),
        }
    }
}

impl Deadline {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn infinite() -> Self {
        Self::default()
    }

    pub fn is_infinite(&self) -> bool {
        self.period == Duration::from_secs(u64::MAX)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            period: Duration::from_millis(ms),
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self {
            period: Duration::from_secs(secs),
        }
    }
}

/// Deadline window of a single instance.
///
/// Tracks when the current window opened (last sample, or last miss) and
/// tells whether the requested period elapsed since.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineWindow {
    opened_at: SystemTime,
    missed_count: u64,
}

impl DeadlineWindow {
    pub fn new(now: SystemTime) -> Self {
        Self {
            opened_at: now,
            missed_count: 0,
        }
    }

    /// Record a sample: restarts the window.
    pub fn on_sample(&mut self, now: SystemTime) {
        self.opened_at = now;
    }

    /// When the current window closes, `None` for an infinite deadline.
    pub fn due_at(&self, deadline: &Deadline) -> Option<SystemTime> {
        if deadline.is_infinite() {
            return None;
        }
        self.opened_at.checked_add(deadline.period)
    }

    /// Returns `true` if the window closed without a sample.
    ///
    /// A miss restarts the window at `now` so the next miss is reported one
    /// period later.
    pub fn check(&mut self, deadline: &Deadline, now: SystemTime) -> bool {
        match self.due_at(deadline) {
            Some(due) if due <= now => {
                self.missed_count += 1;
                self.opened_at = now;
                true
            }
            _ => false,
        }
    }

    pub fn missed_count(&self) -> u64 {
        self.missed_count
    }
}
