// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIFESPAN QoS policy (DDS v1.4 Sec.2.2.3.9)
//!
//! Specifies how long a sample stays valid after its source timestamp.
//! The reader drops a sample on arrival when
//! `source_timestamp + lifespan <= now`: it never enters the history and does
//! not touch any status counter.
//!
//! Lifespan is a topic/writer policy; the reader looks it up through
//! [`Topic::lifespan`](crate::Topic::lifespan) for every sample.
//!
//! # Difference from DEADLINE
//!
//! - **DEADLINE**: Time BETWEEN samples (publication rate)
//! - **LIFESPAN**: Time FOR a sample (validity duration)

use std::time::{Duration, SystemTime};

/// LIFESPAN QoS policy
///
/// Default: Infinite (samples never expire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifespan {
    /// Maximum sample validity duration
    pub duration: Duration,
}

impl Default for Lifespan {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(u64::MAX),
        }
    }
}

impl Lifespan {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn infinite() -> Self {
        Self::default()
    }

    pub fn is_infinite(&self) -> bool {
        self.duration == Duration::from_secs(u64::MAX)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(ms),
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self {
            duration: Duration::from_secs(secs),
        }
    }
}

/// Expiration check against source timestamps.
#[derive(Debug, Clone, Copy)]
pub struct LifespanChecker {
    lifespan: Lifespan,
}

impl LifespanChecker {
    pub fn new(lifespan: Lifespan) -> Self {
        Self { lifespan }
    }

    /// Instant at which a sample stamped `source_timestamp` expires.
    ///
    /// `None` when the lifespan is infinite or the sum overflows.
    pub fn expires_at(&self, source_timestamp: SystemTime) -> Option<SystemTime> {
        if self.lifespan.is_infinite() {
            return None;
        }
        source_timestamp.checked_add(self.lifespan.duration)
    }

    /// `true` once `source_timestamp + lifespan <= now`.
    pub fn is_expired(&self, source_timestamp: SystemTime, now: SystemTime) -> bool {
        self.expires_at(source_timestamp)
            .is_some_and(|expiry| expiry <= now)
    }
}
