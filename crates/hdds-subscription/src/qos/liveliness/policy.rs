// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::LivelinessKind;
use std::time::{Duration, SystemTime};

/// LIVELINESS QoS policy.
///
/// `lease_duration` is how long a matched writer may stay silent before the
/// reader declares it not alive. Default: automatic, infinite lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveliness {
    pub kind: LivelinessKind,
    pub lease_duration: Duration,
}

impl Default for Liveliness {
    fn default() -> Self {
        Self {
            kind: LivelinessKind::Automatic,
            lease_duration: Duration::from_secs(u64::MAX),
        }
    }
}

impl Liveliness {
    #[must_use]
    pub fn new(kind: LivelinessKind, lease_duration: Duration) -> Self {
        Self {
            kind,
            lease_duration,
        }
    }

    #[must_use]
    pub fn automatic(lease_duration: Duration) -> Self {
        Self::new(LivelinessKind::Automatic, lease_duration)
    }

    #[must_use]
    pub fn automatic_millis(ms: u64) -> Self {
        Self::automatic(Duration::from_millis(ms))
    }

    #[must_use]
    pub fn automatic_secs(secs: u64) -> Self {
        Self::automatic(Duration::from_secs(secs))
    }

    #[must_use]
    pub fn manual_by_topic(lease_duration: Duration) -> Self {
        Self::new(LivelinessKind::ManualByTopic, lease_duration)
    }

    #[must_use]
    pub fn infinite() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.lease_duration == Duration::from_secs(u64::MAX)
    }

    /// Whether writers need lease supervision at all.
    #[must_use]
    pub fn is_supervised(&self) -> bool {
        !self.is_infinite() && !self.lease_duration.is_zero()
    }

    /// When a writer last active at `last_activity` loses its lease.
    ///
    /// `None` for unsupervised leases or on overflow.
    #[must_use]
    pub fn lease_expiry(&self, last_activity: SystemTime) -> Option<SystemTime> {
        if !self.is_supervised() {
            return None;
        }
        last_activity.checked_add(self.lease_duration)
    }
}
