// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Communication status bits of a DataReader.
//!
//! Used both as the listener mask passed to `set_listener` and as the
//! changed-status set returned by `get_status_changes`.

use std::sync::atomic::{AtomicU32, Ordering};

/// Status mask bits
///
/// Per DDS v1.4 spec section 2.2.4.1 - Communication Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusMask(u32);

impl StatusMask {
    /// No status enabled
    pub const NONE: StatusMask = StatusMask(0);

    /// All statuses enabled
    pub const ALL: StatusMask = StatusMask(u32::MAX);

    /// Data available to read
    pub const DATA_AVAILABLE: StatusMask = StatusMask(1 << 0);

    /// Sample lost
    pub const SAMPLE_LOST: StatusMask = StatusMask(1 << 1);

    /// Sample rejected
    pub const SAMPLE_REJECTED: StatusMask = StatusMask(1 << 2);

    /// Liveliness changed
    pub const LIVELINESS_CHANGED: StatusMask = StatusMask(1 << 3);

    /// Requested deadline missed
    pub const REQUESTED_DEADLINE_MISSED: StatusMask = StatusMask(1 << 4);

    /// Requested incompatible QoS
    pub const REQUESTED_INCOMPATIBLE_QOS: StatusMask = StatusMask(1 << 5);

    /// Subscription matched
    pub const SUBSCRIPTION_MATCHED: StatusMask = StatusMask(1 << 6);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        StatusMask(bits)
    }

    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if this mask contains the given status
    #[must_use]
    pub const fn contains(&self, other: StatusMask) -> bool {
        (self.0 & other.0) == other.0
    }

    #[must_use]
    pub const fn or(self, other: StatusMask) -> Self {
        StatusMask(self.0 | other.0)
    }

    #[must_use]
    pub const fn and(self, other: StatusMask) -> Self {
        StatusMask(self.0 & other.0)
    }

    #[must_use]
    pub const fn without(self, other: StatusMask) -> Self {
        StatusMask(self.0 & !other.0)
    }
}

impl std::ops::BitOr for StatusMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl std::ops::BitAnd for StatusMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

/// Changed-status flags of one reader.
///
/// Set when a status record changes, cleared by the matching getter.
#[derive(Debug, Default)]
pub(crate) struct StatusChanges(AtomicU32);

impl StatusChanges {
    pub(crate) fn set(&self, kind: StatusMask) {
        self.0.fetch_or(kind.bits(), Ordering::AcqRel);
    }

    pub(crate) fn clear(&self, kind: StatusMask) {
        self.0.fetch_and(!kind.bits(), Ordering::AcqRel);
    }

    pub(crate) fn get(&self) -> StatusMask {
        StatusMask::from_bits(self.0.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mask_ops() {
        let mask = StatusMask::LIVELINESS_CHANGED | StatusMask::SUBSCRIPTION_MATCHED;

        assert!(mask.contains(StatusMask::LIVELINESS_CHANGED));
        assert!(!mask.contains(StatusMask::SAMPLE_LOST));
        assert!(!mask.contains(StatusMask::LIVELINESS_CHANGED | StatusMask::SAMPLE_LOST));
        assert_eq!(
            mask.without(StatusMask::LIVELINESS_CHANGED),
            StatusMask::SUBSCRIPTION_MATCHED
        );
        assert!(StatusMask::NONE.is_empty());
        assert!(StatusMask::ALL.contains(StatusMask::REQUESTED_INCOMPATIBLE_QOS));
    }

    #[test]
    fn test_status_changes_set_clear() {
        let changes = StatusChanges::default();
        changes.set(StatusMask::SAMPLE_LOST);
        changes.set(StatusMask::DATA_AVAILABLE);
        assert_eq!(
            changes.get(),
            StatusMask::SAMPLE_LOST | StatusMask::DATA_AVAILABLE
        );

        changes.clear(StatusMask::SAMPLE_LOST);
        assert_eq!(changes.get(), StatusMask::DATA_AVAILABLE);
    }
}
