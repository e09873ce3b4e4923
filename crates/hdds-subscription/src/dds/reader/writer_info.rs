// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::core::GUID;
use crate::dds::handle::InstanceHandle;
use crate::qos::Liveliness;
use std::time::SystemTime;

/// Liveliness state of a matched writer as seen by this reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Associated, no activity observed yet.
    NotSet,
    Alive,
    /// Lease expired without activity.
    Dead,
}

/// Reader-side bookkeeping for one matched writer.
#[derive(Debug, Clone)]
pub(crate) struct WriterInfo {
    pub(crate) writer_id: GUID,
    pub(crate) state: WriterState,
    pub(crate) last_activity: SystemTime,
    pub(crate) publication_handle: InstanceHandle,
    last_sequence: Option<u64>,
}

impl WriterInfo {
    /// Starts the lease clock at association time so a silent writer can expire.
    pub(crate) fn new(writer_id: GUID, now: SystemTime) -> Self {
        Self {
            writer_id,
            state: WriterState::NotSet,
            last_activity: now,
            publication_handle: InstanceHandle::NIL,
            last_sequence: None,
        }
    }

    /// Instant at which the lease runs out, if it is supervised and the
    /// writer is not already dead.
    pub(crate) fn lease_expiry(&self, lease: &Liveliness) -> Option<SystemTime> {
        if self.state == WriterState::Dead {
            return None;
        }
        lease.lease_expiry(self.last_activity)
    }

    /// Records a sequence number and returns how many were skipped since the
    /// previous one. Duplicates and reordered sequences report no loss.
    pub(crate) fn record_sequence(&mut self, sequence: u64) -> u32 {
        if sequence == 0 {
            return 0;
        }
        let lost = match self.last_sequence {
            Some(last) if sequence <= last => return 0,
            Some(last) => sequence - last - 1,
            None => 0,
        };
        self.last_sequence = Some(sequence);
        u32::try_from(lost).unwrap_or(u32::MAX)
    }
}
