// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Incoming sample envelope and the per-sample metadata returned by reads.

use crate::core::GUID;
use crate::dds::handle::{InstanceHandle, InstanceKey};
use crate::dds::read_condition::{InstanceStateMask, SampleStateMask, ViewStateMask};
use std::time::SystemTime;

/// Kind of message delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Payload sample.
    Data,
    /// Instance registration (no payload).
    Registration,
    /// Writer liveliness heartbeat.
    WriterLiveliness,
    /// Instance disposed by the writer.
    Dispose,
    /// Writer unregistered from the instance.
    Unregister,
}

/// Metadata attached by the transport to every received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSampleHeader {
    pub kind: MessageKind,
    pub writer_id: GUID,
    /// Writer-side timestamp; lifespan is measured from it.
    pub source_timestamp: SystemTime,
    /// Writer sequence number; `0` when the message carries none.
    pub sequence: u64,
    pub key: InstanceKey,
}

/// A message pushed into [`DataReader::data_received`](crate::DataReader::data_received).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedDataSample {
    pub header: DataSampleHeader,
    /// Serialized payload, opaque to the reader. Empty for markers.
    pub payload: Vec<u8>,
}

impl ReceivedDataSample {
    fn marker(kind: MessageKind, writer_id: GUID, key: InstanceKey, sequence: u64) -> Self {
        Self {
            header: DataSampleHeader {
                kind,
                writer_id,
                source_timestamp: SystemTime::now(),
                sequence,
                key,
            },
            payload: Vec::new(),
        }
    }

    /// Data sample stamped with the current wall-clock time.
    pub fn data(
        writer_id: GUID,
        key: impl Into<InstanceKey>,
        sequence: u64,
        payload: Vec<u8>,
    ) -> Self {
        let mut sample = Self::marker(MessageKind::Data, writer_id, key.into(), sequence);
        sample.payload = payload;
        sample
    }

    pub fn registration(writer_id: GUID, key: impl Into<InstanceKey>, sequence: u64) -> Self {
        Self::marker(MessageKind::Registration, writer_id, key.into(), sequence)
    }

    pub fn dispose(writer_id: GUID, key: impl Into<InstanceKey>) -> Self {
        Self::marker(MessageKind::Dispose, writer_id, key.into(), 0)
    }

    pub fn unregister(writer_id: GUID, key: impl Into<InstanceKey>) -> Self {
        Self::marker(MessageKind::Unregister, writer_id, key.into(), 0)
    }

    pub fn liveliness(writer_id: GUID) -> Self {
        Self::marker(
            MessageKind::WriterLiveliness,
            writer_id,
            InstanceKey::keyless(),
            0,
        )
    }

    #[must_use]
    pub fn with_source_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.header.source_timestamp = timestamp;
        self
    }
}

/// Whether a sample was already returned by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    NotRead,
    Read,
}

impl SampleState {
    pub fn mask(self) -> SampleStateMask {
        match self {
            Self::NotRead => SampleStateMask::NOT_READ,
            Self::Read => SampleStateMask::READ,
        }
    }
}

/// Whether the instance was already accessed since it appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    New,
    NotNew,
}

impl ViewState {
    pub fn mask(self) -> ViewStateMask {
        match self {
            Self::New => ViewStateMask::NEW,
            Self::NotNew => ViewStateMask::NOT_NEW,
        }
    }
}

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStateKind {
    Alive,
    NotAliveDisposed,
    NotAliveNoWriters,
}

impl InstanceStateKind {
    pub fn mask(self) -> InstanceStateMask {
        match self {
            Self::Alive => InstanceStateMask::ALIVE,
            Self::NotAliveDisposed => InstanceStateMask::NOT_ALIVE_DISPOSED,
            Self::NotAliveNoWriters => InstanceStateMask::NOT_ALIVE_NO_WRITERS,
        }
    }

    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Per-sample metadata returned alongside each payload.
///
/// `disposed_generation_count` / `no_writers_generation_count` are the
/// instance counters captured when the sample was stored. The three ranks are
/// computed when the sample is read, relative to the other samples of the
/// same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    pub sample_state: SampleState,
    pub view_state: ViewState,
    pub instance_state: InstanceStateKind,
    pub source_timestamp: SystemTime,
    pub instance_handle: InstanceHandle,
    pub publication_handle: InstanceHandle,
    pub disposed_generation_count: i32,
    pub no_writers_generation_count: i32,
    /// Samples of the same instance that follow this one in the returned batch.
    pub sample_rank: i32,
    /// Generation difference to the last sample of the instance in the batch.
    pub generation_rank: i32,
    /// Generation difference to the most recent sample held for the instance.
    pub absolute_generation_rank: i32,
    /// `false` for registration markers.
    pub valid_data: bool,
}

impl SampleInfo {
    /// Sum of both generation counters at insertion time.
    pub(crate) fn generation_snapshot(&self) -> i32 {
        self.disposed_generation_count + self.no_writers_generation_count
    }
}
