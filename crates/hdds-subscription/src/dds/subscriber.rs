// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscriber collaborator of a DataReader.
//!
//! The reader never owns its subscriber; it holds an `Arc<dyn Subscriber>`
//! and calls back into it for association forwarding, listener fallback and
//! data-on-readers notification.

use super::condition::StatusMask;
use super::listener::DataReaderListener;
use super::Result;
use crate::core::GUID;
use crate::qos::ReaderQos;
use std::sync::Arc;

/// A matched writer as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterAssociation {
    pub writer_id: GUID,
}

impl WriterAssociation {
    pub fn new(writer_id: GUID) -> Self {
        Self { writer_id }
    }
}

/// Operations a DataReader needs from its owning Subscriber.
pub trait Subscriber: Send + Sync {
    /// Newly matched writers of `reader_id` (duplicates already filtered).
    fn add_associations(&self, reader_id: GUID, writers: &[WriterAssociation], qos: &ReaderQos);

    /// Writers of `reader_id` that were unmatched.
    fn remove_associations(&self, writers: &[GUID], reader_id: GUID);

    /// Subscriber-level listener for `kind`, used when the reader's own mask
    /// does not cover it.
    fn listener_for(&self, kind: StatusMask) -> Option<Arc<dyn DataReaderListener>>;

    /// A sample was stored by `reader_id` (DATA_ON_READERS).
    fn data_received(&self, reader_id: GUID);

    /// The reader was enabled on `topic_name`.
    fn reader_enabled(&self, reader_id: GUID, topic_name: &str, topic_id: u32) -> Result<()> {
        let _ = (reader_id, topic_name, topic_id);
        Ok(())
    }
}

/// Subscriber with no listener and no bookkeeping.
///
/// For readers driven directly by a transport or a test harness.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSubscriber;

impl Subscriber for DetachedSubscriber {
    fn add_associations(&self, reader_id: GUID, writers: &[WriterAssociation], _qos: &ReaderQos) {
        log::trace!(
            "[subscriber] detached: {} writer(s) matched reader {}",
            writers.len(),
            reader_id
        );
    }

    fn remove_associations(&self, writers: &[GUID], reader_id: GUID) {
        log::trace!(
            "[subscriber] detached: {} writer(s) unmatched reader {}",
            writers.len(),
            reader_id
        );
    }

    fn listener_for(&self, _kind: StatusMask) -> Option<Arc<dyn DataReaderListener>> {
        None
    }

    fn data_received(&self, _reader_id: GUID) {}
}
