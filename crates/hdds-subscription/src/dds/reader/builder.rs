// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builder pattern for DataReader configuration.
//!
//! Collects QoS, runtime configuration, listener and collaborators before
//! constructing a (not yet enabled) [`DataReader`].

use super::runtime::DataReader;
use super::status::ListenerSlot;
use crate::config::ReaderConfig;
use crate::core::{ENTITYKIND_READER_WITH_KEY, GUID};
use crate::dds::condition::StatusMask;
use crate::dds::handle::{IdentityHandleAllocator, InstanceHandleAllocator};
use crate::dds::listener::DataReaderListener;
use crate::dds::subscriber::Subscriber;
use crate::dds::topic::Topic;
use crate::dds::{Error, Result};
use crate::qos::ReaderQos;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_READER_KEY: AtomicU32 = AtomicU32::new(1);

/// Local GUID for a reader built without an explicit one.
fn local_reader_guid() -> GUID {
    let key = NEXT_READER_KEY.fetch_add(1, Ordering::Relaxed).to_be_bytes();
    let mut prefix = [0u8; 12];
    prefix[..4].copy_from_slice(&std::process::id().to_be_bytes());
    prefix[4..8].copy_from_slice(b"HDDS");
    GUID::new(prefix, [key[1], key[2], key[3], ENTITYKIND_READER_WITH_KEY])
}

pub struct ReaderBuilder {
    topic: Arc<dyn Topic>,
    subscriber: Arc<dyn Subscriber>,
    qos: ReaderQos,
    config: ReaderConfig,
    guid: Option<GUID>,
    listener: ListenerSlot,
    handles: Option<Arc<dyn InstanceHandleAllocator>>,
}

impl ReaderBuilder {
    pub(crate) fn new(topic: Arc<dyn Topic>, subscriber: Arc<dyn Subscriber>) -> Self {
        Self {
            topic,
            subscriber,
            qos: ReaderQos::default(),
            config: ReaderConfig::default(),
            guid: None,
            listener: ListenerSlot::default(),
            handles: None,
        }
    }

    pub fn qos(mut self, qos: ReaderQos) -> Self {
        self.qos = qos;
        self
    }

    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a GUID assigned by the participant instead of a local one.
    pub fn guid(mut self, guid: GUID) -> Self {
        self.guid = Some(guid);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn DataReaderListener>, mask: StatusMask) -> Self {
        self.listener = ListenerSlot {
            listener: Some(listener),
            mask,
        };
        self
    }

    /// Source of publication handles for matched writers. Defaults to an
    /// [`IdentityHandleAllocator`] private to this reader.
    pub fn handle_allocator(mut self, handles: Arc<dyn InstanceHandleAllocator>) -> Self {
        self.handles = Some(handles);
        self
    }

    pub fn build(self) -> Result<DataReader> {
        self.qos.validate().map_err(Error::InconsistentPolicy)?;

        let guid = self.guid.unwrap_or_else(local_reader_guid);
        if !guid.is_reader() {
            log::warn!("[READER-BUILDER] GUID {} does not carry a reader entity kind", guid);
        }
        let handles = self
            .handles
            .unwrap_or_else(|| Arc::new(IdentityHandleAllocator::new()));

        log::debug!(
            "[READER-BUILDER] topic='{}' type='{}' guid={} history={:?}",
            self.topic.name(),
            self.topic.type_name(),
            guid,
            self.qos.history
        );

        Ok(DataReader::new(
            guid,
            self.qos,
            self.config,
            self.topic,
            self.subscriber,
            handles,
            self.listener,
        ))
    }
}
