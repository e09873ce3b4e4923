// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::core::GUID;
use crate::dds::handle::InstanceHandle;
use crate::dds::listener::{RequestedIncompatibleQosStatus, SubscriptionMatchedStatus};
use std::collections::HashMap;

/// Matched publications of one reader, guarded by the association lock.
#[derive(Debug, Default)]
pub(crate) struct AssociationTable {
    subscription_id: Option<GUID>,
    publication_handles: Vec<InstanceHandle>,
    id_to_handle: HashMap<GUID, InstanceHandle>,
    pub(crate) matched: SubscriptionMatchedStatus,
    pub(crate) incompatible_qos: RequestedIncompatibleQosStatus,
}

impl AssociationTable {
    /// Record the reader id the first time associations arrive.
    pub(crate) fn bind_subscription(&mut self, reader_id: GUID) {
        match self.subscription_id {
            None => self.subscription_id = Some(reader_id),
            Some(existing) if existing != reader_id => {
                log::warn!(
                    "[reader] associations for {} but reader is bound to {}",
                    reader_id,
                    existing
                );
            }
            Some(_) => {}
        }
    }

    #[cfg(test)]
    pub(crate) fn subscription_id(&self) -> Option<GUID> {
        self.subscription_id
    }

    /// Add a matched publication and update the matched status.
    pub(crate) fn bind(&mut self, writer_id: GUID, handle: InstanceHandle) {
        if self.id_to_handle.insert(writer_id, handle).is_some() {
            return;
        }
        self.publication_handles.push(handle);
        self.matched.total_count += 1;
        self.matched.total_count_change += 1;
        self.matched.current_count += 1;
        self.matched.current_count_change += 1;
        self.matched.last_publication_handle = handle;
    }

    /// Drop a matched publication, returning its handle if it was bound.
    pub(crate) fn unbind(&mut self, writer_id: &GUID) -> Option<InstanceHandle> {
        let Some(handle) = self.id_to_handle.remove(writer_id) else {
            log::debug!("[reader] no publication handle bound for {}", writer_id);
            return None;
        };
        if let Some(pos) = self.publication_handles.iter().position(|h| *h == handle) {
            self.publication_handles.swap_remove(pos);
        }
        self.matched.current_count = self.matched.current_count.saturating_sub(1);
        self.matched.current_count_change -= 1;
        self.matched.last_publication_handle = handle;
        Some(handle)
    }

    pub(crate) fn handle_of(&self, writer_id: &GUID) -> Option<InstanceHandle> {
        self.id_to_handle.get(writer_id).copied()
    }

    pub(crate) fn publication_handles(&self) -> &[InstanceHandle] {
        &self.publication_handles
    }
}
