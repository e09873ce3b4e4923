// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application-visible handles.
//!
//! - [`InstanceKey`]: 16-byte key hash computed by the writer from @key fields.
//! - [`InstanceHandle`]: opaque local handle for an instance or a matched
//!   publication. `0` is the nil handle.

use crate::core::GUID;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Instance key hash (DDS KeyHash). All zeros for keyless topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InstanceKey(pub [u8; 16]);

impl InstanceKey {
    pub const fn new(key_hash: [u8; 16]) -> Self {
        Self(key_hash)
    }

    /// Key of the single instance of a keyless topic.
    pub const fn keyless() -> Self {
        Self([0u8; 16])
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for InstanceKey {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Local handle for an instance or a matched publication.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InstanceHandle(pub u64);

impl InstanceHandle {
    pub const NIL: InstanceHandle = InstanceHandle(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn is_nil(&self) -> bool {
        self.0 == 0
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("InstanceHandle(nil)")
        } else {
            write!(f, "InstanceHandle({})", self.0)
        }
    }
}

/// Resolves matched writer identities to publication handles.
///
/// Usually backed by the participant's handle registry. Resolution may fail
/// for individual ids; the reader logs and skips those entries.
pub trait InstanceHandleAllocator: Send + Sync {
    /// One entry per id, in order; `None` when the id cannot be resolved.
    fn handles_for(&self, ids: &[GUID]) -> Vec<Option<InstanceHandle>>;
}

/// Default allocator: assigns a stable, monotonically increasing handle to
/// each distinct GUID on first lookup.
#[derive(Debug)]
pub struct IdentityHandleAllocator {
    handles: DashMap<GUID, InstanceHandle>,
    next: AtomicU64,
}

impl Default for IdentityHandleAllocator {
    fn default() -> Self {
        Self {
            handles: DashMap::new(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdentityHandleAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle previously assigned to `id`, without allocating.
    #[must_use]
    pub fn lookup(&self, id: &GUID) -> Option<InstanceHandle> {
        self.handles.get(id).map(|entry| *entry.value())
    }
}

impl InstanceHandleAllocator for IdentityHandleAllocator {
    fn handles_for(&self, ids: &[GUID]) -> Vec<Option<InstanceHandle>> {
        ids.iter()
            .map(|id| {
                if id.is_zero() {
                    return None;
                }
                let handle = *self
                    .handles
                    .entry(*id)
                    .or_insert_with(|| InstanceHandle(self.next.fetch_add(1, Ordering::Relaxed)));
                Some(handle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_handle_nil() {
        assert!(InstanceHandle::NIL.is_nil());
        assert!(InstanceHandle::default().is_nil());
        assert!(!InstanceHandle::new(7).is_nil());
        assert_eq!(format!("{:?}", InstanceHandle::NIL), "InstanceHandle(nil)");
    }

    #[test]
    fn test_identity_allocator_is_stable() {
        let alloc = IdentityHandleAllocator::new();
        let a = GUID::new([1; 12], [0, 0, 1, 2]);
        let b = GUID::new([2; 12], [0, 0, 1, 2]);

        let first = alloc.handles_for(&[a, b]);
        let second = alloc.handles_for(&[b, a]);

        assert_eq!(first[0], second[1]);
        assert_eq!(first[1], second[0]);
        assert_ne!(first[0], first[1]);
        assert_eq!(alloc.lookup(&a), first[0]);
    }

    #[test]
    fn test_identity_allocator_rejects_zero_guid() {
        let alloc = IdentityHandleAllocator::new();
        assert_eq!(alloc.handles_for(&[GUID::zero()]), vec![None]);
        assert_eq!(alloc.lookup(&GUID::zero()), None);
    }
}
