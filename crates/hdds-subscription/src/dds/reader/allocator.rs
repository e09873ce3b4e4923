// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded sample-slot accounting.
//!
//! Every stored sample holds one [`Chunk`]; the chunk returns its slot when
//! the last reference to the sample (history entry or loan) is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct ChunkAllocator {
    capacity: usize,
    in_use: Arc<AtomicUsize>,
}

impl ChunkAllocator {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reserve a slot, `None` when all `capacity` slots are taken.
    pub(crate) fn try_allocate(&self) -> Option<Chunk> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.capacity).then_some(used + 1)
            })
            .ok()
            .map(|_| Chunk {
                in_use: Arc::clone(&self.in_use),
            })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

/// One reserved slot.
#[derive(Debug)]
pub(crate) struct Chunk {
    in_use: Arc<AtomicUsize>,
}

impl Drop for Chunk {
    fn drop(&mut self) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
