// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-instance sample history with depth-bounded eviction and loans.
//!
//! # Architecture
//!
//! ```text
//! history: [S0][S1][S2][S3]      depth = 3
//!           ^               ^
//!        oldest          newest
//!
//! insert  -> evict from the front while len >= depth and front not loaned
//! read    -> copy payload, mark READ
//! take    -> remove entry (loaned payload stays alive in the loan)
//! ```
//!
//! A payload lives in a [`SampleSlot`] shared between the history entry and
//! any outstanding [`SampleLoan`]. The allocator slot is released when the
//! last of them goes away.

use super::allocator::Chunk;
use super::sample::{SampleInfo, SampleState};
use crate::dds::handle::InstanceHandle;
use crate::dds::read_condition::SampleStateMask;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Payload storage shared by a history entry and its loans.
#[derive(Debug)]
pub(crate) struct SampleSlot {
    payload: Vec<u8>,
    _chunk: Chunk,
}

/// One retained sample.
#[derive(Debug)]
pub(crate) struct ReceivedDataElement {
    slot: Arc<SampleSlot>,
    pub(crate) valid_data: bool,
    pub(crate) source_timestamp: SystemTime,
    pub(crate) publication_handle: InstanceHandle,
    pub(crate) sample_state: SampleState,
    pub(crate) disposed_generation_count: i32,
    pub(crate) no_writers_generation_count: i32,
}

impl ReceivedDataElement {
    pub(crate) fn new(
        payload: Vec<u8>,
        chunk: Chunk,
        valid_data: bool,
        source_timestamp: SystemTime,
        publication_handle: InstanceHandle,
        (disposed_generation_count, no_writers_generation_count): (i32, i32),
    ) -> Self {
        Self {
            slot: Arc::new(SampleSlot {
                payload,
                _chunk: chunk,
            }),
            valid_data,
            source_timestamp,
            publication_handle,
            sample_state: SampleState::NotRead,
            disposed_generation_count,
            no_writers_generation_count,
        }
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.slot.payload
    }

    /// Move the payload out, copying only if a loan still shares it.
    pub(crate) fn into_payload(self) -> Vec<u8> {
        match Arc::try_unwrap(self.slot) {
            Ok(slot) => slot.payload,
            Err(shared) => shared.payload.clone(),
        }
    }

    /// Outstanding zero-copy loans on this sample.
    pub(crate) fn loan_count(&self) -> usize {
        Arc::strong_count(&self.slot) - 1
    }

    pub(crate) fn is_loaned(&self) -> bool {
        self.loan_count() > 0
    }

    pub(crate) fn generation_snapshot(&self) -> i32 {
        self.disposed_generation_count + self.no_writers_generation_count
    }

    pub(crate) fn loan(&self, info: SampleInfo, loans: &LoanCounter) -> SampleLoan {
        loans.0.fetch_add(1, Ordering::AcqRel);
        SampleLoan {
            slot: Arc::clone(&self.slot),
            info,
            _token: LoanToken(Arc::clone(&loans.0)),
        }
    }
}

/// Live [`SampleLoan`]s of one reader, including loans on samples that were
/// taken or evicted since.
#[derive(Debug, Default)]
pub(crate) struct LoanCounter(Arc<AtomicUsize>);

impl LoanCounter {
    pub(crate) fn outstanding(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

struct LoanToken(Arc<AtomicUsize>);

impl Drop for LoanToken {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Zero-copy view of a stored sample.
///
/// While alive, the sample cannot be evicted by history depth and its
/// instance cannot be released. Dropping the loan returns it.
pub struct SampleLoan {
    slot: Arc<SampleSlot>,
    info: SampleInfo,
    _token: LoanToken,
}

impl SampleLoan {
    pub fn data(&self) -> &[u8] {
        &self.slot.payload
    }

    pub fn info(&self) -> &SampleInfo {
        &self.info
    }
}

impl std::ops::Deref for SampleLoan {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data()
    }
}

impl fmt::Debug for SampleLoan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleLoan")
            .field("len", &self.slot.payload.len())
            .field("info", &self.info)
            .finish()
    }
}

/// Samples of one instance, oldest first.
#[derive(Debug, Default)]
pub(crate) struct SampleHistory {
    samples: VecDeque<ReceivedDataElement>,
}

impl SampleHistory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ReceivedDataElement> {
        self.samples.iter()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&ReceivedDataElement> {
        self.samples.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ReceivedDataElement> {
        self.samples.get_mut(index)
    }

    pub(crate) fn push(&mut self, element: ReceivedDataElement) {
        self.samples.push_back(element);
    }

    /// Evict so that one more sample fits within `depth`.
    pub(crate) fn make_room(&mut self, depth: usize) -> usize {
        self.evict_while(|len| len >= depth)
    }

    /// Evict down to `depth`, catching up on evictions deferred by loans.
    pub(crate) fn enforce_depth(&mut self, depth: usize) -> usize {
        self.evict_while(|len| len > depth)
    }

    fn evict_while(&mut self, over: impl Fn(usize) -> bool) -> usize {
        let mut evicted = 0;
        while over(self.samples.len()) {
            match self.samples.front() {
                Some(oldest) if !oldest.is_loaned() => {
                    self.samples.pop_front();
                    evicted += 1;
                }
                Some(_) => {
                    log::trace!("[cache] oldest sample is loaned, eviction deferred");
                    break;
                }
                None => break,
            }
        }
        evicted
    }

    /// Generation sum of the most recent sample held.
    pub(crate) fn newest_generation(&self) -> Option<i32> {
        self.samples.back().map(ReceivedDataElement::generation_snapshot)
    }

    /// Indices of up to `limit` samples whose state is in `mask`, oldest first.
    pub(crate) fn select(&self, mask: SampleStateMask, limit: usize) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| mask.contains(s.sample_state.mask()))
            .take(limit)
            .map(|(i, _)| i)
            .collect()
    }

    /// Remove the samples at `indices` (ascending) and return them in order.
    pub(crate) fn remove_indices(&mut self, indices: &[usize]) -> Vec<ReceivedDataElement> {
        let mut removed: Vec<ReceivedDataElement> = indices
            .iter()
            .rev()
            .filter_map(|&idx| self.samples.remove(idx))
            .collect();
        removed.reverse();
        removed
    }

    pub(crate) fn loan_count(&self) -> usize {
        self.samples.iter().map(ReceivedDataElement::loan_count).sum()
    }
}

/// Fill in the three ranks of one instance's samples in a returned batch.
///
/// `batch` is ordered oldest first. `most_recent_generation` is the generation
/// sum of the newest sample the instance holds, returned or not.
pub(crate) fn assign_ranks(batch: &mut [SampleInfo], most_recent_generation: i32) {
    let Some(batch_generation) = batch.last().map(SampleInfo::generation_snapshot) else {
        return;
    };
    let count = batch.len();
    for (i, info) in batch.iter_mut().enumerate() {
        let snapshot = info.generation_snapshot();
        info.sample_rank = i32::try_from(count - i - 1).unwrap_or(i32::MAX);
        info.generation_rank = batch_generation - snapshot;
        info.absolute_generation_rank = most_recent_generation - snapshot;
    }
}
