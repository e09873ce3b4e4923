// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mutable reader state guarded by a single lock.
//!
//! Every helper takes `&mut self` plus the [`Outbox`] of the calling
//! operation, so nested steps (a sample reviving a writer, a dead writer
//! releasing its instances) never re-acquire the lock.

use super::allocator::ChunkAllocator;
use super::cache::{assign_ranks, LoanCounter, ReceivedDataElement, SampleLoan};
use super::instance::SubscriptionInstance;
use super::sample::{MessageKind, ReceivedDataSample, SampleInfo, SampleState};
use super::status::{Outbox, ReaderStatuses};
use super::timer::TimerKind;
use super::writer_info::WriterInfo;
use crate::core::GUID;
use crate::dds::handle::{InstanceHandle, InstanceKey};
use crate::dds::listener::SampleRejectedReason;
use crate::dds::read_condition::{InstanceStateMask, SampleStateMask, ViewStateMask};
use crate::dds::{Error, Result};
use crate::qos::{LifespanChecker, ReaderQos, LENGTH_UNLIMITED};
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadMode {
    Read,
    Take,
    Loan,
}

/// Filter and limits of one read/take call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadQuery {
    pub(crate) max_samples: usize,
    pub(crate) sample_states: SampleStateMask,
    pub(crate) view_states: ViewStateMask,
    pub(crate) instance_states: InstanceStateMask,
    pub(crate) instance: Option<InstanceHandle>,
    pub(crate) mode: ReadMode,
}

impl ReadQuery {
    pub(crate) fn any(max_samples: usize, mode: ReadMode) -> Self {
        Self {
            max_samples,
            sample_states: SampleStateMask::ANY,
            view_states: ViewStateMask::ANY,
            instance_states: InstanceStateMask::ANY,
            instance: None,
            mode,
        }
    }
}

/// A sample handed out by a read.
pub(crate) enum Delivered {
    Copy(Vec<u8>, SampleInfo),
    Loan(SampleLoan),
}

#[derive(Debug)]
pub(crate) struct ReaderState {
    pub(crate) qos: ReaderQos,
    depth: usize,
    allocator: Option<ChunkAllocator>,
    pub(crate) writers: HashMap<GUID, WriterInfo>,
    pub(crate) instances: BTreeMap<InstanceHandle, SubscriptionInstance>,
    keys: HashMap<InstanceKey, InstanceHandle>,
    next_instance: u64,
    deadline_armed: Option<SystemTime>,
    loans: LoanCounter,
    pub(crate) statuses: ReaderStatuses,
}

impl ReaderState {
    pub(crate) fn new(qos: ReaderQos) -> Self {
        Self {
            qos,
            depth: 0,
            allocator: None,
            writers: HashMap::new(),
            instances: BTreeMap::new(),
            keys: HashMap::new(),
            next_instance: 1,
            deadline_armed: None,
            loans: LoanCounter::default(),
            statuses: ReaderStatuses::default(),
        }
    }

    /// Freeze history depth and size the sample allocator. Called on enable.
    pub(crate) fn configure(&mut self, default_n_chunks: usize) {
        self.depth = self.qos.history_depth();
        let n_chunks = match self.qos.resource_limits.max_samples {
            LENGTH_UNLIMITED => default_n_chunks,
            max => max,
        };
        log::debug!(
            "[reader] history depth={} sample chunks={}",
            self.depth,
            n_chunks
        );
        self.allocator = Some(ChunkAllocator::new(n_chunks));
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    #[cfg(test)]
    pub(crate) fn chunks_in_use(&self) -> usize {
        self.allocator.as_ref().map_or(0, ChunkAllocator::in_use)
    }

    // ========================================================================
    // Writers
    // ========================================================================

    /// Track a newly matched writer. Returns `false` if it was already known.
    pub(crate) fn insert_writer(&mut self, writer_id: GUID, now: SystemTime) -> bool {
        if self.writers.contains_key(&writer_id) {
            log::debug!("[reader] writer {} already associated", writer_id);
            return false;
        }
        self.writers
            .insert(writer_id, WriterInfo::new(writer_id, now));
        true
    }

    /// Returns `false` if the writer is no longer associated.
    pub(crate) fn set_publication_handle(&mut self, writer_id: &GUID, handle: InstanceHandle) -> bool {
        match self.writers.get_mut(writer_id) {
            Some(info) => {
                info.publication_handle = handle;
                true
            }
            None => false,
        }
    }

    /// The writer stopped writing every instance it had registered.
    pub(crate) fn release_writer_instances(&mut self, writer_id: &GUID) {
        for instance in self.instances.values_mut() {
            if instance.state.release_writer(writer_id) {
                log::debug!(
                    "[reader] instance {:?} has no writers left",
                    instance.handle
                );
            }
        }
    }

    // ========================================================================
    // Samples
    // ========================================================================

    /// Store a data or registration sample. Returns `true` if it was stored.
    pub(crate) fn store_sample(
        &mut self,
        sample: ReceivedDataSample,
        now: SystemTime,
        lifespan: &LifespanChecker,
        outbox: &mut Outbox<'_>,
    ) -> bool {
        let ReceivedDataSample { header, payload } = sample;

        if lifespan.is_expired(header.source_timestamp, now) {
            log::trace!(
                "[reader] dropping expired sample seq={} from {}",
                header.sequence,
                header.writer_id
            );
            return false;
        }

        let (lost, publication_handle) = match self.writers.get_mut(&header.writer_id) {
            Some(info) => (
                info.record_sequence(header.sequence),
                info.publication_handle,
            ),
            None => (0, InstanceHandle::NIL),
        };
        if lost > 0 {
            self.record_lost(lost, outbox);
        }

        let existing = self.keys.get(&header.key).copied();
        if existing.is_none() && self.instances.len() >= self.qos.resource_limits.max_instances {
            log::warn!(
                "[reader] max_instances={} reached, rejecting sample",
                self.qos.resource_limits.max_instances
            );
            self.reject(SampleRejectedReason::InstanceLimit, InstanceHandle::NIL, outbox);
            return false;
        }

        // The slot is reserved before a new instance exists so a rejected
        // sample leaves no trace.
        let Some(allocator) = self.allocator.as_ref() else {
            return false;
        };
        if let Some(instance) = existing.and_then(|handle| self.instances.get_mut(&handle)) {
            instance.history.make_room(self.depth);
        }
        let Some(chunk) = allocator.try_allocate() else {
            log::warn!(
                "[reader] sample allocator exhausted ({}/{}), rejecting sample",
                allocator.in_use(),
                allocator.capacity()
            );
            self.reject(
                SampleRejectedReason::ResourceLimit,
                existing.unwrap_or(InstanceHandle::NIL),
                outbox,
            );
            return false;
        };

        let handle = match existing {
            Some(handle) => handle,
            None => self.create_instance(header.key, now, outbox),
        };
        let deadline = self.qos.deadline;
        let Some(instance) = self.instances.get_mut(&handle) else {
            return false;
        };

        if instance.state.register(header.writer_id) {
            log::debug!("[reader] instance {:?} is alive again", handle);
        }
        instance.deadline.on_sample(now);
        let due = instance.deadline.due_at(&deadline);

        let valid_data = header.kind == MessageKind::Data;
        let payload = if valid_data { payload } else { Vec::new() };
        instance.history.push(ReceivedDataElement::new(
            payload,
            chunk,
            valid_data,
            header.source_timestamp,
            publication_handle,
            instance.state.generation_counts(),
        ));

        self.arm_deadline(due, outbox);
        outbox.data_available();
        true
    }

    pub(crate) fn dispose_instance(&mut self, key: &InstanceKey) {
        let Some(instance) = self.instance_by_key_mut(key) else {
            log::debug!("[reader] dispose for unknown instance");
            return;
        };
        if instance.state.dispose() {
            log::debug!("[reader] instance {:?} disposed", instance.handle);
        }
    }

    pub(crate) fn unregister_instance(&mut self, key: &InstanceKey, writer_id: &GUID) {
        let Some(instance) = self.instance_by_key_mut(key) else {
            log::debug!("[reader] unregister for unknown instance");
            return;
        };
        if instance.state.release_writer(writer_id) {
            log::debug!(
                "[reader] instance {:?} has no writers left",
                instance.handle
            );
        }
    }

    fn instance_by_key_mut(&mut self, key: &InstanceKey) -> Option<&mut SubscriptionInstance> {
        let handle = self.keys.get(key)?;
        self.instances.get_mut(handle)
    }

    pub(crate) fn lookup_instance(&self, key: &InstanceKey) -> Option<InstanceHandle> {
        self.keys.get(key).copied()
    }

    fn create_instance(
        &mut self,
        key: InstanceKey,
        now: SystemTime,
        outbox: &mut Outbox<'_>,
    ) -> InstanceHandle {
        let handle = InstanceHandle::new(self.next_instance);
        self.next_instance += 1;

        let instance = SubscriptionInstance::new(handle, key, now);
        let due = instance.deadline.due_at(&self.qos.deadline);
        self.instances.insert(handle, instance);
        self.keys.insert(key, handle);
        log::debug!("[reader] new instance {:?}", handle);

        self.arm_deadline(due, outbox);
        handle
    }

    /// Pull the deadline timer in to `due` if nothing earlier is armed.
    fn arm_deadline(&mut self, due: Option<SystemTime>, outbox: &mut Outbox<'_>) {
        let Some(due) = due else {
            return;
        };
        if self.deadline_armed.map_or(true, |armed| due < armed) {
            self.deadline_armed = Some(due);
            outbox.schedule(TimerKind::Deadline, Some(due));
        }
    }

    /// Drop an empty instance. Fails while it still holds samples.
    pub(crate) fn release_instance(&mut self, handle: InstanceHandle) -> Result<()> {
        let Some(instance) = self.instances.get(&handle) else {
            log::warn!("[reader] release of unknown instance {:?}", handle);
            return Err(Error::BadParameter(format!(
                "unknown instance {:?}",
                handle
            )));
        };
        if !instance.history.is_empty() {
            return Err(Error::PreconditionNotMet(format!(
                "instance {:?} still holds {} sample(s), {} loaned",
                handle,
                instance.history.len(),
                instance.history.loan_count()
            )));
        }
        let key = instance.key;
        self.instances.remove(&handle);
        self.keys.remove(&key);
        log::debug!("[reader] released instance {:?}", handle);
        Ok(())
    }

    // ========================================================================
    // Statuses
    // ========================================================================

    fn record_lost(&mut self, lost: u32, outbox: &mut Outbox<'_>) {
        let status = &mut self.statuses.sample_lost;
        status.total_count = status.total_count.saturating_add(lost);
        status.total_count_change = status
            .total_count_change
            .saturating_add(i32::try_from(lost).unwrap_or(i32::MAX));
        log::debug!("[reader] {} sample(s) lost", lost);
        outbox.raise(status);
    }

    fn reject(
        &mut self,
        reason: SampleRejectedReason,
        handle: InstanceHandle,
        outbox: &mut Outbox<'_>,
    ) {
        let status = &mut self.statuses.sample_rejected;
        status.total_count = status.total_count.saturating_add(1);
        status.total_count_change += 1;
        status.last_reason = reason;
        status.last_instance_handle = handle;
        outbox.raise(status);
    }

    // ========================================================================
    // Deadline
    // ========================================================================

    /// Report instances whose deadline window closed and re-arm for the
    /// earliest remaining window.
    pub(crate) fn check_deadlines(&mut self, now: SystemTime, outbox: &mut Outbox<'_>) {
        let deadline = self.qos.deadline;
        let mut next: Option<SystemTime> = None;

        for instance in self.instances.values_mut() {
            if !instance.state.state().is_alive() {
                continue;
            }
            if instance.deadline.check(&deadline, now) {
                let status = &mut self.statuses.deadline_missed;
                status.total_count = status.total_count.saturating_add(1);
                status.total_count_change += 1;
                status.last_instance_handle = instance.handle;
                log::debug!(
                    "[reader] deadline missed on instance {:?} ({} so far)",
                    instance.handle,
                    instance.deadline.missed_count()
                );
                outbox.raise(status);
            }
            if let Some(due) = instance.deadline.due_at(&deadline) {
                next = Some(next.map_or(due, |n| n.min(due)));
            }
        }

        self.deadline_armed = next;
        outbox.schedule(TimerKind::Deadline, next);
    }

    /// The deadline period changed: restart every window at `now`.
    pub(crate) fn restart_deadlines(&mut self, now: SystemTime, outbox: &mut Outbox<'_>) {
        for instance in self.instances.values_mut() {
            instance.deadline.on_sample(now);
        }
        self.deadline_armed = None;
        self.check_deadlines(now, outbox);
    }

    // ========================================================================
    // Read / take
    // ========================================================================

    /// Collect samples matching `query`, instance by instance in handle order.
    pub(crate) fn collect(&mut self, query: &ReadQuery) -> Vec<Delivered> {
        let depth = self.depth;
        let mut delivered = Vec::new();
        let mut remaining = query.max_samples;

        let handles: Vec<InstanceHandle> = match query.instance {
            Some(handle) => vec![handle],
            None => self.instances.keys().copied().collect(),
        };

        for handle in handles {
            if remaining == 0 {
                break;
            }
            let Some(instance) = self.instances.get_mut(&handle) else {
                continue;
            };
            instance.history.enforce_depth(depth);

            let view = instance.state.view();
            let state = instance.state.state();
            if !query.view_states.contains(view.mask())
                || !query.instance_states.contains(state.mask())
            {
                continue;
            }

            let indices = instance.history.select(query.sample_states, remaining);
            if indices.is_empty() {
                continue;
            }

            let most_recent = instance.history.newest_generation().unwrap_or(0);
            let mut infos: Vec<SampleInfo> = indices
                .iter()
                .filter_map(|&i| instance.history.get(i))
                .map(|element| SampleInfo {
                    sample_state: element.sample_state,
                    view_state: view,
                    instance_state: state,
                    source_timestamp: element.source_timestamp,
                    instance_handle: handle,
                    publication_handle: element.publication_handle,
                    disposed_generation_count: element.disposed_generation_count,
                    no_writers_generation_count: element.no_writers_generation_count,
                    sample_rank: 0,
                    generation_rank: 0,
                    absolute_generation_rank: 0,
                    valid_data: element.valid_data,
                })
                .collect();
            assign_ranks(&mut infos, most_recent);
            remaining = remaining.saturating_sub(infos.len());
            instance.state.mark_viewed();

            match query.mode {
                ReadMode::Take => {
                    let taken = instance.history.remove_indices(&indices);
                    delivered.extend(
                        taken
                            .into_iter()
                            .zip(infos)
                            .map(|(element, info)| Delivered::Copy(element.into_payload(), info)),
                    );
                }
                ReadMode::Read | ReadMode::Loan => {
                    for (&i, info) in indices.iter().zip(infos) {
                        let Some(element) = instance.history.get_mut(i) else {
                            continue;
                        };
                        element.sample_state = SampleState::Read;
                        delivered.push(if query.mode == ReadMode::Loan {
                            Delivered::Loan(element.loan(info, &self.loans))
                        } else {
                            Delivered::Copy(element.payload().to_vec(), info)
                        });
                    }
                }
            }
        }
        delivered
    }

    pub(crate) fn has_sample_states(&self, mask: SampleStateMask) -> bool {
        self.instances.values().any(|instance| {
            instance
                .history
                .iter()
                .any(|s| mask.contains(s.sample_state.mask()))
        })
    }

    pub(crate) fn has_view_states(&self, mask: ViewStateMask) -> bool {
        self.instances
            .values()
            .any(|instance| mask.contains(instance.state.view().mask()))
    }

    pub(crate) fn has_instance_states(&self, mask: InstanceStateMask) -> bool {
        self.instances
            .values()
            .any(|instance| mask.contains(instance.state.state().mask()))
    }

    pub(crate) fn total_samples(&self) -> usize {
        self.instances.values().map(|i| i.history.len()).sum()
    }

    /// Live loans, whether or not their sample is still held.
    pub(crate) fn loaned_samples(&self) -> usize {
        self.loans.outstanding()
    }
}
