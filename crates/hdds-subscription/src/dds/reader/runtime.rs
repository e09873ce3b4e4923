// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::associations::AssociationTable;
use super::builder::ReaderBuilder;
use super::cache::SampleLoan;
use super::sample::{InstanceStateKind, MessageKind, ReceivedDataSample, SampleInfo};
use super::state::{Delivered, ReadMode, ReadQuery, ReaderState};
use super::status::{lost_status, CommunicationStatus, ListenerEvent, ListenerSlot, Outbox};
use super::timer::{ReaderTimer, TimerKind, TimerTarget};
use super::writer_info::WriterState;
use crate::config::ReaderConfig;
use crate::core::GUID;
use crate::dds::condition::{StatusChanges, StatusMask};
use crate::dds::handle::{InstanceHandle, InstanceHandleAllocator, InstanceKey};
use crate::dds::listener::{
    DataReaderListener, IncompatibleQosStatus, LivelinessChangedStatus,
    RequestedDeadlineMissedStatus, RequestedIncompatibleQosStatus, SampleLostStatus,
    SampleRejectedStatus, SubscriptionMatchedStatus,
};
use crate::dds::read_condition::{InstanceStateMask, SampleStateMask, ViewStateMask};
use crate::dds::subscriber::{Subscriber, WriterAssociation};
use crate::dds::topic::Topic;
use crate::dds::{Error, Result};
use crate::qos::{LifespanChecker, ReaderQos};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Reader-side delivery engine for one subscription.
///
/// A `DataReader` tracks the writers matched to it, supervises their
/// liveliness, keeps per-instance sample history and aggregates
/// communication statuses. The transport feeds it through
/// [`data_received`](Self::data_received); discovery through
/// [`add_associations`](Self::add_associations) and
/// [`remove_associations`](Self::remove_associations).
///
/// # Example
///
/// ```rust
/// use hdds_subscription::{
///     DataReader, DetachedSubscriber, ReaderQos, ReceivedDataSample, TopicDescription,
///     WriterAssociation, GUID,
/// };
/// use std::sync::Arc;
///
/// # fn main() -> hdds_subscription::Result<()> {
/// let topic = Arc::new(TopicDescription::new("sensors/temp", "Temperature", 1));
/// let reader = DataReader::builder(topic, Arc::new(DetachedSubscriber))
///     .qos(ReaderQos::default().keep_last(2))
///     .build()?;
/// reader.enable()?;
///
/// let writer = GUID::new([1; 12], [0, 0, 1, 2]);
/// reader.add_associations(reader.guid(), &[WriterAssociation::new(writer)]);
/// for (seq, payload) in [b"A", b"B", b"C"].into_iter().enumerate() {
///     reader.data_received(ReceivedDataSample::data(writer, [0; 16], seq as u64 + 1, payload.to_vec()));
/// }
///
/// let samples = reader.take_any(10)?;
/// assert_eq!(samples.len(), 2);
/// assert_eq!(samples[0].0, b"B");
/// assert_eq!(samples[0].1.sample_rank, 1);
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// All operations take `&self` and may run concurrently from transport,
/// discovery, timer and application threads. Listener callbacks run after
/// internal locks are released.
pub struct DataReader {
    pub(super) shared: Arc<ReaderShared>,
}

pub(super) struct ReaderShared {
    guid: GUID,
    config: ReaderConfig,
    topic: Arc<dyn Topic>,
    subscriber: Arc<dyn Subscriber>,
    handles: Arc<dyn InstanceHandleAllocator>,
    listener: Mutex<ListenerSlot>,
    /// Lock order: `assoc` before `state`.
    assoc: Mutex<AssociationTable>,
    pub(super) state: Mutex<ReaderState>,
    changes: StatusChanges,
    pub(super) timer: ReaderTimer,
    enabled: AtomicBool,
    deleted: AtomicBool,
}

impl ReaderShared {
    fn outbox(&self) -> Outbox<'_> {
        Outbox::new(
            self.listener.lock().clone(),
            self.subscriber.as_ref(),
            &self.changes,
        )
    }

    /// Forward timer requests. Called with the state lock held so concurrent
    /// operations cannot reorder arm/disarm.
    fn apply_timers(&self, outbox: &mut Outbox<'_>) {
        let now = self.config.now();
        for (kind, due) in outbox.take_timers() {
            match due {
                Some(at) => {
                    let delay = at.duration_since(now).unwrap_or(Duration::ZERO);
                    self.timer.arm(kind, delay);
                }
                None => self.timer.cancel(kind),
            }
        }
    }

    /// Run deferred notifications. No lock may be held.
    fn finish(&self, outbox: Outbox<'_>) {
        if outbox.data_stored() {
            self.subscriber.data_received(self.guid);
        }
        outbox.dispatch();
    }

    fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    fn check_liveliness(&self) {
        if self.is_deleted() {
            return;
        }
        let mut outbox = self.outbox();
        {
            let mut state = self.state.lock();
            let now = self.config.now();
            state.check_liveliness(now, &mut outbox);
            self.apply_timers(&mut outbox);
        }
        self.finish(outbox);
    }

    fn check_deadlines(&self) {
        if self.is_deleted() {
            return;
        }
        let mut outbox = self.outbox();
        {
            let mut state = self.state.lock();
            let now = self.config.now();
            state.check_deadlines(now, &mut outbox);
            self.apply_timers(&mut outbox);
        }
        self.finish(outbox);
    }

    fn shutdown(&self) {
        self.deleted.store(true, Ordering::Release);
        self.timer.shutdown();
    }
}

impl TimerTarget for ReaderShared {
    fn on_timer(&self, kind: TimerKind) {
        match kind {
            TimerKind::Liveliness => self.check_liveliness(),
            TimerKind::Deadline => self.check_deadlines(),
        }
    }
}

/// Copy of `status` for a getter; the deltas restart from zero.
fn snapshot<S: CommunicationStatus>(changes: &StatusChanges, status: &mut S) -> S {
    let current = status.clone();
    status.reset_changes();
    changes.clear(S::KIND);
    current
}

fn copies(delivered: Vec<Delivered>) -> Vec<(Vec<u8>, SampleInfo)> {
    delivered
        .into_iter()
        .filter_map(|d| match d {
            Delivered::Copy(payload, info) => Some((payload, info)),
            Delivered::Loan(_) => None,
        })
        .collect()
}

impl DataReader {
    /// Start configuring a reader on `topic`, owned by `subscriber`.
    pub fn builder(topic: Arc<dyn Topic>, subscriber: Arc<dyn Subscriber>) -> ReaderBuilder {
        ReaderBuilder::new(topic, subscriber)
    }

    pub(super) fn new(
        guid: GUID,
        qos: ReaderQos,
        config: ReaderConfig,
        topic: Arc<dyn Topic>,
        subscriber: Arc<dyn Subscriber>,
        handles: Arc<dyn InstanceHandleAllocator>,
        listener: ListenerSlot,
    ) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<ReaderShared>| {
            let target: Weak<dyn TimerTarget> = weak.clone();
            let timer = ReaderTimer::new(config.timer_thread_name.clone(), target);
            ReaderShared {
                guid,
                config,
                topic,
                subscriber,
                handles,
                listener: Mutex::new(listener),
                assoc: Mutex::new(AssociationTable::default()),
                state: Mutex::new(ReaderState::new(qos)),
                changes: StatusChanges::default(),
                timer,
                enabled: AtomicBool::new(false),
                deleted: AtomicBool::new(false),
            }
        });
        Self { shared }
    }

    #[must_use]
    pub fn guid(&self) -> GUID {
        self.shared.guid
    }

    #[must_use]
    pub fn topic_name(&self) -> &str {
        self.shared.topic.name()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Freeze the immutable QoS, size the sample allocator and announce the
    /// reader to its subscriber. Idempotent.
    pub fn enable(&self) -> Result<()> {
        let s = &*self.shared;
        if s.is_deleted() {
            return Err(Error::AlreadyDeleted);
        }
        if s.enabled.load(Ordering::Acquire) {
            return Ok(());
        }
        s.state.lock().configure(s.config.default_n_chunks);
        s.subscriber
            .reader_enabled(s.guid, s.topic.name(), s.topic.id())?;
        s.enabled.store(true, Ordering::Release);
        log::debug!(
            "[reader] {} enabled on topic '{}'",
            s.guid,
            s.topic.name()
        );
        Ok(())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Stop the timer and drop every association. Further samples and
    /// associations are ignored.
    pub fn cleanup(&self) {
        let s = &*self.shared;
        if s.deleted.swap(true, Ordering::AcqRel) {
            return;
        }
        s.timer.shutdown();
        self.remove_all_associations();
        log::debug!("[reader] {} cleaned up", s.guid);
    }

    // ========================================================================
    // Associations
    // ========================================================================

    /// Register newly matched writers. Already known writers are skipped.
    pub fn add_associations(&self, reader_id: GUID, writers: &[WriterAssociation]) {
        let s = &*self.shared;
        if s.is_deleted() {
            log::debug!("[reader] add_associations after cleanup ignored");
            return;
        }
        if writers.is_empty() {
            return;
        }
        s.assoc.lock().bind_subscription(reader_id);

        let now = s.config.now();
        let (fresh, qos) = {
            let mut state = s.state.lock();
            let fresh: Vec<WriterAssociation> = writers
                .iter()
                .filter(|w| state.insert_writer(w.writer_id, now))
                .cloned()
                .collect();
            (fresh, state.qos.clone())
        };
        if fresh.is_empty() {
            return;
        }
        log::debug!("[reader] {} matched {} new writer(s)", s.guid, fresh.len());

        s.subscriber.add_associations(s.guid, &fresh, &qos);

        let mut outbox = s.outbox();
        if qos.liveliness.is_supervised() {
            let mut state = s.state.lock();
            state.check_liveliness(now, &mut outbox);
            s.apply_timers(&mut outbox);
        }

        let ids: Vec<GUID> = fresh.iter().map(|w| w.writer_id).collect();
        let handles = s.handles.handles_for(&ids);
        {
            let mut assoc = s.assoc.lock();
            let mut state = s.state.lock();
            let mut bound = false;
            for (id, handle) in ids.iter().zip(handles) {
                match handle {
                    // Skip writers removed while the subscriber was being called.
                    Some(handle) if state.set_publication_handle(id, handle) => {
                        assoc.bind(*id, handle);
                        bound = true;
                    }
                    Some(_) => {}
                    None => log::warn!("[reader] no publication handle for writer {}", id),
                }
            }
            drop(state);
            if bound {
                outbox.raise(&mut assoc.matched);
            }
        }
        s.finish(outbox);
    }

    /// Unmatch `writers`. With `notify_lost`, the reader's own listener gets
    /// `on_subscription_lost` for the removed publications.
    pub fn remove_associations(&self, writers: &[GUID], notify_lost: bool) {
        let s = &*self.shared;
        let mut outbox = s.outbox();
        let removed: Vec<GUID> = {
            let mut assoc = s.assoc.lock();
            let removed: Vec<GUID> = {
                let mut state = s.state.lock();
                let removed: Vec<GUID> = writers
                    .iter()
                    .filter(|id| state.writer_removed(id, &mut outbox))
                    .copied()
                    .collect();
                if !removed.is_empty() {
                    state.check_liveliness(s.config.now(), &mut outbox);
                    s.apply_timers(&mut outbox);
                }
                removed
            };
            if removed.is_empty() {
                return;
            }

            let handles: Vec<InstanceHandle> =
                removed.iter().filter_map(|id| assoc.unbind(id)).collect();
            if !handles.is_empty() {
                outbox.raise(&mut assoc.matched);
            }
            if notify_lost {
                outbox.notify_own(ListenerEvent::SubscriptionLost(lost_status(handles)));
            }
            removed
        };

        log::debug!("[reader] {} unmatched {} writer(s)", s.guid, removed.len());
        s.subscriber.remove_associations(&removed, s.guid);
        s.finish(outbox);
    }

    /// Unmatch every writer without a loss notification.
    pub fn remove_all_associations(&self) {
        let ids: Vec<GUID> = self.shared.state.lock().writers.keys().copied().collect();
        if ids.is_empty() {
            return;
        }
        self.remove_associations(&ids, false);
    }

    /// Liveliness state of a matched writer.
    #[must_use]
    pub fn writer_state(&self, writer_id: &GUID) -> Option<WriterState> {
        self.shared
            .state
            .lock()
            .writers
            .get(writer_id)
            .map(|info| info.state)
    }

    /// Handles of every currently matched publication.
    pub fn get_matched_publications(&self) -> Result<Vec<InstanceHandle>> {
        if !self.is_enabled() {
            return Err(Error::NotEnabled);
        }
        Ok(self.shared.assoc.lock().publication_handles().to_vec())
    }

    // ========================================================================
    // Incoming messages
    // ========================================================================

    /// Entry point for every message the transport delivers to this reader.
    pub fn data_received(&self, sample: ReceivedDataSample) {
        let s = &*self.shared;
        if s.is_deleted() {
            log::trace!("[reader] sample after cleanup dropped");
            return;
        }
        if !self.is_enabled() {
            log::debug!("[reader] sample before enable dropped");
            return;
        }

        let lifespan = LifespanChecker::new(s.topic.lifespan());
        let mut outbox = s.outbox();
        {
            let mut state = s.state.lock();
            let now = s.config.now();
            let writer_id = sample.header.writer_id;
            state.writer_activity(&writer_id, now, &mut outbox);

            match sample.header.kind {
                MessageKind::Data | MessageKind::Registration => {
                    state.store_sample(sample, now, &lifespan, &mut outbox);
                }
                MessageKind::WriterLiveliness => {}
                MessageKind::Dispose => state.dispose_instance(&sample.header.key),
                MessageKind::Unregister => {
                    state.unregister_instance(&sample.header.key, &writer_id);
                }
            }
            s.apply_timers(&mut outbox);
        }
        s.finish(outbox);
    }

    // ========================================================================
    // Read / take
    // ========================================================================

    fn collect(&self, query: ReadQuery) -> Result<Vec<Delivered>> {
        let s = &*self.shared;
        if s.is_deleted() {
            return Err(Error::AlreadyDeleted);
        }
        if !self.is_enabled() {
            return Err(Error::NotEnabled);
        }
        let delivered = {
            let mut state = s.state.lock();
            if let Some(handle) = query.instance {
                if !state.instances.contains_key(&handle) {
                    return Err(Error::BadParameter(format!(
                        "unknown instance {:?}",
                        handle
                    )));
                }
            }
            state.collect(&query)
        };
        s.changes.clear(StatusMask::DATA_AVAILABLE);
        Ok(delivered)
    }

    /// Copy out up to `max_samples` matching samples and mark them read.
    pub fn read(
        &self,
        max_samples: usize,
        sample_states: SampleStateMask,
        view_states: ViewStateMask,
        instance_states: InstanceStateMask,
    ) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery {
            max_samples,
            sample_states,
            view_states,
            instance_states,
            instance: None,
            mode: ReadMode::Read,
        })
        .map(copies)
    }

    /// Remove up to `max_samples` matching samples from the history.
    pub fn take(
        &self,
        max_samples: usize,
        sample_states: SampleStateMask,
        view_states: ViewStateMask,
        instance_states: InstanceStateMask,
    ) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery {
            max_samples,
            sample_states,
            view_states,
            instance_states,
            instance: None,
            mode: ReadMode::Take,
        })
        .map(copies)
    }

    pub fn read_any(&self, max_samples: usize) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery::any(max_samples, ReadMode::Read))
            .map(copies)
    }

    pub fn take_any(&self, max_samples: usize) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery::any(max_samples, ReadMode::Take))
            .map(copies)
    }

    /// [`read`](Self::read) restricted to one instance.
    pub fn read_instance(
        &self,
        handle: InstanceHandle,
        max_samples: usize,
        sample_states: SampleStateMask,
        view_states: ViewStateMask,
        instance_states: InstanceStateMask,
    ) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery {
            max_samples,
            sample_states,
            view_states,
            instance_states,
            instance: Some(handle),
            mode: ReadMode::Read,
        })
        .map(copies)
    }

    /// [`take`](Self::take) restricted to one instance.
    pub fn take_instance(
        &self,
        handle: InstanceHandle,
        max_samples: usize,
        sample_states: SampleStateMask,
        view_states: ViewStateMask,
        instance_states: InstanceStateMask,
    ) -> Result<Vec<(Vec<u8>, SampleInfo)>> {
        self.collect(ReadQuery {
            max_samples,
            sample_states,
            view_states,
            instance_states,
            instance: Some(handle),
            mode: ReadMode::Take,
        })
        .map(copies)
    }

    /// Oldest sample not read yet, across all instances.
    pub fn read_next_sample(&self) -> Result<Option<(Vec<u8>, SampleInfo)>> {
        let mut query = ReadQuery::any(1, ReadMode::Read);
        query.sample_states = SampleStateMask::NOT_READ;
        Ok(self.collect(query).map(copies)?.into_iter().next())
    }

    pub fn take_next_sample(&self) -> Result<Option<(Vec<u8>, SampleInfo)>> {
        let mut query = ReadQuery::any(1, ReadMode::Take);
        query.sample_states = SampleStateMask::NOT_READ;
        Ok(self.collect(query).map(copies)?.into_iter().next())
    }

    /// Zero-copy read. Each loan pins its sample until dropped.
    pub fn read_w_loan(
        &self,
        max_samples: usize,
        sample_states: SampleStateMask,
        view_states: ViewStateMask,
        instance_states: InstanceStateMask,
    ) -> Result<Vec<SampleLoan>> {
        let delivered = self.collect(ReadQuery {
            max_samples,
            sample_states,
            view_states,
            instance_states,
            instance: None,
            mode: ReadMode::Loan,
        })?;
        Ok(delivered
            .into_iter()
            .filter_map(|d| match d {
                Delivered::Loan(loan) => Some(loan),
                Delivered::Copy(..) => None,
            })
            .collect())
    }

    // ========================================================================
    // Instances
    // ========================================================================

    #[must_use]
    pub fn lookup_instance(&self, key: impl Into<InstanceKey>) -> Option<InstanceHandle> {
        self.shared.state.lock().lookup_instance(&key.into())
    }

    #[must_use]
    pub fn instance_state(&self, handle: InstanceHandle) -> Option<InstanceStateKind> {
        self.shared
            .state
            .lock()
            .instances
            .get(&handle)
            .map(|instance| instance.state.state())
    }

    /// Forget an instance that holds no samples.
    pub fn release_instance(&self, handle: InstanceHandle) -> Result<()> {
        self.shared.state.lock().release_instance(handle)
    }

    #[must_use]
    pub fn have_sample_states(&self, mask: SampleStateMask) -> bool {
        self.shared.state.lock().has_sample_states(mask)
    }

    #[must_use]
    pub fn have_view_states(&self, mask: ViewStateMask) -> bool {
        self.shared.state.lock().has_view_states(mask)
    }

    #[must_use]
    pub fn have_instance_states(&self, mask: InstanceStateMask) -> bool {
        self.shared.state.lock().has_instance_states(mask)
    }

    /// Samples currently held across all instances.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.shared.state.lock().total_samples()
    }

    /// Outstanding zero-copy loans.
    #[must_use]
    pub fn num_zero_copies(&self) -> usize {
        self.shared.state.lock().loaned_samples()
    }

    // ========================================================================
    // Statuses
    // ========================================================================

    pub fn get_subscription_matched_status(&self) -> SubscriptionMatchedStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.assoc.lock().matched)
    }

    pub fn get_requested_incompatible_qos_status(&self) -> RequestedIncompatibleQosStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.assoc.lock().incompatible_qos)
    }

    pub fn get_liveliness_changed_status(&self) -> LivelinessChangedStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.state.lock().statuses.liveliness)
    }

    pub fn get_sample_lost_status(&self) -> SampleLostStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.state.lock().statuses.sample_lost)
    }

    pub fn get_sample_rejected_status(&self) -> SampleRejectedStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.state.lock().statuses.sample_rejected)
    }

    pub fn get_requested_deadline_missed_status(&self) -> RequestedDeadlineMissedStatus {
        let s = &*self.shared;
        snapshot(&s.changes, &mut s.state.lock().statuses.deadline_missed)
    }

    /// Kinds changed since their last getter call.
    #[must_use]
    pub fn get_status_changes(&self) -> StatusMask {
        self.shared.changes.get()
    }

    /// Incompatible offer reported by discovery for this reader.
    pub fn update_incompatible_qos(&self, report: &IncompatibleQosStatus) {
        let s = &*self.shared;
        let mut outbox = s.outbox();
        {
            let mut assoc = s.assoc.lock();
            let status = &mut assoc.incompatible_qos;
            status.total_count = report.total_count;
            status.total_count_change = status
                .total_count_change
                .saturating_add(i32::try_from(report.count_since_last_send).unwrap_or(i32::MAX));
            status.last_policy_id = report.last_policy_id;
            status.policies = report.policies.clone();
            outbox.raise(status);
        }
        s.finish(outbox);
    }

    // ========================================================================
    // Connection events
    // ========================================================================

    fn notify_connection(&self, writers: &[GUID], event: fn(Vec<InstanceHandle>) -> ListenerEvent) {
        let s = &*self.shared;
        let handles: Vec<InstanceHandle> = {
            let assoc = s.assoc.lock();
            writers.iter().filter_map(|id| assoc.handle_of(id)).collect()
        };
        let mut outbox = s.outbox();
        outbox.notify_own(event(handles));
        s.finish(outbox);
    }

    pub fn notify_subscription_disconnected(&self, writers: &[GUID]) {
        self.notify_connection(writers, |handles| {
            ListenerEvent::SubscriptionDisconnected(lost_status(handles))
        });
    }

    pub fn notify_subscription_reconnected(&self, writers: &[GUID]) {
        self.notify_connection(writers, |handles| {
            ListenerEvent::SubscriptionReconnected(lost_status(handles))
        });
    }

    pub fn notify_connection_deleted(&self) {
        let s = &*self.shared;
        let mut outbox = s.outbox();
        outbox.notify_own(ListenerEvent::ConnectionDeleted);
        s.finish(outbox);
    }

    // ========================================================================
    // Listener / QoS
    // ========================================================================

    /// Install (or clear) the reader's listener. Kinds outside `mask` fall
    /// back to the subscriber's listener.
    pub fn set_listener(&self, listener: Option<Arc<dyn DataReaderListener>>, mask: StatusMask) {
        *self.shared.listener.lock() = ListenerSlot { listener, mask };
    }

    #[must_use]
    pub fn get_listener(&self) -> Option<Arc<dyn DataReaderListener>> {
        self.shared.listener.lock().listener.clone()
    }

    #[must_use]
    pub fn get_qos(&self) -> ReaderQos {
        self.shared.state.lock().qos.clone()
    }

    /// Replace the QoS. Once enabled, only changeable policies may differ.
    pub fn set_qos(&self, qos: ReaderQos) -> Result<()> {
        qos.validate().map_err(Error::InconsistentPolicy)?;
        let s = &*self.shared;
        let enabled = self.is_enabled();
        let mut outbox = s.outbox();
        {
            let mut state = s.state.lock();
            if state.qos == qos {
                return Ok(());
            }
            if enabled {
                state
                    .qos
                    .check_changeable(&qos)
                    .map_err(Error::ImmutablePolicy)?;
            }
            let deadline_changed = state.qos.deadline != qos.deadline;
            state.qos = qos;
            if enabled && deadline_changed {
                state.restart_deadlines(s.config.now(), &mut outbox);
                s.apply_timers(&mut outbox);
            }
        }
        s.finish(outbox);
        Ok(())
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Expire writers whose lease ran out. Normally driven by the timer.
    pub fn check_liveliness(&self) {
        self.shared.check_liveliness();
    }

    /// Report instances whose deadline passed. Normally driven by the timer.
    pub fn check_deadlines(&self) {
        self.shared.check_deadlines();
    }
}

impl Drop for DataReader {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

impl std::fmt::Debug for DataReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataReader")
            .field("guid", &self.shared.guid)
            .field("topic", &self.shared.topic.name())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
