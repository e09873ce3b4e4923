// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Status aggregation and listener dispatch.
//!
//! State changes are recorded while the reader's locks are held. Each change
//! marks the status kind as changed and, when a listener is resolved for the
//! kind, queues a snapshot in an [`Outbox`]. The outbox is dispatched after
//! every lock is released, so a callback may re-enter the reader.
//!
//! Listener resolution per kind: the reader's own listener when its mask
//! contains the kind, otherwise whatever the subscriber provides for it.

use super::timer::TimerKind;
use crate::dds::condition::{StatusChanges, StatusMask};
use crate::dds::handle::InstanceHandle;
use crate::dds::listener::{
    DataReaderListener, LivelinessChangedStatus, RequestedDeadlineMissedStatus,
    RequestedIncompatibleQosStatus, SampleLostStatus, SampleRejectedStatus,
    SubscriptionLostStatus, SubscriptionMatchedStatus,
};
use crate::dds::subscriber::Subscriber;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

/// A status record with a changed bit and resettable deltas.
pub(crate) trait CommunicationStatus: Clone {
    const KIND: StatusMask;

    /// Zero the `*_change` fields after delivery.
    fn reset_changes(&mut self);

    fn into_event(self) -> ListenerEvent;
}

impl CommunicationStatus for SubscriptionMatchedStatus {
    const KIND: StatusMask = StatusMask::SUBSCRIPTION_MATCHED;

    fn reset_changes(&mut self) {
        self.total_count_change = 0;
        self.current_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::SubscriptionMatched(self)
    }
}

impl CommunicationStatus for LivelinessChangedStatus {
    const KIND: StatusMask = StatusMask::LIVELINESS_CHANGED;

    fn reset_changes(&mut self) {
        self.alive_count_change = 0;
        self.not_alive_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::LivelinessChanged(self)
    }
}

impl CommunicationStatus for SampleLostStatus {
    const KIND: StatusMask = StatusMask::SAMPLE_LOST;

    fn reset_changes(&mut self) {
        self.total_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::SampleLost(self)
    }
}

impl CommunicationStatus for SampleRejectedStatus {
    const KIND: StatusMask = StatusMask::SAMPLE_REJECTED;

    fn reset_changes(&mut self) {
        self.total_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::SampleRejected(self)
    }
}

impl CommunicationStatus for RequestedDeadlineMissedStatus {
    const KIND: StatusMask = StatusMask::REQUESTED_DEADLINE_MISSED;

    fn reset_changes(&mut self) {
        self.total_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::RequestedDeadlineMissed(self)
    }
}

impl CommunicationStatus for RequestedIncompatibleQosStatus {
    const KIND: StatusMask = StatusMask::REQUESTED_INCOMPATIBLE_QOS;

    fn reset_changes(&mut self) {
        self.total_count_change = 0;
    }

    fn into_event(self) -> ListenerEvent {
        ListenerEvent::RequestedIncompatibleQos(self)
    }
}

/// A queued listener callback.
#[derive(Debug, Clone)]
pub(crate) enum ListenerEvent {
    DataAvailable,
    SubscriptionMatched(SubscriptionMatchedStatus),
    LivelinessChanged(LivelinessChangedStatus),
    SampleLost(SampleLostStatus),
    SampleRejected(SampleRejectedStatus),
    RequestedDeadlineMissed(RequestedDeadlineMissedStatus),
    RequestedIncompatibleQos(RequestedIncompatibleQosStatus),
    SubscriptionLost(SubscriptionLostStatus),
    SubscriptionDisconnected(SubscriptionLostStatus),
    SubscriptionReconnected(SubscriptionLostStatus),
    ConnectionDeleted,
}

impl ListenerEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::DataAvailable => "on_data_available",
            Self::SubscriptionMatched(_) => "on_subscription_matched",
            Self::LivelinessChanged(_) => "on_liveliness_changed",
            Self::SampleLost(_) => "on_sample_lost",
            Self::SampleRejected(_) => "on_sample_rejected",
            Self::RequestedDeadlineMissed(_) => "on_requested_deadline_missed",
            Self::RequestedIncompatibleQos(_) => "on_requested_incompatible_qos",
            Self::SubscriptionLost(_) => "on_subscription_lost",
            Self::SubscriptionDisconnected(_) => "on_subscription_disconnected",
            Self::SubscriptionReconnected(_) => "on_subscription_reconnected",
            Self::ConnectionDeleted => "on_connection_deleted",
        }
    }

    fn deliver(self, listener: &dyn DataReaderListener) {
        match self {
            Self::DataAvailable => listener.on_data_available(),
            Self::SubscriptionMatched(s) => listener.on_subscription_matched(s),
            Self::LivelinessChanged(s) => listener.on_liveliness_changed(s),
            Self::SampleLost(s) => listener.on_sample_lost(s),
            Self::SampleRejected(s) => listener.on_sample_rejected(s),
            Self::RequestedDeadlineMissed(s) => listener.on_requested_deadline_missed(s),
            Self::RequestedIncompatibleQos(s) => listener.on_requested_incompatible_qos(s),
            Self::SubscriptionLost(s) => listener.on_subscription_lost(s),
            Self::SubscriptionDisconnected(s) => listener.on_subscription_disconnected(s),
            Self::SubscriptionReconnected(s) => listener.on_subscription_reconnected(s),
            Self::ConnectionDeleted => listener.on_connection_deleted(),
        }
    }
}

/// Status records guarded by the reader state lock.
#[derive(Debug, Default)]
pub(crate) struct ReaderStatuses {
    pub(crate) liveliness: LivelinessChangedStatus,
    pub(crate) sample_lost: SampleLostStatus,
    pub(crate) sample_rejected: SampleRejectedStatus,
    pub(crate) deadline_missed: RequestedDeadlineMissedStatus,
}

/// The reader's own listener and the kinds it wants.
#[derive(Clone)]
pub(crate) struct ListenerSlot {
    pub(crate) listener: Option<Arc<dyn DataReaderListener>>,
    pub(crate) mask: StatusMask,
}

impl Default for ListenerSlot {
    fn default() -> Self {
        Self {
            listener: None,
            mask: StatusMask::NONE,
        }
    }
}

/// Side effects collected under the reader locks.
///
/// Timer requests are applied before the state lock is released; listener
/// callbacks and the subscriber notification run after.
pub(crate) struct Outbox<'a> {
    slot: ListenerSlot,
    subscriber: &'a dyn Subscriber,
    changes: &'a StatusChanges,
    pending: Vec<(Arc<dyn DataReaderListener>, ListenerEvent)>,
    timers: Vec<(TimerKind, Option<SystemTime>)>,
    data_stored: bool,
}

impl<'a> Outbox<'a> {
    pub(crate) fn new(
        slot: ListenerSlot,
        subscriber: &'a dyn Subscriber,
        changes: &'a StatusChanges,
    ) -> Self {
        Self {
            slot,
            subscriber,
            changes,
            pending: Vec::new(),
            timers: Vec::new(),
            data_stored: false,
        }
    }

    fn resolve(&self, kind: StatusMask) -> Option<Arc<dyn DataReaderListener>> {
        if self.slot.mask.contains(kind) {
            self.slot.listener.clone()
        } else {
            self.subscriber.listener_for(kind)
        }
    }

    /// Mark `status` changed and queue it for its listener.
    ///
    /// When a listener takes the snapshot, the deltas start over from zero;
    /// otherwise they keep accumulating for the next `get_*_status`.
    pub(crate) fn raise<S: CommunicationStatus>(&mut self, status: &mut S) {
        self.changes.set(S::KIND);
        if let Some(listener) = self.resolve(S::KIND) {
            self.pending.push((listener, status.clone().into_event()));
            status.reset_changes();
        }
    }

    /// A sample was stored.
    pub(crate) fn data_available(&mut self) {
        self.changes.set(StatusMask::DATA_AVAILABLE);
        self.data_stored = true;
        if let Some(listener) = self.resolve(StatusMask::DATA_AVAILABLE) {
            self.pending.push((listener, ListenerEvent::DataAvailable));
        }
    }

    /// Connection events only go to the reader's own listener.
    pub(crate) fn notify_own(&mut self, event: ListenerEvent) {
        if let Some(listener) = self.slot.listener.clone() {
            self.pending.push((listener, event));
        }
    }

    /// Arm `kind` at `due`, or disarm it with `None`. The last request wins.
    pub(crate) fn schedule(&mut self, kind: TimerKind, due: Option<SystemTime>) {
        self.timers.retain(|(k, _)| *k != kind);
        self.timers.push((kind, due));
    }

    pub(crate) fn take_timers(&mut self) -> Vec<(TimerKind, Option<SystemTime>)> {
        std::mem::take(&mut self.timers)
    }

    pub(crate) fn data_stored(&self) -> bool {
        self.data_stored
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run queued callbacks. Must be called with no reader lock held.
    pub(crate) fn dispatch(self) {
        for (listener, event) in self.pending {
            let name = event.name();
            let result = catch_unwind(AssertUnwindSafe(|| event.deliver(listener.as_ref())));
            if result.is_err() {
                log::error!("[reader] listener panicked in {}", name);
            }
        }
    }
}

pub(crate) fn lost_status(handles: Vec<InstanceHandle>) -> SubscriptionLostStatus {
    SubscriptionLostStatus {
        publication_handles: handles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GUID;
    use crate::dds::subscriber::{DetachedSubscriber, WriterAssociation};
    use crate::qos::ReaderQos;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Recorder {
        liveliness: Mutex<Vec<LivelinessChangedStatus>>,
        data: AtomicU32,
    }

    impl DataReaderListener for Recorder {
        fn on_data_available(&self) {
            self.data.fetch_add(1, Ordering::SeqCst);
        }

        fn on_liveliness_changed(&self, status: LivelinessChangedStatus) {
            self.liveliness.lock().push(status);
        }
    }

    struct FallbackSubscriber(Arc<Recorder>);

    impl Subscriber for FallbackSubscriber {
        fn add_associations(&self, _: GUID, _: &[WriterAssociation], _: &ReaderQos) {}
        fn remove_associations(&self, _: &[GUID], _: GUID) {}
        fn listener_for(&self, kind: StatusMask) -> Option<Arc<dyn DataReaderListener>> {
            (kind == StatusMask::LIVELINESS_CHANGED)
                .then(|| Arc::clone(&self.0) as Arc<dyn DataReaderListener>)
        }
        fn data_received(&self, _: GUID) {}
    }

    #[test]
    fn test_raise_without_listener_accumulates() {
        let changes = StatusChanges::default();
        let subscriber = DetachedSubscriber;
        let mut outbox = Outbox::new(ListenerSlot::default(), &subscriber, &changes);

        let mut status = LivelinessChangedStatus::default();
        status.alive_count = 1;
        status.alive_count_change = 1;
        outbox.raise(&mut status);

        assert!(outbox.is_empty());
        assert_eq!(status.alive_count_change, 1);
        assert!(changes.get().contains(StatusMask::LIVELINESS_CHANGED));
    }

    #[test]
    fn test_raise_with_own_listener_resets_deltas() {
        let recorder = Arc::new(Recorder::default());
        let changes = StatusChanges::default();
        let subscriber = DetachedSubscriber;
        let slot = ListenerSlot {
            listener: Some(recorder.clone()),
            mask: StatusMask::LIVELINESS_CHANGED,
        };
        let mut outbox = Outbox::new(slot, &subscriber, &changes);

        let mut status = LivelinessChangedStatus::default();
        status.alive_count = 1;
        status.alive_count_change = 1;
        outbox.raise(&mut status);
        outbox.dispatch();

        assert_eq!(status.alive_count_change, 0);
        let seen = recorder.liveliness.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].alive_count_change, 1);
    }

    #[test]
    fn test_mask_miss_falls_back_to_subscriber() {
        let own = Arc::new(Recorder::default());
        let parent = Arc::new(Recorder::default());
        let changes = StatusChanges::default();
        let subscriber = FallbackSubscriber(parent.clone());
        let slot = ListenerSlot {
            listener: Some(own.clone()),
            mask: StatusMask::DATA_AVAILABLE,
        };
        let mut outbox = Outbox::new(slot, &subscriber, &changes);

        outbox.raise(&mut LivelinessChangedStatus::default());
        outbox.data_available();
        assert!(outbox.data_stored());
        outbox.dispatch();

        assert_eq!(parent.liveliness.lock().len(), 1);
        assert!(own.liveliness.lock().is_empty());
        assert_eq!(own.data.load(Ordering::SeqCst), 1);
    }

    struct Panicky;

    impl DataReaderListener for Panicky {
        fn on_data_available(&self) {
            panic!("listener failure");
        }
    }

    #[test]
    fn test_panicking_listener_is_contained() {
        let after = Arc::new(Recorder::default());
        let changes = StatusChanges::default();
        let subscriber = DetachedSubscriber;
        let mut outbox = Outbox::new(
            ListenerSlot {
                listener: Some(Arc::new(Panicky)),
                mask: StatusMask::ALL,
            },
            &subscriber,
            &changes,
        );
        outbox.data_available();
        outbox.pending.push((after.clone(), ListenerEvent::DataAvailable));
        outbox.dispatch();

        assert_eq!(after.data.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_schedule_last_request_wins() {
        let changes = StatusChanges::default();
        let subscriber = DetachedSubscriber;
        let mut outbox = Outbox::new(ListenerSlot::default(), &subscriber, &changes);
        let t = SystemTime::UNIX_EPOCH;

        outbox.schedule(TimerKind::Liveliness, Some(t));
        outbox.schedule(TimerKind::Deadline, Some(t));
        outbox.schedule(TimerKind::Liveliness, None);

        let timers = outbox.take_timers();
        assert_eq!(timers.len(), 2);
        assert!(timers.contains(&(TimerKind::Liveliness, None)));
        assert!(timers.contains(&(TimerKind::Deadline, Some(t))));
        assert!(outbox.take_timers().is_empty());
    }
}
