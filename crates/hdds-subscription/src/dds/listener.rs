// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DataReader listener and communication status types.
//!
//! Listeners provide callback-based notification for reader events. They are
//! an alternative to polling the `get_*_status` accessors; both views are fed
//! from the same status records.
//!
//! # Usage
//!
//! ```
//! use hdds_subscription::{DataReaderListener, LivelinessChangedStatus};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Default)]
//! struct AliveWriters(AtomicU32);
//!
//! impl DataReaderListener for AliveWriters {
//!     fn on_liveliness_changed(&self, status: LivelinessChangedStatus) {
//!         self.0.store(status.alive_count, Ordering::Relaxed);
//!     }
//! }
//! ```
//!
//! # Thread Safety
//!
//! Callbacks run on transport, application or timer threads, always after the
//! reader released its internal locks, so a callback may call back into the
//! reader. They must be `Send + Sync`; a panicking callback is caught and
//! logged.
//!
//! # Deltas
//!
//! Every status carries `*_change` fields counting changes since the last
//! time the status was delivered, either to a listener or to the matching
//! `get_*_status` call. Totals are never reset.

use super::handle::InstanceHandle;

/// Status information for subscription matching events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionMatchedStatus {
    /// Total cumulative count of matched publications.
    pub total_count: u32,
    /// Change in total_count since last delivery.
    pub total_count_change: i32,
    /// Current number of matched publications.
    pub current_count: u32,
    /// Change in current_count since last delivery.
    pub current_count_change: i32,
    /// Handle of the last matched publication.
    pub last_publication_handle: InstanceHandle,
}

/// Status information for liveliness changes of matched writers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivelinessChangedStatus {
    /// Number of matched writers currently alive.
    pub alive_count: u32,
    /// Change in alive_count since last delivery.
    pub alive_count_change: i32,
    /// Number of matched writers that lost liveliness.
    pub not_alive_count: u32,
    /// Change in not_alive_count since last delivery.
    pub not_alive_count_change: i32,
    /// Handle of the last writer whose liveliness changed.
    pub last_publication_handle: InstanceHandle,
}

/// Status information for sample lost events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleLostStatus {
    /// Total cumulative count of lost samples.
    pub total_count: u32,
    /// Change in total_count since last delivery.
    pub total_count_change: i32,
}

/// Reason why a sample was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRejectedReason {
    /// Sample was not rejected.
    #[default]
    NotRejected,
    /// Sample allocator exhausted (max_samples).
    ResourceLimit,
    /// Instance limit reached (max_instances).
    InstanceLimit,
    /// Samples-per-instance limit reached with every sample still loaned.
    SamplesPerInstanceLimit,
}

/// Status information for sample rejected events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRejectedStatus {
    /// Total cumulative count of rejected samples.
    pub total_count: u32,
    /// Change in total_count since last delivery.
    pub total_count_change: i32,
    /// Reason for the last rejection.
    pub last_reason: SampleRejectedReason,
    /// Instance the last rejected sample belonged to (nil if not created).
    pub last_instance_handle: InstanceHandle,
}

/// Status information for deadline missed events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedDeadlineMissedStatus {
    /// Total cumulative count of missed deadlines.
    pub total_count: u32,
    /// Change in total_count since last delivery.
    pub total_count_change: i32,
    /// Handle of the instance that missed the deadline.
    pub last_instance_handle: InstanceHandle,
}

/// Per-policy incompatibility counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QosPolicyCount {
    pub policy_id: u32,
    pub count: u32,
}

/// Status information for incompatible QoS events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedIncompatibleQosStatus {
    /// Total cumulative count of incompatible offers.
    pub total_count: u32,
    /// Change in total_count since last delivery.
    pub total_count_change: i32,
    /// ID of the last incompatible QoS policy.
    pub last_policy_id: u32,
    /// Counts per incompatible policy.
    pub policies: Vec<QosPolicyCount>,
}

/// Incompatibility report pushed by discovery when matching fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncompatibleQosStatus {
    /// Total incompatible offers seen by discovery.
    pub total_count: u32,
    /// Offers since the previous report.
    pub count_since_last_send: u32,
    pub last_policy_id: u32,
    pub policies: Vec<QosPolicyCount>,
}

/// Publications affected by a transport-level connection event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionLostStatus {
    pub publication_handles: Vec<InstanceHandle>,
}

/// Publications whose connection dropped but may come back.
pub type SubscriptionDisconnectedStatus = SubscriptionLostStatus;

/// Publications whose connection was re-established.
pub type SubscriptionReconnectedStatus = SubscriptionLostStatus;

/// Listener for DataReader events.
///
/// All methods have default no-op implementations, so you only need to override
/// the events you care about.
///
/// Which listener receives a communication status is decided per status kind:
/// if the reader's listener mask does not contain the kind, the owning
/// subscriber's listener for that kind is used instead. Connection events
/// (`on_subscription_*`, `on_connection_deleted`) always go to the reader's
/// own listener.
pub trait DataReaderListener: Send + Sync {
    /// New samples are available to read.
    fn on_data_available(&self) {}

    /// The reader matched a new writer or lost one.
    fn on_subscription_matched(&self, status: SubscriptionMatchedStatus) {
        let _ = status;
    }

    /// A matched writer became alive or not alive.
    fn on_liveliness_changed(&self, status: LivelinessChangedStatus) {
        let _ = status;
    }

    /// Samples were lost (gap in a writer's sequence numbers).
    fn on_sample_lost(&self, status: SampleLostStatus) {
        let _ = status;
    }

    /// A sample was rejected because of resource limits.
    fn on_sample_rejected(&self, status: SampleRejectedStatus) {
        let _ = status;
    }

    /// An instance did not receive a sample within the requested deadline.
    fn on_requested_deadline_missed(&self, status: RequestedDeadlineMissedStatus) {
        let _ = status;
    }

    /// A writer offered QoS incompatible with this reader.
    fn on_requested_incompatible_qos(&self, status: RequestedIncompatibleQosStatus) {
        let _ = status;
    }

    /// Writers were removed and the removal was flagged as a loss.
    fn on_subscription_lost(&self, status: SubscriptionLostStatus) {
        let _ = status;
    }

    /// The transport lost its connection to some writers.
    fn on_subscription_disconnected(&self, status: SubscriptionDisconnectedStatus) {
        let _ = status;
    }

    /// The transport re-established its connection to some writers.
    fn on_subscription_reconnected(&self, status: SubscriptionReconnectedStatus) {
        let _ = status;
    }

    /// The transport connection backing this reader was deleted.
    fn on_connection_deleted(&self) {}
}
