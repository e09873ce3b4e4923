// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS Subscription - reader-side delivery engine
//!
//! The state machine behind an HDDS `DataReader`: which writers are matched,
//! which of them are still alive, what each instance looks like, which samples
//! are retained, and which status changes the application has not seen yet.
//!
//! Wire transport, discovery and payload marshaling live elsewhere; they feed
//! this crate through [`DataReader::data_received`] and the association calls,
//! and it talks back through the [`Subscriber`] and [`Topic`] traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdds_subscription::{
//!     DataReader, MessageKind, ReaderQos, ReceivedDataSample, Result, WriterAssociation, GUID,
//! };
//! # fn collaborators() -> (std::sync::Arc<dyn hdds_subscription::Topic>, std::sync::Arc<dyn hdds_subscription::Subscriber>) { unimplemented!() }
//!
//! fn main() -> Result<()> {
//!     let (topic, subscriber) = collaborators();
//!     let reader = DataReader::builder(topic, subscriber)
//!         .qos(ReaderQos::default().keep_last(2))
//!         .build()?;
//!     reader.enable()?;
//!
//!     let writer = GUID::new([1; 12], [0, 0, 1, 2]);
//!     reader.add_associations(reader.guid(), &[WriterAssociation::new(writer)]);
//!     reader.data_received(ReceivedDataSample::data(writer, [0; 16], 1, b"hello".to_vec()));
//!
//!     for (payload, info) in reader.take_any(10)? {
//!         println!("{} bytes, rank {}", payload.len(), info.sample_rank);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! data_received --> writer liveliness --> instance state --> sample history
//!                         ^                                       |
//!                    ReaderTimer                            status aggregator
//!                  (liveliness, deadline)                         |
//!                                                          listener dispatch
//! ```
//!
//! ## Modules Overview
//!
//! - [`dds`] - DataReader, listener traits, status types, collaborator traits
//! - [`qos`] - Reader QoS policies
//! - [`config`] - Reader runtime configuration and clocks
//! - [`core`] - Entity identifiers

/// Reader runtime configuration (allocator sizing, clock, timer naming).
pub mod config;
/// Entity identifiers shared across the DDS layer.
pub mod core;
/// DataReader engine, listeners, statuses and collaborator traits.
pub mod dds;
/// QoS policies consumed by the reader.
pub mod qos;

pub use crate::config::{Clock, ManualClock, ReaderConfig, SystemClock};
pub use crate::core::GUID;
pub use crate::dds::{
    DataReader, DataReaderListener, DataSampleHeader, DetachedSubscriber, Error,
    IdentityHandleAllocator, IncompatibleQosStatus, InstanceHandle, InstanceHandleAllocator,
    InstanceKey, InstanceStateKind, InstanceStateMask, LivelinessChangedStatus, MessageKind,
    ReaderBuilder, ReceivedDataSample, RequestedDeadlineMissedStatus,
    RequestedIncompatibleQosStatus, Result, SampleInfo, SampleLoan, SampleLostStatus,
    SampleRejectedReason, SampleRejectedStatus, SampleState, SampleStateMask, StatusMask,
    Subscriber, SubscriptionLostStatus, SubscriptionMatchedStatus, Topic, TopicDescription,
    ViewState, ViewStateMask, WriterAssociation, WriterState,
};
pub use crate::qos::{
    Deadline, Durability, History, LatencyBudget, Lifespan, Liveliness, LivelinessKind,
    ReaderQos, Reliability, ResourceLimits, UserData, LENGTH_UNLIMITED,
};
