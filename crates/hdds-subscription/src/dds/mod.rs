// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS DataReader engine
//!
//! ## Overview
//!
//! - **DataReader**: matched writers, instances, history, statuses
//! - **Subscriber / Topic**: collaborator traits the reader calls back into
//! - **Listener**: callback interface for status changes
//! - **Handles**: application-visible instance and publication handles
//!
//! ## Entity Hierarchy
//!
//! ```text
//! Subscriber (trait)
//!     +-- DataReader  <------ Topic (trait)
//!           +-- matched writers (WriterInfo)
//!           +-- instances (SubscriptionInstance -> sample history)
//! ```
//!
//! ## See Also
//!
//! - [DDS Specification](https://www.omg.org/spec/DDS/1.4/)

mod condition;
mod handle;
/// Listener trait and communication status types.
pub mod listener;
mod read_condition;
mod reader;
mod subscriber;
mod topic;

pub use condition::StatusMask;
pub use handle::{IdentityHandleAllocator, InstanceHandle, InstanceHandleAllocator, InstanceKey};
pub use listener::{
    DataReaderListener, IncompatibleQosStatus, LivelinessChangedStatus,
    RequestedDeadlineMissedStatus, RequestedIncompatibleQosStatus, SampleLostStatus,
    SampleRejectedReason, SampleRejectedStatus, SubscriptionLostStatus, SubscriptionMatchedStatus,
};
pub use read_condition::{InstanceStateMask, SampleStateMask, ViewStateMask};
pub use reader::{
    DataReader, DataSampleHeader, InstanceStateKind, MessageKind, ReaderBuilder,
    ReceivedDataSample, SampleInfo, SampleLoan, SampleState, ViewState, WriterState,
};
pub use subscriber::{DetachedSubscriber, Subscriber, WriterAssociation};
pub use topic::{Topic, TopicDescription};

/// Errors returned by DataReader operations.
///
/// Lookup misses inside batch operations (unknown writer, unresolvable
/// handle) are logged and skipped rather than returned; only operations that
/// target a single entity surface them.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Operation requires an enabled reader.
    NotEnabled,
    /// Reader was cleaned up; the operation can no longer run.
    AlreadyDeleted,

    // ========================================================================
    // QoS Errors
    // ========================================================================
    /// QoS policies are invalid or inconsistent with each other.
    InconsistentPolicy(String),
    /// Attempt to change a policy that is frozen after enable.
    ImmutablePolicy(&'static str),

    // ========================================================================
    // Instance / Sample Errors
    // ========================================================================
    /// Operation preconditions not met (e.g. releasing an instance with samples).
    PreconditionNotMet(String),
    /// Unknown handle or invalid argument.
    BadParameter(String),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// I/O error raised by a collaborator (e.g. `Subscriber::reader_enabled`).
    IoError(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotEnabled => write!(f, "Reader not enabled"),
            Error::AlreadyDeleted => write!(f, "Reader already deleted"),
            Error::InconsistentPolicy(msg) => write!(f, "Inconsistent QoS policy: {}", msg),
            Error::ImmutablePolicy(policy) => {
                write!(f, "Immutable QoS policy changed after enable: {}", policy)
            }
            Error::PreconditionNotMet(msg) => write!(f, "Precondition not met: {}", msg),
            Error::BadParameter(msg) => write!(f, "Bad parameter: {}", msg),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
