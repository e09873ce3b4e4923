// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS DataReader
//!
//! The [`DataReader`] is the receiving end of one subscription.
//!
//! ## Overview
//!
//! A DataReader:
//! - Tracks matched writers and supervises their liveliness lease
//! - Maintains per-instance lifecycle (alive, disposed, no writers)
//! - Retains a depth-bounded history per instance and computes sample ranks
//! - Aggregates communication statuses and notifies listeners
//!
//! ## Data Flow
//!
//! ```text
//! transport --> data_received --+--> writer activity (lease refresh)
//!                                +--> instance lookup / creation
//!                                +--> lifespan filter
//!                                +--> history insert (depth eviction)
//!                                +--> DATA_AVAILABLE / subscriber notify
//!
//! ReaderTimer --> check_liveliness / check_deadlines
//! ```
//!
//! ## Locking
//!
//! Two locks: the association table and the reader state, always taken in
//! that order. Listener callbacks and subscriber notifications run after
//! both are released.
//!
//! ## See Also
//!
//! - [DDS Spec Sec.2.2.2.5](https://www.omg.org/spec/DDS/1.4/) - DataReader

mod allocator;
mod associations;
mod builder;
mod cache;
mod instance;
mod liveliness;
mod runtime;
mod sample;
mod state;
mod status;
mod timer;
mod writer_info;
#[cfg(test)]
mod tests;

pub use builder::ReaderBuilder;
pub use cache::SampleLoan;
pub use runtime::DataReader;
pub use sample::{
    DataSampleHeader, InstanceStateKind, MessageKind, ReceivedDataSample, SampleInfo,
    SampleState, ViewState,
};
pub use writer_info::WriterState;
