// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-instance lifecycle state machine.
//!
//! ```text
//!            dispose                 (unregister | writer dead) && no writers
//!  ALIVE ---------------> NOT_ALIVE_DISPOSED      ALIVE -----------> NOT_ALIVE_NO_WRITERS
//!    ^                          |                   ^                        |
//!    +---- data / registration -+                   +--- data / registration +
//! ```
//!
//! Entering NOT_ALIVE_DISPOSED bumps `disposed_generation_count`; entering
//! NOT_ALIVE_NO_WRITERS bumps `no_writers_generation_count`. Returning to
//! ALIVE leaves both untouched, so every sample stored after a not-alive
//! episode carries a strictly larger generation sum than the ones before it.

use super::cache::SampleHistory;
use super::sample::{InstanceStateKind, ViewState};
use crate::core::GUID;
use crate::dds::handle::{InstanceHandle, InstanceKey};
use crate::qos::deadline::DeadlineWindow;
use std::collections::HashSet;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub(crate) struct InstanceState {
    state: InstanceStateKind,
    view: ViewState,
    disposed_generation_count: i32,
    no_writers_generation_count: i32,
    writers: HashSet<GUID>,
}

impl InstanceState {
    pub(crate) fn new() -> Self {
        Self {
            state: InstanceStateKind::Alive,
            view: ViewState::New,
            disposed_generation_count: 0,
            no_writers_generation_count: 0,
            writers: HashSet::new(),
        }
    }

    pub(crate) fn state(&self) -> InstanceStateKind {
        self.state
    }

    pub(crate) fn view(&self) -> ViewState {
        self.view
    }

    pub(crate) fn generation_counts(&self) -> (i32, i32) {
        (
            self.disposed_generation_count,
            self.no_writers_generation_count,
        )
    }

    pub(crate) fn has_writers(&self) -> bool {
        !self.writers.is_empty()
    }

    /// Data or registration from `writer`. Returns `true` if the instance
    /// came back to ALIVE.
    pub(crate) fn register(&mut self, writer: GUID) -> bool {
        self.writers.insert(writer);
        self.revive()
    }

    pub(crate) fn dispose(&mut self) -> bool {
        if self.state != InstanceStateKind::Alive {
            return false;
        }
        self.state = InstanceStateKind::NotAliveDisposed;
        self.disposed_generation_count += 1;
        true
    }

    /// `writer` stopped writing this instance (unregister, lease expiry or
    /// unmatch). Returns `true` if the instance lost its last writer.
    pub(crate) fn release_writer(&mut self, writer: &GUID) -> bool {
        if !self.writers.remove(writer) || self.has_writers() {
            return false;
        }
        if self.state != InstanceStateKind::Alive {
            return false;
        }
        self.state = InstanceStateKind::NotAliveNoWriters;
        self.no_writers_generation_count += 1;
        true
    }

    /// The instance was returned by a read or take.
    pub(crate) fn mark_viewed(&mut self) {
        self.view = ViewState::NotNew;
    }

    fn revive(&mut self) -> bool {
        if self.state == InstanceStateKind::Alive {
            return false;
        }
        self.state = InstanceStateKind::Alive;
        true
    }
}

/// An instance of the subscribed topic together with its retained samples.
#[derive(Debug)]
pub(crate) struct SubscriptionInstance {
    pub(crate) handle: InstanceHandle,
    pub(crate) key: InstanceKey,
    pub(crate) state: InstanceState,
    pub(crate) history: SampleHistory,
    pub(crate) deadline: DeadlineWindow,
}

impl SubscriptionInstance {
    pub(crate) fn new(handle: InstanceHandle, key: InstanceKey, now: SystemTime) -> Self {
        Self {
            handle,
            key,
            state: InstanceState::new(),
            history: SampleHistory::new(),
            deadline: DeadlineWindow::new(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guid(n: u8) -> GUID {
        GUID::new([n; 12], [0, 0, 1, 2])
    }

    #[test]
    fn test_new_instance_is_alive_and_new() {
        let st = InstanceState::new();
        assert_eq!(st.state(), InstanceStateKind::Alive);
        assert_eq!(st.view(), ViewState::New);
        assert_eq!(st.generation_counts(), (0, 0));
        assert!(!st.has_writers());
    }

    #[test]
    fn test_dispose_then_revive() {
        let mut st = InstanceState::new();
        st.register(guid(1));

        assert!(st.dispose());
        assert_eq!(st.state(), InstanceStateKind::NotAliveDisposed);
        assert_eq!(st.generation_counts(), (1, 0));

        // Second dispose while already disposed is a no-op
        assert!(!st.dispose());
        assert_eq!(st.generation_counts(), (1, 0));

        assert!(st.register(guid(1)));
        assert_eq!(st.state(), InstanceStateKind::Alive);
        assert_eq!(st.generation_counts(), (1, 0));
    }

    #[test]
    fn test_no_writers_only_after_last_writer() {
        let mut st = InstanceState::new();
        st.register(guid(1));
        st.register(guid(2));

        assert!(!st.release_writer(&guid(1)));
        assert_eq!(st.state(), InstanceStateKind::Alive);

        assert!(st.release_writer(&guid(2)));
        assert_eq!(st.state(), InstanceStateKind::NotAliveNoWriters);
        assert_eq!(st.generation_counts(), (0, 1));

        // Unknown writer is ignored
        assert!(!st.release_writer(&guid(3)));
        assert_eq!(st.generation_counts(), (0, 1));
    }

    #[test]
    fn test_new_writer_revives_no_writers() {
        let mut st = InstanceState::new();
        st.register(guid(1));
        st.release_writer(&guid(1));

        assert!(st.register(guid(2)));
        assert_eq!(st.state(), InstanceStateKind::Alive);
        assert!(st.has_writers());
        assert_eq!(st.generation_counts(), (0, 1));
    }

    #[test]
    fn test_mark_viewed() {
        let mut st = InstanceState::new();
        st.mark_viewed();
        assert_eq!(st.view(), ViewState::NotNew);
    }
}
