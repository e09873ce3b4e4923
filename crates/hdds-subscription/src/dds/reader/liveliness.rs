// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer liveliness supervision.
//!
//! ```text
//!            activity                lease expired
//!  NotSet -------------> Alive -------------------> Dead
//!    |                     ^                          |
//!    +-- lease expired ----|------------------------->+
//!                          +------- activity ---------+
//! ```
//!
//! `alive_count` counts writers in `Alive`, `not_alive_count` writers in
//! `Dead`. A counter that would go below zero is an internal inconsistency:
//! it is logged and the transition is abandoned.

use super::state::ReaderState;
use super::status::Outbox;
use super::timer::TimerKind;
use super::writer_info::WriterState;
use crate::core::GUID;
use std::time::SystemTime;

impl ReaderState {
    /// Any message from `writer_id` refreshes its lease.
    pub(crate) fn writer_activity(
        &mut self,
        writer_id: &GUID,
        now: SystemTime,
        outbox: &mut Outbox<'_>,
    ) {
        let Some(info) = self.writers.get_mut(writer_id) else {
            log::debug!(
                "[reader-liveliness] activity from unknown writer {}",
                writer_id
            );
            return;
        };
        info.last_activity = now;
        if info.state == WriterState::Alive {
            return;
        }
        self.writer_became_alive(writer_id, outbox);
        self.check_liveliness(now, outbox);
    }

    /// Mark every writer whose lease ran out as dead and schedule the next
    /// expiry, or disarm the timer when no lease is pending.
    pub(crate) fn check_liveliness(&mut self, now: SystemTime, outbox: &mut Outbox<'_>) {
        let lease = self.qos.liveliness;
        let mut expired = Vec::new();
        let mut next: Option<SystemTime> = None;

        for info in self.writers.values() {
            match info.lease_expiry(&lease) {
                Some(at) if at <= now => expired.push(info.writer_id),
                Some(at) => next = Some(next.map_or(at, |n| n.min(at))),
                None => {}
            }
        }

        for writer_id in expired {
            self.writer_became_dead(&writer_id, outbox);
        }
        outbox.schedule(TimerKind::Liveliness, next);
    }

    fn writer_became_alive(&mut self, writer_id: &GUID, outbox: &mut Outbox<'_>) {
        let Some(info) = self.writers.get_mut(writer_id) else {
            return;
        };
        let status = &mut self.statuses.liveliness;
        match info.state {
            WriterState::Alive => return,
            WriterState::NotSet => {}
            WriterState::Dead => {
                let Some(not_alive) = status.not_alive_count.checked_sub(1) else {
                    log::error!(
                        "[reader-liveliness] not_alive_count underflow reviving {}",
                        writer_id
                    );
                    return;
                };
                status.not_alive_count = not_alive;
                status.not_alive_count_change -= 1;
            }
        }
        status.alive_count += 1;
        status.alive_count_change += 1;
        status.last_publication_handle = info.publication_handle;
        info.state = WriterState::Alive;

        log::debug!(
            "[reader-liveliness] writer {} alive (alive={}, not_alive={})",
            writer_id,
            status.alive_count,
            status.not_alive_count
        );
        outbox.raise(status);
    }

    fn writer_became_dead(&mut self, writer_id: &GUID, outbox: &mut Outbox<'_>) {
        let Some(info) = self.writers.get_mut(writer_id) else {
            return;
        };
        let status = &mut self.statuses.liveliness;
        match info.state {
            WriterState::Dead => return,
            WriterState::NotSet => {}
            WriterState::Alive => {
                let Some(alive) = status.alive_count.checked_sub(1) else {
                    log::error!(
                        "[reader-liveliness] alive_count underflow expiring {}",
                        writer_id
                    );
                    return;
                };
                status.alive_count = alive;
                status.alive_count_change -= 1;
            }
        }
        status.not_alive_count += 1;
        status.not_alive_count_change += 1;
        status.last_publication_handle = info.publication_handle;
        info.state = WriterState::Dead;

        log::debug!(
            "[reader-liveliness] writer {} lease expired (alive={}, not_alive={})",
            writer_id,
            status.alive_count,
            status.not_alive_count
        );
        outbox.raise(status);
        self.release_writer_instances(writer_id);
    }

    /// Forget an unmatched writer. Returns `false` if it was not associated.
    pub(crate) fn writer_removed(&mut self, writer_id: &GUID, outbox: &mut Outbox<'_>) -> bool {
        let Some(info) = self.writers.remove(writer_id) else {
            log::debug!(
                "[reader-liveliness] removal of unknown writer {}",
                writer_id
            );
            return false;
        };

        let status = &mut self.statuses.liveliness;
        let changed = match info.state {
            WriterState::NotSet => false,
            WriterState::Alive => match status.alive_count.checked_sub(1) {
                Some(alive) => {
                    status.alive_count = alive;
                    status.alive_count_change -= 1;
                    true
                }
                None => {
                    log::error!(
                        "[reader-liveliness] alive_count underflow removing {}",
                        writer_id
                    );
                    false
                }
            },
            WriterState::Dead => match status.not_alive_count.checked_sub(1) {
                Some(not_alive) => {
                    status.not_alive_count = not_alive;
                    status.not_alive_count_change -= 1;
                    true
                }
                None => {
                    log::error!(
                        "[reader-liveliness] not_alive_count underflow removing {}",
                        writer_id
                    );
                    false
                }
            },
        };
        if changed {
            status.last_publication_handle = info.publication_handle;
            outbox.raise(status);
        }

        self.release_writer_instances(writer_id);
        true
    }
}
