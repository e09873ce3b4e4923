// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single background timer shared by the liveliness and deadline checks of
//! one reader.
//!
//! The thread is spawned on the first `arm` and sleeps on a command channel
//! until the earliest armed slot is due. Re-arming a slot replaces its
//! previous due time, so at most one wake-up per kind is ever pending.
//!
//! The thread only holds a `Weak` reference to its target: dropping the
//! reader is never blocked by a pending timer.

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    Liveliness,
    Deadline,
}

impl TimerKind {
    const ALL: [TimerKind; 2] = [TimerKind::Liveliness, TimerKind::Deadline];

    fn slot(self) -> usize {
        match self {
            TimerKind::Liveliness => 0,
            TimerKind::Deadline => 1,
        }
    }
}

/// Receiver of timer expirations.
pub(crate) trait TimerTarget: Send + Sync {
    fn on_timer(&self, kind: TimerKind);
}

enum TimerCommand {
    Arm(TimerKind, Instant),
    Cancel(TimerKind),
    Shutdown,
}

struct TimerWorker {
    tx: Sender<TimerCommand>,
    thread: Option<JoinHandle<()>>,
}

pub(crate) struct ReaderTimer {
    name: String,
    target: Weak<dyn TimerTarget>,
    worker: Mutex<Option<TimerWorker>>,
    stopped: AtomicBool,
}

impl ReaderTimer {
    pub(crate) fn new(name: String, target: Weak<dyn TimerTarget>) -> Self {
        Self {
            name,
            target,
            worker: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// Fire `kind` after `delay`, replacing any pending expiry of that kind.
    pub(crate) fn arm(&self, kind: TimerKind, delay: Duration) {
        let at = Instant::now() + delay;
        self.send(TimerCommand::Arm(kind, at), true);
    }

    pub(crate) fn cancel(&self, kind: TimerKind) {
        self.send(TimerCommand::Cancel(kind), false);
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Stop the thread. Joins it unless called from the timer thread itself.
    pub(crate) fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
        let Some(mut worker) = self.worker.lock().take() else {
            return;
        };
        let _ = worker.tx.send(TimerCommand::Shutdown);
        if let Some(handle) = worker.thread.take() {
            if handle.thread().id() == std::thread::current().id() {
                log::trace!("[reader-timer] shutdown from timer thread, detaching");
                return;
            }
            if handle.join().is_err() {
                log::error!("[reader-timer] timer thread panicked");
            }
        }
    }

    fn send(&self, command: TimerCommand, spawn: bool) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        let mut worker = self.worker.lock();
        if worker.is_none() {
            if !spawn {
                return;
            }
            match self.spawn() {
                Ok(spawned) => *worker = Some(spawned),
                Err(e) => {
                    log::error!("[reader-timer] failed to spawn {}: {}", self.name, e);
                    return;
                }
            }
        }
        if let Some(worker) = worker.as_ref() {
            if worker.tx.send(command).is_err() {
                log::warn!("[reader-timer] timer thread is gone, command dropped");
            }
        }
    }

    fn spawn(&self) -> std::io::Result<TimerWorker> {
        let (tx, rx) = channel::unbounded::<TimerCommand>();
        let target = self.target.clone();
        let thread = std::thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                log::debug!("[reader-timer] started");
                let mut due: [Option<Instant>; 2] = [None, None];
                loop {
                    let next = due.iter().flatten().min().copied();
                    let command = match next {
                        Some(at) => match rx.recv_deadline(at) {
                            Ok(command) => Some(command),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        },
                        None => match rx.recv() {
                            Ok(command) => Some(command),
                            Err(_) => break,
                        },
                    };

                    match command {
                        Some(TimerCommand::Arm(kind, at)) => due[kind.slot()] = Some(at),
                        Some(TimerCommand::Cancel(kind)) => due[kind.slot()] = None,
                        Some(TimerCommand::Shutdown) => break,
                        None => {
                            let now = Instant::now();
                            for kind in TimerKind::ALL {
                                if !due[kind.slot()].is_some_and(|at| at <= now) {
                                    continue;
                                }
                                due[kind.slot()] = None;
                                match target.upgrade() {
                                    Some(target) => target.on_timer(kind),
                                    None => {
                                        log::debug!("[reader-timer] reader dropped");
                                        return;
                                    }
                                }
                            }
                        }
                    }
                }
                log::debug!("[reader-timer] stopped");
            })?;

        Ok(TimerWorker {
            tx,
            thread: Some(thread),
        })
    }
}

impl Drop for ReaderTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter {
        liveliness: AtomicU32,
        deadline: AtomicU32,
    }

    impl TimerTarget for Counter {
        fn on_timer(&self, kind: TimerKind) {
            match kind {
                TimerKind::Liveliness => self.liveliness.fetch_add(1, Ordering::SeqCst),
                TimerKind::Deadline => self.deadline.fetch_add(1, Ordering::SeqCst),
            };
        }
    }

    fn timer_for(counter: &Arc<Counter>) -> ReaderTimer {
        let as_target: Arc<dyn TimerTarget> = counter.clone();
        ReaderTimer::new("test-reader-timer".into(), Arc::downgrade(&as_target))
    }

    fn wait_for(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_lazy_spawn() {
        let counter = Arc::new(Counter::default());
        let timer = timer_for(&counter);
        assert!(!timer.is_running());

        timer.cancel(TimerKind::Liveliness);
        assert!(!timer.is_running());

        timer.arm(TimerKind::Liveliness, Duration::from_secs(60));
        assert!(timer.is_running());
        timer.shutdown();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_fires_each_kind() {
        let counter = Arc::new(Counter::default());
        let timer = timer_for(&counter);

        timer.arm(TimerKind::Liveliness, Duration::from_millis(10));
        timer.arm(TimerKind::Deadline, Duration::from_millis(20));

        assert!(wait_for(|| counter.deadline.load(Ordering::SeqCst) == 1));
        assert_eq!(counter.liveliness.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rearm_replaces_and_cancel_clears() {
        let counter = Arc::new(Counter::default());
        let timer = timer_for(&counter);

        timer.arm(TimerKind::Liveliness, Duration::from_millis(10));
        timer.arm(TimerKind::Liveliness, Duration::from_secs(60));
        timer.arm(TimerKind::Deadline, Duration::from_millis(10));
        timer.cancel(TimerKind::Deadline);

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(counter.liveliness.load(Ordering::SeqCst), 0);
        assert_eq!(counter.deadline.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_arm_after_shutdown() {
        let counter = Arc::new(Counter::default());
        let timer = timer_for(&counter);
        timer.shutdown();
        timer.arm(TimerKind::Deadline, Duration::from_millis(1));
        assert!(!timer.is_running());
    }
}
