// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

/// Deadline QoS policy - expected sample period per instance.
pub mod deadline;
/// Lifespan QoS policy - sample expiration relative to its source timestamp.
pub mod lifespan;
/// Liveliness QoS policy - writer lease supervision.
pub mod liveliness;

pub use deadline::Deadline;
pub use lifespan::{Lifespan, LifespanChecker};
pub use liveliness::{Liveliness, LivelinessKind};

use std::time::Duration;

/// Sentinel for "no limit" in [`ResourceLimits`] (DDS `LENGTH_UNLIMITED`).
pub const LENGTH_UNLIMITED: usize = usize::MAX;

/// Depth used when a KEEP_ALL history has no per-instance sample limit.
const UNBOUNDED_DEPTH: usize = i32::MAX as usize;

/// Reliability policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Reliability {
    /// Fire-and-forget, no repair of lost samples.
    #[default]
    BestEffort,
    /// Lost samples are repaired by the writer.
    Reliable,
}

/// History policy
///
/// Determines how many samples each instance retains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum History {
    /// Keep the last N samples per instance, evicting the oldest.
    KeepLast(u32),
    /// Keep every sample, bounded only by `ResourceLimits`.
    KeepAll,
}

impl Default for History {
    fn default() -> Self {
        Self::KeepLast(1)
    }
}

/// Durability policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Durability {
    #[default]
    Volatile,
    TransientLocal,
    Transient,
    Persistent,
}

/// Resource limits for a reader.
///
/// Every field accepts [`LENGTH_UNLIMITED`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum samples held across all instances (sizes the sample allocator).
    pub max_samples: usize,
    /// Maximum number of instances.
    pub max_instances: usize,
    /// Maximum samples per instance (history depth for KEEP_ALL).
    pub max_samples_per_instance: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_samples: LENGTH_UNLIMITED,
            max_instances: LENGTH_UNLIMITED,
            max_samples_per_instance: LENGTH_UNLIMITED,
        }
    }
}

/// LATENCY_BUDGET QoS policy (hint only, changeable after enable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LatencyBudget {
    pub duration: Duration,
}

impl LatencyBudget {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

/// USER_DATA QoS policy: opaque bytes attached to the reader.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UserData {
    pub value: Vec<u8>,
}

/// QoS of a DataReader.
///
/// Validated on creation and on every `set_qos` (fail-fast on invalid
/// combinations). History, resource limits, liveliness, reliability and
/// durability are frozen once the reader is enabled.
///
/// # Examples
///
/// ```
/// use hdds_subscription::qos::{History, ReaderQos};
///
/// let qos = ReaderQos::default()
///     .reliable()
///     .keep_last(5)
///     .liveliness_automatic_millis(500)
///     .deadline_millis(100);
///
/// assert_eq!(qos.history, History::KeepLast(5));
/// assert!(qos.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReaderQos {
    pub reliability: Reliability,
    pub durability: Durability,
    pub history: History,
    pub resource_limits: ResourceLimits,
    pub liveliness: Liveliness,
    pub deadline: Deadline,
    pub latency_budget: LatencyBudget,
    pub user_data: UserData,
}

impl ReaderQos {
    /// Validate QoS consistency.
    ///
    /// # Validation Rules
    ///
    /// - History::KeepLast(n) where n > 0
    /// - History::KeepAll requires ResourceLimits.max_samples > 0
    /// - KeepLast depth <= max_samples_per_instance
    /// - max_samples >= max_samples_per_instance
    /// - liveliness lease and deadline period are non-zero
    pub fn validate(&self) -> Result<(), String> {
        let rl = &self.resource_limits;
        match self.history {
            History::KeepLast(0) => {
                return Err("History::KeepLast(n) requires n > 0".to_string());
            }
            History::KeepLast(depth) => {
                if rl.max_samples_per_instance != LENGTH_UNLIMITED
                    && depth as usize > rl.max_samples_per_instance
                {
                    return Err(format!(
                        "History::KeepLast({}) exceeds max_samples_per_instance ({})",
                        depth, rl.max_samples_per_instance
                    ));
                }
            }
            History::KeepAll => {
                if rl.max_samples == 0 {
                    return Err(
                        "History::KeepAll requires ResourceLimits.max_samples > 0".to_string()
                    );
                }
            }
        }

        if rl.max_samples != LENGTH_UNLIMITED
            && rl.max_samples_per_instance != LENGTH_UNLIMITED
            && rl.max_samples < rl.max_samples_per_instance
        {
            return Err(format!(
                "max_samples ({}) must be >= max_samples_per_instance ({})",
                rl.max_samples, rl.max_samples_per_instance
            ));
        }
        if rl.max_instances == 0 || rl.max_samples_per_instance == 0 {
            return Err("ResourceLimits must allow at least one instance and sample".to_string());
        }
        if self.liveliness.lease_duration.is_zero() {
            return Err("Liveliness lease_duration must be > 0".to_string());
        }
        if self.deadline.period.is_zero() {
            return Err("Deadline period must be > 0".to_string());
        }
        Ok(())
    }

    /// Check that moving from `self` to `new` only touches changeable policies.
    ///
    /// Returns the name of the first immutable policy that differs.
    pub fn check_changeable(&self, new: &ReaderQos) -> Result<(), &'static str> {
        if self.reliability != new.reliability {
            return Err("RELIABILITY");
        }
        if self.durability != new.durability {
            return Err("DURABILITY");
        }
        if self.history != new.history {
            return Err("HISTORY");
        }
        if self.resource_limits != new.resource_limits {
            return Err("RESOURCE_LIMITS");
        }
        if self.liveliness != new.liveliness {
            return Err("LIVELINESS");
        }
        Ok(())
    }

    /// Per-instance retention depth implied by HISTORY and RESOURCE_LIMITS.
    #[must_use]
    pub fn history_depth(&self) -> usize {
        match self.history {
            History::KeepLast(depth) => depth as usize,
            History::KeepAll => {
                if self.resource_limits.max_samples_per_instance == LENGTH_UNLIMITED {
                    UNBOUNDED_DEPTH
                } else {
                    self.resource_limits.max_samples_per_instance
                }
            }
        }
    }

    pub fn reliable(mut self) -> Self {
        self.reliability = Reliability::Reliable;
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.reliability = Reliability::BestEffort;
        self
    }

    pub fn transient_local(mut self) -> Self {
        self.durability = Durability::TransientLocal;
        self
    }

    pub fn keep_last(mut self, depth: u32) -> Self {
        self.history = History::KeepLast(depth);
        self
    }

    pub fn keep_all(mut self) -> Self {
        self.history = History::KeepAll;
        self
    }

    pub fn resource_limits(mut self, limits: ResourceLimits) -> Self {
        self.resource_limits = limits;
        self
    }

    pub fn max_samples(mut self, max: usize) -> Self {
        self.resource_limits.max_samples = max;
        self
    }

    pub fn max_instances(mut self, max: usize) -> Self {
        self.resource_limits.max_instances = max;
        self
    }

    pub fn max_samples_per_instance(mut self, max: usize) -> Self {
        self.resource_limits.max_samples_per_instance = max;
        self
    }

    pub fn liveliness(mut self, liveliness: Liveliness) -> Self {
        self.liveliness = liveliness;
        self
    }

    /// Set automatic liveliness with a lease in milliseconds.
    pub fn liveliness_automatic_millis(mut self, ms: u64) -> Self {
        self.liveliness = Liveliness::automatic_millis(ms);
        self
    }

    pub fn liveliness_automatic_secs(mut self, secs: u64) -> Self {
        self.liveliness = Liveliness::automatic_secs(secs);
        self
    }

    /// Set deadline period. Missed deadlines raise REQUESTED_DEADLINE_MISSED.
    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline_millis(mut self, ms: u64) -> Self {
        self.deadline = Deadline::from_millis(ms);
        self
    }

    pub fn latency_budget_millis(mut self, ms: u64) -> Self {
        self.latency_budget = LatencyBudget::new(Duration::from_millis(ms));
        self
    }

    pub fn user_data_bytes(mut self, value: &[u8]) -> Self {
        self.user_data = UserData {
            value: value.to_vec(),
        };
        self
    }
}
