// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic collaborator of a DataReader.
//!
//! The reader only needs the topic's identity (for logging and the
//! `reader_enabled` hook) and its current LIFESPAN, which can change while
//! the reader runs.

use crate::qos::Lifespan;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Topic information a DataReader looks up.
pub trait Topic: Send + Sync {
    fn name(&self) -> &str;

    fn type_name(&self) -> &str;

    /// Repository-assigned topic id.
    fn id(&self) -> u32;

    /// Current LIFESPAN; read once per received sample.
    fn lifespan(&self) -> Lifespan;
}

/// Plain [`Topic`] implementation.
///
/// The lifespan sits in an `ArcSwap` so it can be updated without blocking
/// concurrent sample delivery.
///
/// # Examples
///
/// ```
/// use hdds_subscription::{Lifespan, Topic, TopicDescription};
///
/// let topic = TopicDescription::new("sensors/temperature", "Temperature", 7);
/// assert!(topic.lifespan().is_infinite());
///
/// topic.set_lifespan(Lifespan::from_millis(500));
/// assert_eq!(topic.lifespan(), Lifespan::from_millis(500));
/// ```
#[derive(Debug)]
pub struct TopicDescription {
    name: String,
    type_name: String,
    id: u32,
    lifespan: ArcSwap<Lifespan>,
}

impl TopicDescription {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            id,
            lifespan: ArcSwap::from_pointee(Lifespan::infinite()),
        }
    }

    #[must_use]
    pub fn with_lifespan(self, lifespan: Lifespan) -> Self {
        self.lifespan.store(Arc::new(lifespan));
        self
    }

    pub fn set_lifespan(&self, lifespan: Lifespan) {
        self.lifespan.store(Arc::new(lifespan));
    }
}

impl Topic for TopicDescription {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn lifespan(&self) -> Lifespan {
        **self.lifespan.load()
    }
}
