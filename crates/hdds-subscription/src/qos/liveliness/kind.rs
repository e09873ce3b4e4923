// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

/// Who asserts a writer's liveliness (DDS v1.4 Sec.2.2.3.10).
///
/// The reader treats every kind alike: any sample or heartbeat from a writer
/// counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivelinessKind {
    /// Asserted by the writer's infrastructure.
    #[default]
    Automatic,
    /// Asserted by the application once for the whole participant.
    ManualByParticipant,
    /// Asserted by the application per writer.
    ManualByTopic,
}

impl LivelinessKind {
    #[must_use]
    pub fn is_manual(self) -> bool {
        !matches!(self, Self::Automatic)
    }
}
