// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Liveliness, LivelinessKind};
use std::time::{Duration, UNIX_EPOCH};

#[test]
fn test_liveliness_constructors() {
    let automatic = Liveliness::automatic(Duration::from_secs(5));
    assert_eq!(automatic.kind, LivelinessKind::Automatic);
    assert_eq!(automatic.lease_duration, Duration::from_secs(5));

    let manual_topic = Liveliness::manual_by_topic(Duration::from_secs(15));
    assert_eq!(manual_topic.kind, LivelinessKind::ManualByTopic);
    assert!(manual_topic.kind.is_manual());

    assert!(Liveliness::infinite().is_infinite());
    assert_eq!(Liveliness::automatic_millis(250).lease_duration, Duration::from_millis(250));
}

#[test]
fn test_lease_expiry() {
    let last = UNIX_EPOCH + Duration::from_secs(10);

    let lease = Liveliness::automatic_millis(500);
    assert_eq!(
        lease.lease_expiry(last),
        Some(last + Duration::from_millis(500))
    );

    assert_eq!(Liveliness::infinite().lease_expiry(last), None);
    assert!(!Liveliness::infinite().is_supervised());
    assert!(!Liveliness::automatic_millis(0).is_supervised());
}
