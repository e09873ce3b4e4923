// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::too_many_lines)] // Example/test code

//! History, instance lifecycle and read/take integration tests

use hdds_subscription::{
    DataReader, DetachedSubscriber, Error, InstanceStateKind, InstanceStateMask, Lifespan,
    ManualClock, ReaderConfig, ReaderQos, ReceivedDataSample, SampleStateMask, TopicDescription,
    ViewState, ViewStateMask, WriterAssociation, GUID,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const CAR: [u8; 16] = [0xC0; 16];
const BUS: [u8; 16] = [0xB0; 16];

fn writer(n: u8) -> GUID {
    GUID::new([n; 12], [0, 0, 1, 2])
}

struct Fixture {
    reader: DataReader,
    topic: Arc<TopicDescription>,
    clock: Arc<ManualClock>,
    seq: u64,
}

impl Fixture {
    fn new(qos: ReaderQos) -> Self {
        let clock = Arc::new(ManualClock::new(UNIX_EPOCH + Duration::from_secs(10_000)));
        let topic = Arc::new(TopicDescription::new("history/test", "Vehicle", 21));
        let reader = DataReader::builder(topic.clone(), Arc::new(DetachedSubscriber))
            .qos(qos)
            .config(ReaderConfig::default().with_clock(clock.clone()))
            .build()
            .expect("Failed to build reader");
        reader.enable().expect("Failed to enable reader");
        reader.add_associations(
            reader.guid(),
            &[WriterAssociation::new(writer(1)), WriterAssociation::new(writer(2))],
        );
        Self {
            reader,
            topic,
            clock,
            seq: 0,
        }
    }

    fn now(&self) -> SystemTime {
        hdds_subscription::Clock::now(self.clock.as_ref())
    }

    fn write(&mut self, from: u8, key: [u8; 16], payload: &[u8]) {
        self.seq += 1;
        let now = self.now();
        self.reader.data_received(
            ReceivedDataSample::data(writer(from), key, self.seq, payload.to_vec())
                .with_source_timestamp(now),
        );
    }
}

fn payloads(samples: &[(Vec<u8>, hdds_subscription::SampleInfo)]) -> Vec<&[u8]> {
    samples.iter().map(|(p, _)| p.as_slice()).collect()
}

#[test]
fn test_keep_last_per_instance() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(2));
    for payload in [b"c1", b"c2", b"c3"] {
        fx.write(1, CAR, payload);
    }
    fx.write(1, BUS, b"b1");

    let car = fx.reader.lookup_instance(CAR).expect("car instance");
    let taken = fx
        .reader
        .take_instance(
            car,
            10,
            SampleStateMask::ANY,
            ViewStateMask::ANY,
            InstanceStateMask::ANY,
        )
        .expect("take car");
    assert_eq!(payloads(&taken), vec![&b"c2"[..], &b"c3"[..]]);
    assert!(taken.iter().all(|(_, info)| info.instance_handle == car));
    assert_eq!(fx.reader.total_samples(), 1);
}

#[test]
fn test_sample_ranks_within_batch() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(5));
    for payload in [b"1", b"2", b"3"] {
        fx.write(1, CAR, payload);
    }

    let samples = fx.reader.read_any(10).expect("read");
    let ranks: Vec<i32> = samples.iter().map(|(_, i)| i.sample_rank).collect();
    assert_eq!(ranks, vec![2, 1, 0]);
    assert!(samples
        .iter()
        .all(|(_, i)| i.generation_rank == 0 && i.absolute_generation_rank == 0));

    // A limited batch ranks against itself only
    let first_two = fx.reader.read_any(2).expect("read");
    let ranks: Vec<i32> = first_two.iter().map(|(_, i)| i.sample_rank).collect();
    assert_eq!(ranks, vec![1, 0]);
}

#[test]
fn test_generations_after_dispose_and_unregister() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(10));
    fx.write(1, CAR, b"g0");
    fx.reader
        .data_received(ReceivedDataSample::dispose(writer(1), CAR));
    fx.write(1, CAR, b"g1");
    fx.reader
        .data_received(ReceivedDataSample::unregister(writer(1), CAR));
    fx.write(2, CAR, b"g2");

    let samples = fx
        .reader
        .read(
            10,
            SampleStateMask::NOT_READ,
            ViewStateMask::ANY,
            InstanceStateMask::ANY,
        )
        .expect("read");
    let counts: Vec<(i32, i32)> = samples
        .iter()
        .map(|(_, i)| (i.disposed_generation_count, i.no_writers_generation_count))
        .collect();
    assert_eq!(counts, vec![(0, 0), (1, 0), (1, 1)]);

    let generation: Vec<i32> = samples.iter().map(|(_, i)| i.generation_rank).collect();
    assert_eq!(generation, vec![2, 1, 0]);

    // Only the oldest sample read: absolute rank still measures against the
    // newest sample held.
    fx.reader.take_any(10).expect("drain");
    fx.write(2, CAR, b"g2b");
    fx.reader
        .data_received(ReceivedDataSample::dispose(writer(2), CAR));
    fx.write(2, CAR, b"g3");
    let oldest = fx.reader.read_any(1).expect("read one");
    assert_eq!(oldest[0].1.sample_rank, 0);
    assert_eq!(oldest[0].1.generation_rank, 0);
    assert_eq!(oldest[0].1.absolute_generation_rank, 1);
}

#[test]
fn test_view_is_new_only_on_creation() {
    let mut fx = Fixture::new(ReaderQos::default());
    fx.write(1, CAR, b"a");
    fx.reader.take_any(10).expect("take");
    fx.reader
        .data_received(ReceivedDataSample::dispose(writer(1), CAR));
    fx.write(1, CAR, b"b");

    let samples = fx.reader.read_any(10).expect("read");
    assert_eq!(samples[0].1.view_state, ViewState::NotNew);
    assert_eq!(samples[0].1.instance_state, InstanceStateKind::Alive);

    fx.write(1, BUS, b"c");
    let bus = fx.reader.lookup_instance(BUS).expect("bus");
    let samples = fx
        .reader
        .read_instance(
            bus,
            10,
            SampleStateMask::ANY,
            ViewStateMask::NEW,
            InstanceStateMask::ANY,
        )
        .expect("read bus");
    assert_eq!(samples[0].1.view_state, ViewState::New);
}

#[test]
fn test_lifespan_filters_stale_samples() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(10));
    fx.topic.set_lifespan(Lifespan::from_millis(50));

    let stale = fx.now() - Duration::from_millis(60);
    fx.reader.data_received(
        ReceivedDataSample::data(writer(1), CAR, 1, b"old".to_vec()).with_source_timestamp(stale),
    );
    fx.write(1, CAR, b"new");

    let samples = fx.reader.take_any(10).expect("take");
    assert_eq!(payloads(&samples), vec![&b"new"[..]]);
}

#[test]
fn test_lifespan_change_applies_to_next_sample() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(10));
    let sent = fx.now();
    fx.clock.advance(Duration::from_millis(30));

    fx.reader.data_received(
        ReceivedDataSample::data(writer(1), CAR, 1, b"kept".to_vec()).with_source_timestamp(sent),
    );
    fx.topic.set_lifespan(Lifespan::from_millis(20));
    fx.reader.data_received(
        ReceivedDataSample::data(writer(1), CAR, 2, b"gone".to_vec()).with_source_timestamp(sent),
    );

    let samples = fx.reader.take_any(10).expect("take");
    assert_eq!(payloads(&samples), vec![&b"kept"[..]]);
}

#[test]
fn test_loans_pin_samples() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(2));
    fx.write(1, CAR, b"x");
    fx.write(1, CAR, b"y");

    let loans = fx
        .reader
        .read_w_loan(
            10,
            SampleStateMask::ANY,
            ViewStateMask::ANY,
            InstanceStateMask::ANY,
        )
        .expect("loan");
    assert_eq!(loans.len(), 2);
    assert_eq!(fx.reader.num_zero_copies(), 2);
    assert_eq!(loans[0].data(), b"x");
    assert_eq!(loans[1].info().sample_rank, 0);

    fx.write(1, CAR, b"z");
    assert_eq!(fx.reader.total_samples(), 3);

    drop(loans);
    assert_eq!(fx.reader.num_zero_copies(), 0);

    // Depth is enforced again on the next read
    let samples = fx.reader.read_any(10).expect("read");
    assert_eq!(payloads(&samples), vec![&b"y"[..], &b"z"[..]]);
}

#[test]
fn test_release_instance_rules() {
    let mut fx = Fixture::new(ReaderQos::default());
    fx.write(1, CAR, b"a");
    let car = fx.reader.lookup_instance(CAR).expect("car");

    assert!(matches!(
        fx.reader.release_instance(car),
        Err(Error::PreconditionNotMet(_))
    ));
    fx.reader.take_any(10).expect("take");
    fx.reader.release_instance(car).expect("release empty instance");
    assert!(matches!(
        fx.reader.release_instance(car),
        Err(Error::BadParameter(_))
    ));

    // A later sample recreates the instance under a fresh handle
    fx.write(1, CAR, b"b");
    let again = fx.reader.lookup_instance(CAR).expect("car again");
    assert_ne!(again, car);
}

#[test]
fn test_take_next_sample_walks_instances() {
    let mut fx = Fixture::new(ReaderQos::default().keep_last(4));
    fx.write(1, CAR, b"c");
    fx.write(1, BUS, b"b");

    let mut seen = Vec::new();
    while let Some((payload, _)) = fx.reader.take_next_sample().expect("take next") {
        seen.push(payload);
    }
    seen.sort();
    assert_eq!(seen, vec![b"b".to_vec(), b"c".to_vec()]);
    assert_eq!(fx.reader.total_samples(), 0);
}

#[test]
fn test_read_requires_enabled_reader() {
    let topic = Arc::new(TopicDescription::new("history/disabled", "Vehicle", 22));
    let reader = DataReader::builder(topic, Arc::new(DetachedSubscriber))
        .build()
        .expect("Failed to build reader");

    assert!(matches!(reader.read_any(1), Err(Error::NotEnabled)));
    assert!(matches!(
        reader.get_matched_publications(),
        Err(Error::NotEnabled)
    ));
}
