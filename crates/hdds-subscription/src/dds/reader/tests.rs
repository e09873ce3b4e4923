// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::config::{Clock, ManualClock, ReaderConfig};
use crate::core::GUID;
use crate::dds::{
    DetachedSubscriber, Error, InstanceStateMask, SampleStateMask, StatusMask, TopicDescription,
    ViewStateMask, WriterAssociation,
};
use crate::qos::{Lifespan, ReaderQos};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

const KEY: [u8; 16] = [7; 16];

fn writer(n: u8) -> GUID {
    GUID::new([n; 12], [0, 0, 1, 2])
}

fn reader_with(qos: ReaderQos, clock: Arc<ManualClock>) -> (DataReader, Arc<TopicDescription>) {
    let topic = Arc::new(TopicDescription::new("test/topic", "TestType", 3));
    let reader = DataReader::builder(topic.clone(), Arc::new(DetachedSubscriber))
        .qos(qos)
        .config(ReaderConfig::default().with_clock(clock))
        .build()
        .expect("valid qos");
    reader.enable().expect("enable");
    (reader, topic)
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(UNIX_EPOCH + Duration::from_secs(1_000)))
}

fn matched(qos: ReaderQos) -> (DataReader, Arc<ManualClock>) {
    let clock = clock();
    let (reader, _topic) = reader_with(qos, clock.clone());
    reader.add_associations(reader.guid(), &[WriterAssociation::new(writer(1))]);
    (reader, clock)
}

#[test]
fn test_enable_sizes_allocator_and_depth() {
    let (reader, _) = matched(ReaderQos::default().keep_last(3).max_samples(8));
    let state = reader.shared.state.lock();
    assert_eq!(state.depth(), 3);
    assert_eq!(state.chunks_in_use(), 0);
}

#[test]
fn test_depth_eviction_returns_chunks() {
    let (reader, _) = matched(ReaderQos::default().keep_last(2));
    for (seq, payload) in [b"A", b"B", b"C"].into_iter().enumerate() {
        reader.data_received(ReceivedDataSample::data(
            writer(1),
            KEY,
            seq as u64 + 1,
            payload.to_vec(),
        ));
    }
    assert_eq!(reader.shared.state.lock().chunks_in_use(), 2);

    let samples = reader.take_any(10).expect("take");
    let payloads: Vec<&[u8]> = samples.iter().map(|(p, _)| p.as_slice()).collect();
    assert_eq!(payloads, vec![&b"B"[..], &b"C"[..]]);
    assert_eq!(samples[0].1.sample_rank, 1);
    assert_eq!(samples[1].1.sample_rank, 0);
    assert_eq!(reader.shared.state.lock().chunks_in_use(), 0);
}

#[test]
fn test_sample_before_enable_is_dropped() {
    let topic = Arc::new(TopicDescription::new("t", "T", 1));
    let reader = DataReader::builder(topic, Arc::new(DetachedSubscriber))
        .build()
        .expect("build");
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, vec![1]));
    assert_eq!(reader.total_samples(), 0);
    assert!(matches!(reader.take_any(1), Err(Error::NotEnabled)));
}

#[test]
fn test_registration_sample_carries_no_data() {
    let (reader, _) = matched(ReaderQos::default());
    reader.data_received(ReceivedDataSample::registration(writer(1), KEY, 1));

    let samples = reader.read_any(10).expect("read");
    assert_eq!(samples.len(), 1);
    assert!(!samples[0].1.valid_data);
    assert!(samples[0].0.is_empty());
    assert_eq!(samples[0].1.instance_state, InstanceStateKind::Alive);
}

#[test]
fn test_read_marks_read_and_not_new() {
    let (reader, _) = matched(ReaderQos::default());
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, vec![1]));

    assert!(reader.have_view_states(ViewStateMask::NEW));
    let first = reader.read_any(10).expect("read");
    assert_eq!(first[0].1.sample_state, SampleState::NotRead);
    assert_eq!(first[0].1.view_state, ViewState::New);

    let second = reader.read_any(10).expect("read");
    assert_eq!(second[0].1.sample_state, SampleState::Read);
    assert_eq!(second[0].1.view_state, ViewState::NotNew);
    assert!(!reader.have_sample_states(SampleStateMask::NOT_READ));

    assert!(reader.read_next_sample().expect("read next").is_none());
}

#[test]
fn test_dispose_then_data_generation_ranks() {
    let (reader, _) = matched(ReaderQos::default().keep_last(10));
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, b"A".to_vec()));
    reader.data_received(ReceivedDataSample::dispose(writer(1), KEY));

    let handle = reader.lookup_instance(KEY).expect("instance");
    assert_eq!(
        reader.instance_state(handle),
        Some(InstanceStateKind::NotAliveDisposed)
    );

    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 2, b"B".to_vec()));
    assert_eq!(reader.instance_state(handle), Some(InstanceStateKind::Alive));

    let samples = reader.take_any(10).expect("take");
    assert_eq!(samples.len(), 2);
    let (a, b) = (&samples[0].1, &samples[1].1);
    assert_eq!(a.disposed_generation_count, 0);
    assert_eq!(b.disposed_generation_count, 1);
    assert_eq!((a.sample_rank, a.generation_rank, a.absolute_generation_rank), (1, 1, 1));
    assert_eq!((b.sample_rank, b.generation_rank, b.absolute_generation_rank), (0, 0, 0));
}

#[test]
fn test_unregister_last_writer_no_writers() {
    let (reader, _) = matched(ReaderQos::default());
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, vec![1]));
    reader.data_received(ReceivedDataSample::unregister(writer(1), KEY));

    let handle = reader.lookup_instance(KEY).expect("instance");
    assert_eq!(
        reader.instance_state(handle),
        Some(InstanceStateKind::NotAliveNoWriters)
    );
    assert!(reader.have_instance_states(InstanceStateMask::NOT_ALIVE));

    let alive_only = reader
        .read(
            10,
            SampleStateMask::ANY,
            ViewStateMask::ANY,
            InstanceStateMask::ALIVE,
        )
        .expect("read");
    assert!(alive_only.is_empty());
}

#[test]
fn test_expired_sample_is_dropped() {
    let clock = clock();
    let (reader, topic) = reader_with(ReaderQos::default(), clock.clone());
    topic.set_lifespan(Lifespan::from_millis(100));
    reader.add_associations(reader.guid(), &[WriterAssociation::new(writer(1))]);

    let stale = ReceivedDataSample::data(writer(1), KEY, 1, vec![1])
        .with_source_timestamp(clock.now() - Duration::from_millis(100));
    reader.data_received(stale);
    assert_eq!(reader.total_samples(), 0);
    assert!(reader.lookup_instance(KEY).is_none());

    let fresh = ReceivedDataSample::data(writer(1), KEY, 2, vec![2])
        .with_source_timestamp(clock.now() - Duration::from_millis(99));
    reader.data_received(fresh);
    assert_eq!(reader.total_samples(), 1);
}

#[test]
fn test_loaned_sample_survives_take() {
    let (reader, _) = matched(ReaderQos::default().keep_last(1));
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, b"X".to_vec()));

    let loans = reader
        .read_w_loan(
            1,
            SampleStateMask::ANY,
            ViewStateMask::ANY,
            InstanceStateMask::ANY,
        )
        .expect("loan");
    assert_eq!(reader.num_zero_copies(), 1);

    // Depth 1 cannot evict the loaned sample.
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 2, b"Y".to_vec()));
    assert_eq!(reader.total_samples(), 2);

    let handle = reader.lookup_instance(KEY).expect("instance");
    assert!(matches!(
        reader.release_instance(handle),
        Err(Error::PreconditionNotMet(_))
    ));

    // Taking a loaned sample hands out a copy; the loan keeps its chunk.
    let taken = reader.take_any(10).expect("take");
    let payloads: Vec<&[u8]> = taken.iter().map(|(p, _)| p.as_slice()).collect();
    assert_eq!(payloads, vec![&b"X"[..], &b"Y"[..]]);
    assert_eq!(&*loans[0], b"X");
    assert_eq!(reader.total_samples(), 0);
    assert_eq!(reader.shared.state.lock().chunks_in_use(), 1);
    assert_eq!(reader.num_zero_copies(), 1);

    drop(loans);
    assert_eq!(reader.shared.state.lock().chunks_in_use(), 0);
    assert_eq!(reader.num_zero_copies(), 0);
}

#[test]
fn test_release_instance_once_empty() {
    let (reader, _) = matched(ReaderQos::default());
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, vec![1]));
    let handle = reader.lookup_instance(KEY).expect("instance");

    reader.take_any(10).expect("take");
    reader.release_instance(handle).expect("release");
    assert!(reader.lookup_instance(KEY).is_none());
    assert!(matches!(
        reader.release_instance(handle),
        Err(Error::BadParameter(_))
    ));
}

#[test]
fn test_read_instance_unknown_handle() {
    let (reader, _) = matched(ReaderQos::default());
    let result = reader.read_instance(
        crate::dds::InstanceHandle::new(999),
        1,
        SampleStateMask::ANY,
        ViewStateMask::ANY,
        InstanceStateMask::ANY,
    );
    assert!(matches!(result, Err(Error::BadParameter(_))));
}

#[test]
fn test_take_clears_data_available() {
    let (reader, _) = matched(ReaderQos::default());
    reader.data_received(ReceivedDataSample::data(writer(1), KEY, 1, vec![1]));
    assert!(reader
        .get_status_changes()
        .contains(StatusMask::DATA_AVAILABLE));

    reader.take_any(10).expect("take");
    assert!(!reader
        .get_status_changes()
        .contains(StatusMask::DATA_AVAILABLE));
}

#[test]
fn test_cleanup_stops_timer_and_unmatches() {
    let (reader, _) = matched(ReaderQos::default().liveliness_automatic_millis(50));
    assert!(reader.shared.timer.is_running());
    assert_eq!(reader.get_matched_publications().expect("matched").len(), 1);

    reader.cleanup();
    assert!(!reader.shared.timer.is_running());
    assert!(reader.get_matched_publications().expect("matched").is_empty());
    assert!(matches!(reader.enable(), Err(Error::AlreadyDeleted)));
    assert!(matches!(reader.read_any(1), Err(Error::AlreadyDeleted)));
}
