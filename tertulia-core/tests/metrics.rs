//! Counters emitted by session mutations when the `metrics` feature is on.
#![cfg(feature = "metrics")]

mod common;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use rstest::rstest;
use tertulia_core::{PostId, Session, TertuliaError};

#[derive(Debug, Default)]
struct Tally(AtomicU64);

impl CounterFn for Tally {
    fn increment(&self, value: u64) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }

    fn absolute(&self, value: u64) {
        self.0.fetch_max(value, Ordering::Relaxed);
    }
}

/// Keeps one running total per counter name.
#[derive(Debug, Default)]
struct CountingRecorder {
    counters: Mutex<HashMap<String, Arc<Tally>>>,
}

impl CountingRecorder {
    fn count(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .expect("counter map lock must not be poisoned")
            .get(name)
            .map_or(0, |tally| tally.0.load(Ordering::Relaxed))
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let mut counters = self
            .counters
            .lock()
            .expect("counter map lock must not be poisoned");
        let tally = counters.entry(key.name().to_owned()).or_default();
        Counter::from_arc(Arc::clone(tally))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

#[rstest]
fn mutations_increment_their_counters() -> Result<(), TertuliaError> {
    let recorder = CountingRecorder::default();
    metrics::with_local_recorder(&recorder, || -> Result<(), TertuliaError> {
        let mut session = Session::load(common::network())?;
        session.create_community("Chess", &["a", "b"])?;
        let post = session.create_post("a", "hello")?;
        session.register_like("b", post)?;
        session.register_like("c", post)?;

        let duplicate = session.register_like("b", post);
        assert!(matches!(duplicate, Err(TertuliaError::DuplicateLike { .. })));
        let unknown = session.register_like("b", PostId::new(99));
        assert!(unknown.is_err());
        Ok(())
    })?;

    assert_eq!(recorder.count("tertulia_communities_created"), 1);
    assert_eq!(recorder.count("tertulia_posts_created"), 1);
    assert_eq!(recorder.count("tertulia_likes_registered"), 2);
    assert_eq!(recorder.count("tertulia_likes_rejected"), 1);
    Ok(())
}
