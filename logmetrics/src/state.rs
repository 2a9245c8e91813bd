//! Per-entity counter and histogram state shared by every cycle of a generator.

#[cfg(not(feature = "ahash-hasher"))]
use std::collections::hash_map::RandomState;

#[cfg(feature = "ahash-hasher")]
use ahash::RandomState;

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{
    aggregation::{BucketBounds, CumulativeHistogram, MonotonicCounter},
    error::GeneratorError,
};

/// Alias for the default hasher, selected by the ahash-hasher crate feature
pub(crate) type Hasher = RandomState;

#[derive(Debug, Clone)]
struct EntityState {
    counter: MonotonicCounter,
    histogram: CumulativeHistogram,
}

/// What one entity looks like right after a cycle's mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// `http_requests_total` after the increment
    pub counter: f64,
    /// latency histogram after the observation
    pub histogram: CumulativeHistogram,
}

/// Mutable per-entity state.
///
/// Entities are created lazily on first reference and live as long as the store.
/// Every read-modify-write happens under one mutex, so the store can be shared by
/// several sender workers. The bucket bounds are fixed when the store is made, which
/// fixes them for every entity it will ever hold.
#[derive(Debug)]
pub struct MetricStateStore {
    bounds: BucketBounds,
    entities: Mutex<HashMap<String, EntityState, Hasher>>,
}

impl Default for MetricStateStore {
    fn default() -> Self {
        Self::new(BucketBounds::default())
    }
}

impl MetricStateStore {
    /// A store whose histograms all use `bounds`.
    pub fn new(bounds: BucketBounds) -> Self {
        Self {
            bounds,
            entities: Mutex::new(HashMap::with_hasher(Hasher::default())),
        }
    }

    /// The bucket bounds every entity's histogram uses
    pub fn bounds(&self) -> &BucketBounds {
        &self.bounds
    }

    /// Create zeroed state for `name` if it is not there yet.
    pub fn ensure_entity(&self, name: &str) {
        let mut entities = self.lock();
        self.entry(&mut entities, name);
    }

    /// Add `delta` to the entity's counter and return the new value.
    pub fn increment_counter(&self, name: &str, delta: f64) -> Result<f64, GeneratorError> {
        MonotonicCounter::check_delta(delta)?;
        let mut entities = self.lock();
        self.entry(&mut entities, name).counter.increment(delta)
    }

    /// Record `value` into the entity's histogram and return a copy of it.
    pub fn observe_histogram(
        &self,
        name: &str,
        value: f64,
    ) -> Result<CumulativeHistogram, GeneratorError> {
        CumulativeHistogram::check_observation(value)?;
        let mut entities = self.lock();
        let state = self.entry(&mut entities, name);
        state.histogram.observe(value)?;
        Ok(state.histogram.clone())
    }

    /// One cycle's worth of mutation for an entity, applied as a unit.
    ///
    /// Both arguments are validated before anything changes, so a failure leaves the
    /// entity exactly as it was.
    pub fn record_cycle(
        &self,
        name: &str,
        counter_delta: f64,
        observation: f64,
    ) -> Result<EntitySnapshot, GeneratorError> {
        MonotonicCounter::check_delta(counter_delta)?;
        CumulativeHistogram::check_observation(observation)?;

        let mut entities = self.lock();
        let state = self.entry(&mut entities, name);
        let counter = state.counter.increment(counter_delta)?;
        state.histogram.observe(observation)?;
        Ok(EntitySnapshot {
            counter,
            histogram: state.histogram.clone(),
        })
    }

    /// The entity's counter, if the entity exists.
    pub fn counter(&self, name: &str) -> Option<f64> {
        self.lock().get(name).map(|state| state.counter.value())
    }

    /// A copy of the entity's histogram, if the entity exists.
    pub fn histogram(&self, name: &str) -> Option<CumulativeHistogram> {
        self.lock().get(name).map(|state| state.histogram.clone())
    }

    /// Number of entities seen so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True before any entity has been referenced
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn entry<'a>(
        &self,
        entities: &'a mut HashMap<String, EntityState, Hasher>,
        name: &str,
    ) -> &'a mut EntityState {
        entities
            .entry(name.to_owned())
            .or_insert_with(|| EntityState {
                counter: MonotonicCounter::default(),
                histogram: CumulativeHistogram::new(&self.bounds),
            })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, EntityState, Hasher>> {
        self.entities
            .lock()
            .expect("local mutex should not be poisoned")
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use crate::{aggregation::BucketBounds, error::GeneratorError};

    use super::MetricStateStore;

    #[test_log::test]
    fn ensure_entity_is_idempotent() {
        let store = MetricStateStore::default();
        assert!(store.is_empty());
        store.ensure_entity("web");
        store.increment_counter("web", 2.0).expect("positive delta");
        store.ensure_entity("web");
        assert_eq!(1, store.len());
        assert_eq!(Some(2.0), store.counter("web"));

        let histogram = store.histogram("web").expect("entity exists");
        assert_eq!(0, histogram.count());
        assert!(histogram.buckets().all(|(_, count)| count == 0));
    }

    #[test_log::test]
    fn state_is_created_lazily() {
        let store = MetricStateStore::default();
        assert_eq!(None, store.counter("db"));
        let histogram = store.observe_histogram("db", 0.3).expect("finite value");
        assert_eq!(1, histogram.count());
        assert_eq!(Some(0.0), store.counter("db"));
    }

    #[test_log::test]
    fn counter_rejects_non_positive_delta() {
        let store = MetricStateStore::default();
        assert!(matches!(
            store.increment_counter("web", 0.0),
            Err(GeneratorError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.increment_counter("web", -4.0),
            Err(GeneratorError::InvalidArgument(_))
        ));
    }

    #[test_log::test]
    fn failed_cycle_leaves_entity_untouched() {
        let store = MetricStateStore::default();
        store.record_cycle("web", 1.0, 0.2).expect("valid cycle");

        assert!(store.record_cycle("web", 1.0, f64::NAN).is_err());
        assert!(store.record_cycle("web", -1.0, 0.2).is_err());

        assert_eq!(Some(1.0), store.counter("web"));
        assert_eq!(1, store.histogram("web").expect("entity exists").count());
    }

    #[test_log::test]
    fn entities_share_the_store_bounds() {
        let bounds = BucketBounds::new([0.25, 2.5]).expect("valid bounds");
        let store = MetricStateStore::new(bounds.clone());
        let snapshot = store.record_cycle("web", 3.0, 1.0).expect("valid cycle");
        assert_eq!(3.0, snapshot.counter);
        assert_eq!(
            bounds.iter().collect::<Vec<_>>(),
            snapshot
                .histogram
                .buckets()
                .map(|(bound, _)| bound)
                .collect::<Vec<_>>()
        );
        assert_eq!(&bounds, store.bounds());
    }

    #[test_log::test]
    fn concurrent_mutation_is_not_lost() {
        let store = Arc::new(MetricStateStore::default());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        store.record_cycle("web", 1.0, 0.05).expect("valid cycle");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker should not panic");
        }

        assert_eq!(Some(8000.0), store.counter("web"));
        let histogram = store.histogram("web").expect("entity exists");
        assert_eq!(8000, histogram.count());
        assert!(histogram.buckets().all(|(_, count)| count == 8000));
    }
}
