//! Generators own their configuration and state and vend one request per call.

use std::time::{Duration, SystemTime};

use crate::{
    aggregation::BucketBounds,
    encoding,
    error::GeneratorError,
    plaintext::{self, PlainTextRequest},
    random::RandomSource,
    request::{RemoteWriteRequest, Request},
    series::SeriesBuilder,
    state::MetricStateStore,
    types::EpochTime,
};

/// Something a sender can call once per cycle.
///
/// Generation is pure compute over in-memory state: it never blocks and never
/// does I/O. The wire format a generator produces dictates the headers a sender
/// must attach, so those live here too.
pub trait Generator: Send + Sync {
    /// What one call produces
    type Request: Request + Send;

    /// Default collector path
    const PATH: &'static str;
    /// `Content-Type` of the serialized request
    const CONTENT_TYPE: &'static str;
    /// `Content-Encoding` of the serialized request, if any
    const CONTENT_ENCODING: Option<&'static str> = None;
    /// Further headers the wire format requires
    const PROTOCOL_HEADERS: &'static [(&'static str, &'static str)] = &[];
    /// How long a sender should wait for the collector by default
    const DEFAULT_TIMEOUT: Duration;

    /// Produce this cycle's request.
    fn generate(&self) -> Result<Self::Request, GeneratorError>;
}

/// Fabricates gauges, a counter, a histogram and a summary for each entity.
///
/// Each instance has its own state and its own random source, so several
/// generators can run side by side without sharing anything.
#[derive(Debug)]
pub struct MetricGenerator {
    entities: Vec<String>,
    series_builder: SeriesBuilder,
    state: MetricStateStore,
    random: RandomSource,
}

impl MetricGenerator {
    /// Default buckets, clock-seeded randomness.
    pub fn new(
        entities: impl IntoIterator<Item = impl Into<String>>,
        org_id: impl Into<String>,
    ) -> Self {
        Self::with_options(entities, org_id, BucketBounds::default(), RandomSource::new())
    }

    /// Full control over buckets and the random source.
    ///
    /// Entities are an ordered set: repeats after the first occurrence are dropped.
    pub fn with_options(
        entities: impl IntoIterator<Item = impl Into<String>>,
        org_id: impl Into<String>,
        bounds: BucketBounds,
        random: RandomSource,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for entity in entities {
            let entity = entity.into();
            if !unique.contains(&entity) {
                unique.push(entity);
            }
        }
        Self {
            entities: unique,
            series_builder: SeriesBuilder::new(org_id),
            state: MetricStateStore::new(bounds),
            random,
        }
    }

    /// Generate with an explicit timestamp, for reproducible output.
    pub fn generate_at(&self, timestamp_millis: i64) -> Result<RemoteWriteRequest, GeneratorError> {
        self.series_builder
            .build(self.entities.as_slice(), &self.state, &self.random, timestamp_millis)
            .map(RemoteWriteRequest::new)
    }

    /// The entities, in emission order
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// The organization identifier placed on every series
    pub fn org_id(&self) -> &str {
        self.series_builder.org_id()
    }

    /// Read access to the accumulated state
    pub fn state(&self) -> &MetricStateStore {
        &self.state
    }
}

impl Generator for MetricGenerator {
    type Request = RemoteWriteRequest;

    const PATH: &'static str = "/api/v1/prom/remote/write";
    const CONTENT_TYPE: &'static str = encoding::CONTENT_TYPE;
    const CONTENT_ENCODING: Option<&'static str> = Some(encoding::CONTENT_ENCODING);
    const PROTOCOL_HEADERS: &'static [(&'static str, &'static str)] =
        &[encoding::REMOTE_WRITE_VERSION_HEADER];
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    fn generate(&self) -> Result<Self::Request, GeneratorError> {
        self.generate_at(SystemTime::now().millis_since_epoch())
    }
}

/// Samples log lines from a candidate pool.
#[derive(Debug)]
pub struct PlainTextGenerator {
    lines_per_cycle: usize,
    pool: Vec<String>,
    random: RandomSource,
}

impl PlainTextGenerator {
    /// Fails when lines are requested but the pool is empty.
    pub fn new(
        lines_per_cycle: usize,
        pool: impl IntoIterator<Item = impl Into<String>>,
        random: RandomSource,
    ) -> Result<Self, GeneratorError> {
        let pool: Vec<String> = pool.into_iter().map(Into::into).collect();
        if pool.is_empty() && lines_per_cycle > 0 {
            return Err(GeneratorError::invalid_argument(
                "plaintext generator needs at least one candidate line",
            ));
        }
        Ok(Self {
            lines_per_cycle,
            pool,
            random,
        })
    }

    /// Lines in every request
    pub fn lines_per_cycle(&self) -> usize {
        self.lines_per_cycle
    }
}

impl Generator for PlainTextGenerator {
    type Request = PlainTextRequest;

    const PATH: &'static str = "/test-lines";
    const CONTENT_TYPE: &'static str = "text/plain";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    fn generate(&self) -> Result<Self::Request, GeneratorError> {
        plaintext::build(self.lines_per_cycle, self.pool.as_slice(), &self.random)
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use crate::{
        aggregation::BucketBounds,
        encoding,
        error::GeneratorError,
        random::RandomSource,
        request::Request,
        series::{series_per_entity, HTTP_REQUESTS_TOTAL},
        types::{label_value, METRIC_NAME_LABEL},
    };

    use super::{Generator, MetricGenerator, PlainTextGenerator};

    fn seeded(seed: u64) -> MetricGenerator {
        MetricGenerator::with_options(
            ["web", "worker"],
            "tenant-a",
            BucketBounds::default(),
            RandomSource::seeded(seed),
        )
    }

    #[test_log::test]
    fn one_cycle_per_generate() {
        let generator = seeded(1);
        let request = generator.generate().expect("generates");
        assert_eq!(2 * series_per_entity(4), request.size());

        let decoded = encoding::decode(&request.serialize().expect("serializes"))
            .expect("decodes");
        assert_eq!(request.timeseries(), decoded.timeseries.as_slice());
        assert_eq!(2, generator.state().len());
    }

    #[test_log::test]
    fn generators_are_independent() {
        let first = seeded(9);
        let second = seeded(9);
        assert_eq!(
            first.generate_at(10).expect("generates"),
            second.generate_at(10).expect("generates")
        );

        // advancing one leaves the other where it was
        first.generate_at(11).expect("generates");
        assert_eq!(
            Some(1),
            second.state().histogram("web").map(|histogram| histogram.count())
        );
        assert_eq!(
            Some(2),
            first.state().histogram("web").map(|histogram| histogram.count())
        );
    }

    #[test_log::test]
    fn entities_are_an_ordered_set() {
        let generator = MetricGenerator::new(["b", "a", "b", "c", "a"], "tenant-a");
        assert_eq!(vec!["b", "a", "c"], generator.entities());
        assert_eq!("tenant-a", generator.org_id());
    }

    #[test_log::test]
    fn shared_generator_keeps_counters_monotonic() {
        let generator = Arc::new(seeded(5));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        generator.generate().expect("generates");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker should not panic");
        }
        let histogram = generator.state().histogram("web").expect("entity exists");
        assert_eq!(200, histogram.count());

        let counter = generator.state().counter("web").expect("entity exists");
        let next = generator.generate().expect("generates");
        let emitted = next
            .timeseries()
            .iter()
            .find(|series| {
                label_value(&series.labels, METRIC_NAME_LABEL) == Some(HTTP_REQUESTS_TOTAL)
            })
            .map(|series| series.samples[0].value)
            .expect("counter is emitted");
        assert!(emitted > counter);
    }

    #[test_log::test]
    fn plaintext_generator() {
        let generator = PlainTextGenerator::new(3, ["x", "y"], RandomSource::seeded(2))
            .expect("pool has lines");
        assert_eq!(3, generator.lines_per_cycle());
        let request = generator.generate().expect("generates");
        assert_eq!(3, request.size());
        assert_eq!(6, request.serialize().expect("serializes").len());
    }

    #[test_log::test]
    fn plaintext_generator_needs_a_pool() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            PlainTextGenerator::new(1, empty.clone(), RandomSource::seeded(3)),
            Err(GeneratorError::InvalidArgument(_))
        ));
        let idle = PlainTextGenerator::new(0, empty, RandomSource::seeded(3))
            .expect("nothing requested");
        assert_eq!(0, idle.generate().expect("generates").size());
    }
}
