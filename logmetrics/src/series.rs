//! Turns per-entity state into one cycle's batch of labeled time series.

use crate::{
    aggregation::SummarySnapshot,
    error::GeneratorError,
    proto::prometheus::TimeSeries,
    random::RandomSource,
    state::MetricStateStore,
    types::{
        format_bound, LabelSet, CONTAINER_LABEL, LE_LABEL, ORG_ID_LABEL, QUANTILE_LABEL, SENDER,
        SENDER_LABEL,
    },
};

/// cpu gauge
pub const CPU_USAGE: &str = "cpu_usage";
/// memory gauge
pub const RAM_USAGE: &str = "ram_usage";
/// network gauge
pub const NETWORK_USAGE: &str = "network_usage";
/// the counter
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// the histogram family
pub const REQUEST_LATENCY_SECONDS: &str = "request_latency_seconds";
/// the summary family
pub const RESPONSE_SIZE_BYTES: &str = "response_size_bytes";

/// (name, baseline modulus, noise half-width) for each gauge, in emission order.
const GAUGES: [(&str, i64, i64); 3] = [
    (CPU_USAGE, 100, 10),
    (RAM_USAGE, 1_000, 100),
    (NETWORK_USAGE, 1_000_000, 1_000),
];

/// 3 gauges, 1 counter, +Inf/_sum/_count and 3 quantiles/_sum/_count.
const FIXED_SERIES_PER_ENTITY: usize = 3 + 1 + 3 + 5;

/// How many series one entity contributes to a cycle.
pub const fn series_per_entity(bucket_count: usize) -> usize {
    FIXED_SERIES_PER_ENTITY + bucket_count
}

/// A reproducible per-entity baseline: CRC-32 (IEEE) of the name.
pub fn stable_base(entity: &str) -> i64 {
    crc32fast::hash(entity.as_bytes()) as i64
}

/// Builds the series for one generation cycle.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    org_id: String,
}

impl SeriesBuilder {
    /// `org_id` lands in the `orgid` label of every series.
    pub fn new(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
        }
    }

    /// The organization identifier
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Mutate each entity's state once and emit its series, in entity order.
    ///
    /// Either the whole batch comes back or an error does. Entities before a failing
    /// one keep their mutations; there is no rollback.
    pub fn build(
        &self,
        entities: &[impl AsRef<str>],
        store: &MetricStateStore,
        random: &RandomSource,
        timestamp_millis: i64,
    ) -> Result<Vec<TimeSeries>, GeneratorError> {
        let mut series =
            Vec::with_capacity(entities.len() * series_per_entity(store.bounds().len()));
        for entity in entities {
            self.build_entity(
                entity.as_ref(),
                store,
                random,
                timestamp_millis,
                &mut series,
            )?;
        }
        Ok(series)
    }

    fn build_entity(
        &self,
        entity: &str,
        store: &MetricStateStore,
        random: &RandomSource,
        timestamp: i64,
        series: &mut Vec<TimeSeries>,
    ) -> Result<(), GeneratorError> {
        let base = stable_base(entity);
        let labels = LabelSet::new([
            (CONTAINER_LABEL, entity),
            (ORG_ID_LABEL, self.org_id.as_str()),
            (SENDER_LABEL, SENDER),
        ]);

        for (name, modulus, noise) in GAUGES {
            let value = (base % modulus + random.random_int(noise * 2) - noise).max(0);
            series.push(labels.named(name).into_series(timestamp, value as f64));
        }

        let delta = (random.random_int(5) + 1) as f64;
        let latency = (random.random_float() * 2.0).abs();
        let snapshot = store.record_cycle(entity, delta, latency)?;

        series.push(
            labels
                .named(HTTP_REQUESTS_TOTAL)
                .into_series(timestamp, snapshot.counter),
        );

        let histogram = &snapshot.histogram;
        let histogram_labels = labels.named(REQUEST_LATENCY_SECONDS);
        for (bound, count) in histogram.buckets() {
            series.push(
                histogram_labels
                    .with(LE_LABEL, format_bound(bound))
                    .into_series(timestamp, count as f64),
            );
        }
        series.push(
            histogram_labels
                .with(LE_LABEL, "+Inf")
                .into_series(timestamp, histogram.count() as f64),
        );
        series.push(
            labels
                .named(format!("{REQUEST_LATENCY_SECONDS}_sum"))
                .into_series(timestamp, histogram.sum()),
        );
        series.push(
            labels
                .named(format!("{REQUEST_LATENCY_SECONDS}_count"))
                .into_series(timestamp, histogram.count() as f64),
        );

        let summary = summary_snapshot(base, random);
        let summary_labels = labels.named(RESPONSE_SIZE_BYTES);
        for (quantile, value) in summary.quantiles() {
            series.push(
                summary_labels
                    .with(QUANTILE_LABEL, quantile)
                    .into_series(timestamp, value),
            );
        }
        series.push(
            labels
                .named(format!("{RESPONSE_SIZE_BYTES}_sum"))
                .into_series(timestamp, summary.sum),
        );
        series.push(
            labels
                .named(format!("{RESPONSE_SIZE_BYTES}_count"))
                .into_series(timestamp, summary.count),
        );
        Ok(())
    }
}

/// Fresh quantiles each cycle: p50 from the baseline, then widening multipliers.
fn summary_snapshot(base: i64, random: &RandomSource) -> SummarySnapshot {
    let p50 = (base % 1_000 + random.random_int(500)) as f64;
    let p90 = p50 * (1.5 + random.random_float());
    let p99 = p90 * (1.2 + random.random_float());
    SummarySnapshot::from_quantiles(p50, p90, p99)
}
