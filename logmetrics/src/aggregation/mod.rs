//! Per-entity accumulators and the per-cycle summary record.

mod counter;
mod histogram;
mod summary;

pub use counter::MonotonicCounter;
pub use histogram::{BucketBounds, CumulativeHistogram};
pub use summary::SummarySnapshot;

/// Bucket upper bounds used when nothing else is configured.
pub const DEFAULT_BUCKET_BOUNDS: [f64; 4] = [0.1, 0.5, 1.0, 5.0];
