use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;

use crate::error::GeneratorError;

/// A validated, ascending, duplicate-free set of bucket upper bounds.
///
/// Sorting happens once, here, so every histogram built from these bounds
/// emits its buckets in the same ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketBounds {
    bounds: Vec<OrderedFloat<f64>>,
}

impl BucketBounds {
    /// Bounds must be finite and there must be at least one. Duplicates collapse.
    pub fn new(bounds: impl IntoIterator<Item = f64>) -> Result<Self, GeneratorError> {
        let mut sorted = BTreeSet::new();
        for bound in bounds {
            if !bound.is_finite() {
                return Err(GeneratorError::invalid_argument(format!(
                    "histogram bucket bound must be finite, got {bound}"
                )));
            }
            sorted.insert(OrderedFloat(bound));
        }
        if sorted.is_empty() {
            return Err(GeneratorError::invalid_argument(
                "histogram needs at least one bucket bound",
            ));
        }
        Ok(Self {
            bounds: sorted.into_iter().collect(),
        })
    }

    /// Number of explicit buckets, excluding +Inf
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Always false for a constructed value; here for clippy.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Ascending bounds
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.bounds.iter().map(|bound| bound.into_inner())
    }
}

impl Default for BucketBounds {
    fn default() -> Self {
        Self {
            bounds: super::DEFAULT_BUCKET_BOUNDS
                .iter()
                .copied()
                .map(OrderedFloat)
                .collect(),
        }
    }
}

/// A cumulative histogram: each bucket counts every observation at or below its bound.
///
/// The implicit +Inf bucket is `count()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeHistogram {
    buckets: BTreeMap<OrderedFloat<f64>, u64>,
    sum: f64,
    count: u64,
}

impl CumulativeHistogram {
    /// An empty histogram over fixed bounds. The bounds cannot change afterward.
    pub fn new(bounds: &BucketBounds) -> Self {
        Self {
            buckets: bounds.bounds.iter().map(|bound| (*bound, 0)).collect(),
            sum: 0.0,
            count: 0,
        }
    }

    /// Record one finite observation.
    pub fn observe(&mut self, value: f64) -> Result<(), GeneratorError> {
        Self::check_observation(value)?;
        for (_bound, count) in self.buckets.range_mut(OrderedFloat(value)..) {
            *count += 1;
        }
        self.sum += value;
        self.count += 1;
        Ok(())
    }

    /// `(upper bound, cumulative count)` in ascending bound order.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.buckets
            .iter()
            .map(|(bound, count)| (bound.into_inner(), *count))
    }

    /// Sum of every observation so far
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of observations so far, which is also the +Inf bucket
    pub fn count(&self) -> u64 {
        self.count
    }

    pub(crate) fn check_observation(value: f64) -> Result<(), GeneratorError> {
        if !value.is_finite() {
            return Err(GeneratorError::invalid_argument(format!(
                "histogram observation must be finite, got {value}"
            )));
        }
        Ok(())
    }
}
