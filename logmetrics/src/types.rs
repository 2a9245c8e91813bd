use std::time::{SystemTime, UNIX_EPOCH};

use crate::proto::prometheus::{Label, Sample, TimeSeries};

/// Label carrying the metric name
pub const METRIC_NAME_LABEL: &str = "__name__";
/// Label carrying the entity name
pub const CONTAINER_LABEL: &str = "container";
/// Label carrying the organization / tenant identifier
pub const ORG_ID_LABEL: &str = "orgid";
/// Label identifying the producer of the data
pub const SENDER_LABEL: &str = "sender";
/// Fixed value of the producer label
pub const SENDER: &str = "logmetrics";
/// Histogram bucket upper bound label
pub const LE_LABEL: &str = "le";
/// Summary quantile label
pub const QUANTILE_LABEL: &str = "quantile";

/// A provider of unix epoch millis
pub trait EpochTime {
    /// return millis since the unix epoch
    fn millis_since_epoch(&self) -> i64;
}

impl EpochTime for SystemTime {
    fn millis_since_epoch(&self) -> i64 {
        self.duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis() as i64)
            .unwrap_or_default()
    }
}

/// An ordered set of labels identifying one time series.
///
/// Extending a set never reorders it, so series built from a shared base keep the
/// base labels first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Create a label set from name/value pairs, in order.
    pub fn new(labels: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        let mut set = Self::default();
        for (name, value) in labels {
            set.push(name, value);
        }
        set
    }

    /// A copy of this set with one more label at the end.
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut set = self.clone();
        set.push(name, value);
        set
    }

    /// A copy of this set carrying `__name__`.
    pub fn named(&self, metric: impl Into<String>) -> Self {
        self.with(METRIC_NAME_LABEL, metric)
    }

    /// Consume the set into a single-sample series.
    pub fn into_series(self, timestamp_millis: i64, value: f64) -> TimeSeries {
        TimeSeries {
            labels: self.labels,
            samples: vec![Sample {
                value,
                timestamp: timestamp_millis,
            }],
        }
    }

    /// The labels, in order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Value of the label called `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        label_value(&self.labels, name)
    }

    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        debug_assert!(
            self.get(&name).is_none(),
            "label {name} is already in the set"
        );
        self.labels.push(Label {
            name,
            value: value.into(),
        });
    }
}

/// Value of the label called `name`, if present.
pub fn label_value<'a>(labels: &'a [Label], name: &str) -> Option<&'a str> {
    labels
        .iter()
        .find(|label| label.name == name)
        .map(|label| label.value.as_str())
}

/// Render a bucket bound the way it appears in an `le` label.
pub fn format_bound(bound: f64) -> String {
    format!("{bound}")
}

#[cfg(test)]
mod test {
    use std::time::{Duration, UNIX_EPOCH};

    use super::{format_bound, EpochTime, LabelSet};

    #[test_log::test]
    fn extending_keeps_base_order() {
        let base = LabelSet::new([("container", "web"), ("orgid", "tenant")]);
        let named = base.named("cpu_usage").with("le", "0.5");
        let names: Vec<&str> = named
            .labels()
            .iter()
            .map(|label| label.name.as_str())
            .collect();
        assert_eq!(vec!["container", "orgid", "__name__", "le"], names);
        assert_eq!(2, base.labels().len(), "the base is untouched");
        assert_eq!(Some("cpu_usage"), named.get("__name__"));
    }

    #[test_log::test]
    fn series_carry_one_sample() {
        let series = LabelSet::new([("a", "b")]).into_series(1234, 5.5);
        assert_eq!(1, series.samples.len());
        assert_eq!(1234, series.samples[0].timestamp);
        assert_eq!(5.5, series.samples[0].value);
    }

    #[test_log::test]
    fn bounds_render_like_prometheus() {
        assert_eq!("0.1", format_bound(0.1));
        assert_eq!("0.5", format_bound(0.5));
        assert_eq!("1", format_bound(1.0));
        assert_eq!("5", format_bound(5.0));
        assert_eq!("2.5", format_bound(2.5));
    }

    #[test_log::test]
    fn epoch_millis() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(1_700_000_000_123, time.millis_since_epoch());
    }
}
