/// One cycle's `response_size_bytes` summary.
///
/// Nothing here accumulates across cycles. `sum` and `count` are synthetic
/// placeholders (`p99 * 10` and `100`) with no statistical tie to the quantiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummarySnapshot {
    /// 0.5 quantile
    pub p50: f64,
    /// 0.9 quantile
    pub p90: f64,
    /// 0.99 quantile
    pub p99: f64,
    /// placeholder sum
    pub sum: f64,
    /// placeholder count
    pub count: f64,
}

impl SummarySnapshot {
    /// Derive the placeholder `sum` and `count` from the three quantiles.
    pub fn from_quantiles(p50: f64, p90: f64, p99: f64) -> Self {
        Self {
            p50,
            p90,
            p99,
            sum: p99 * 10.0,
            count: 100.0,
        }
    }

    /// `(quantile label, value)` in emission order.
    pub fn quantiles(&self) -> [(&'static str, f64); 3] {
        [("0.5", self.p50), ("0.9", self.p90), ("0.99", self.p99)]
    }
}
