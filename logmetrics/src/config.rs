//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::{
    aggregation::BucketBounds,
    error::{GeneratorError, StdError},
    generator::{MetricGenerator, PlainTextGenerator},
    plaintext::DEFAULT_LINES,
    random::RandomSource,
    sender::SenderOptions,
};

/// Tenant header understood by Cortex, Mimir and Loki style collectors
pub const ORG_ID_HEADER: HeaderName = HeaderName::from_static("x-scope-orgid");

/// What to fabricate.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Prometheus remote-write metrics
    Metrics,
    /// Newline-delimited log lines
    Plaintext,
}

/// Synthetic telemetry load generator.
#[derive(Parser, Clone, Debug)]
#[command(name = "logmetrics", version, about)]
pub struct Config {
    /// Collector scheme and authority
    #[arg(long, env = "LOGMETRICS_ENDPOINT", default_value = "http://localhost:8080")]
    pub endpoint: String,

    /// What to send
    #[arg(long, value_enum, env = "LOGMETRICS_MODE", default_value_t = Mode::Metrics)]
    pub mode: Mode,

    /// Path on the collector; defaults per mode
    #[arg(long, env = "LOGMETRICS_PATH")]
    pub path: Option<String>,

    /// Entities to fabricate metrics for (comma-separated)
    #[arg(
        long,
        env = "LOGMETRICS_CONTAINERS",
        value_delimiter = ',',
        default_value = "api,worker,db"
    )]
    pub containers: Vec<String>,

    /// Organization / tenant id, placed in the orgid label and the X-Scope-OrgID header
    #[arg(long, env = "LOGMETRICS_ORG_ID", default_value = "anonymous")]
    pub org_id: String,

    /// Histogram bucket upper bounds (comma-separated); defaults to 0.1,0.5,1,5
    #[arg(long, env = "LOGMETRICS_BUCKETS", value_delimiter = ',')]
    pub buckets: Vec<f64>,

    /// Lines per request in plaintext mode
    #[arg(long, env = "LOGMETRICS_LINES_PER_CYCLE", default_value_t = 100)]
    pub lines_per_cycle: usize,

    /// File of candidate lines, one per line
    #[arg(long, env = "LOGMETRICS_LINES_FILE")]
    pub lines_file: Option<PathBuf>,

    /// A candidate line; repeatable
    #[arg(long = "line")]
    pub lines: Vec<String>,

    /// Milliseconds between requests, per worker
    #[arg(long, env = "LOGMETRICS_PERIOD_MS", default_value_t = 1000)]
    pub period_ms: u64,

    /// Concurrent senders sharing one generator
    #[arg(long, env = "LOGMETRICS_WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Request timeout in milliseconds; defaults per mode
    #[arg(long, env = "LOGMETRICS_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Extra request header as `name: value`; repeatable
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(HeaderName, HeaderValue)>,

    /// Seed for reproducible output; defaults to the clock
    #[arg(long, env = "LOGMETRICS_SEED")]
    pub seed: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, env = "LOGMETRICS_INSECURE")]
    pub insecure: bool,
}

impl Config {
    /// Sender settings, including the tenant header unless one was given explicitly.
    pub fn sender_options(&self) -> Result<SenderOptions, StdError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }
        if !headers.contains_key(&ORG_ID_HEADER) {
            headers.insert(ORG_ID_HEADER, HeaderValue::from_str(&self.org_id)?);
        }
        Ok(SenderOptions {
            endpoint: self.endpoint.clone(),
            path: self.path.clone(),
            headers,
            timeout: self.timeout_ms.map(Duration::from_millis),
            period: Duration::from_millis(self.period_ms.max(1)),
            workers: self.workers,
        })
    }

    /// Configured buckets, or the defaults when none were given.
    pub fn bucket_bounds(&self) -> Result<BucketBounds, GeneratorError> {
        if self.buckets.is_empty() {
            Ok(BucketBounds::default())
        } else {
            BucketBounds::new(self.buckets.iter().copied())
        }
    }

    /// Seeded when asked to be, otherwise from the clock.
    pub fn random_source(&self) -> RandomSource {
        match self.seed {
            Some(seed) => RandomSource::seeded(seed),
            None => RandomSource::new(),
        }
    }

    /// Lines from the file and `--line`, or the built-in pool when both are empty.
    pub fn candidate_lines(&self) -> Result<Vec<String>, std::io::Error> {
        let mut lines = Vec::new();
        if let Some(path) = &self.lines_file {
            lines.extend(
                std::fs::read_to_string(path)?
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_owned),
            );
        }
        lines.extend(self.lines.iter().cloned());
        if lines.is_empty() {
            lines.extend(DEFAULT_LINES.iter().map(|line| line.to_string()));
        }
        Ok(lines)
    }

    /// The metric generator this configuration describes
    pub fn metric_generator(&self) -> Result<MetricGenerator, GeneratorError> {
        if self.containers.is_empty() {
            return Err(GeneratorError::invalid_argument(
                "at least one container is required",
            ));
        }
        Ok(MetricGenerator::with_options(
            self.containers.iter().cloned(),
            self.org_id.clone(),
            self.bucket_bounds()?,
            self.random_source(),
        ))
    }

    /// The plaintext generator this configuration describes
    pub fn plaintext_generator(&self) -> Result<PlainTextGenerator, StdError> {
        Ok(PlainTextGenerator::new(
            self.lines_per_cycle,
            self.candidate_lines()?,
            self.random_source(),
        )?)
    }
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `name: value`, got `{raw}`"))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| e.to_string())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| e.to_string())?;
    Ok((name, value))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use clap::Parser;

    use crate::{generator::Generator, request::Request};

    use super::{Config, Mode};

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("logmetrics").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test_log::test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(Mode::Metrics, config.mode);
        assert_eq!(vec!["api", "worker", "db"], config.containers);
        assert!(config.buckets.is_empty());

        let options = config.sender_options().expect("valid options");
        assert_eq!("anonymous", options.headers["x-scope-orgid"]);
        assert_eq!(Duration::from_secs(1), options.period);
        assert_eq!(None, options.timeout);
        assert_eq!(
            vec![0.1, 0.5, 1.0, 5.0],
            config
                .bucket_bounds()
                .expect("default bounds")
                .iter()
                .collect::<Vec<_>>()
        );
    }

    #[test_log::test]
    fn metrics_flags() {
        let config = parse(&[
            "--containers",
            "a,b",
            "--org-id",
            "tenant-7",
            "--buckets",
            "2,0.25",
            "--seed",
            "5",
            "--header",
            "Authorization: Bearer abc",
            "--timeout-ms",
            "250",
        ]);
        let options = config.sender_options().expect("valid options");
        assert_eq!("tenant-7", options.headers["x-scope-orgid"]);
        assert_eq!("Bearer abc", options.headers["authorization"]);
        assert_eq!(Some(Duration::from_millis(250)), options.timeout);

        let generator = config.metric_generator().expect("valid generator");
        assert_eq!(vec!["a", "b"], generator.entities());
        assert_eq!(
            vec![0.25, 2.0],
            generator.state().bounds().iter().collect::<Vec<_>>()
        );
        assert_eq!(2 * 14, generator.generate().expect("generates").size());
    }

    #[test_log::test]
    fn explicit_tenant_header_wins() {
        let config = parse(&["--org-id", "label-tenant", "--header", "X-Scope-OrgID: other"]);
        let options = config.sender_options().expect("valid options");
        assert_eq!(1, options.headers.get_all("x-scope-orgid").iter().count());
        assert_eq!("other", options.headers["x-scope-orgid"]);
    }

    #[test_log::test]
    fn plaintext_flags() {
        let config = parse(&[
            "--mode",
            "plaintext",
            "--lines-per-cycle",
            "3",
            "--line",
            "hello",
            "--line",
            "world",
        ]);
        assert_eq!(Mode::Plaintext, config.mode);
        let generator = config.plaintext_generator().expect("valid generator");
        let payload = generator
            .generate()
            .expect("generates")
            .serialize()
            .expect("serializes");
        let text = std::str::from_utf8(&payload).expect("utf-8");
        assert!(text.lines().all(|line| line == "hello" || line == "world"));
        assert_eq!(3, text.lines().count());
    }

    #[test_log::test]
    fn builtin_lines_when_none_given() {
        let lines = parse(&[]).candidate_lines().expect("no file to read");
        assert!(!lines.is_empty());
    }

    #[test_log::test]
    fn bad_input_is_rejected() {
        let args = ["logmetrics", "--header", "no-colon-here"];
        assert!(Config::try_parse_from(args).is_err());
        assert!(parse(&["--buckets", "1,inf"]).bucket_bounds().is_err());
    }
}
