//! logmetrics; a synthetic telemetry load generator for exercising
//! observability backends.
//!
//! [`logmetrics`] fabricates plausible container metrics and ships them as
//! Prometheus remote-write requests, or samples log lines and ships them as
//! plain text. Counters stay monotonic and histograms stay cumulative across
//! cycles, so what lands in your backend behaves like a real fleet.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use logmetrics::{
//!     generator::MetricGenerator,
//!     sender::{get_client, Sender, SenderOptions},
//! };
//!
//! # async fn run() -> Result<(), logmetrics::error::StdError> {
//! let generator = Arc::new(MetricGenerator::new(["api", "db"], "tenant-a"));
//! let sender = Sender::new(generator, get_client(|| None)?, SenderOptions::default())?;
//! tokio::spawn(sender.send_forever());
//! # Ok(())
//! # }
//! ```
//!
//! A benchmark of one generation cycle lives under `benches`.
//!
//! # Feature Flags
//!
//! * `ahash-hasher`: key the per-entity state map with ahash instead of std's SipHash.

pub mod aggregation;
pub mod config;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod plaintext;
pub mod random;
pub mod request;
pub mod sender;
pub mod series;
pub mod state;
pub mod types;

/// Internal generated types - ideally you shouldn't need to do much with them.
/// Nevertheless, they are exported in case you need them.
pub mod proto;
