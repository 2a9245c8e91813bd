//! Types for shipping generated requests to a collector

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use http::{
    header::{CONTENT_ENCODING, CONTENT_TYPE},
    HeaderMap, Method, StatusCode, Uri,
};
use http_body_util::{BodyExt, Full};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::{error::GeneratorError, generator::Generator, request::Request};

mod client;

pub use client::{get_client, webpki_trust, HttpClient};

/// Errors from one send attempt. None of them stop a running sender.
#[derive(Error, Debug)]
pub enum SendError {
    /// The generator could not produce or serialize a request.
    #[error(transparent)]
    Generate(#[from] GeneratorError),

    /// Endpoint and path do not make a valid uri.
    #[error("invalid collector uri: {0}")]
    Uri(#[from] http::uri::InvalidUri),

    /// The http request could not be assembled.
    #[error("could not build request: {0}")]
    Request(#[from] http::Error),

    /// Connecting or exchanging with the collector failed.
    #[error("request failed: {0}")]
    Client(#[from] hyper_util::client::legacy::Error),

    /// The response body could not be read.
    #[error("could not read response: {0}")]
    Body(#[from] hyper::Error),

    /// The collector took longer than the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The collector answered with a non-2xx status.
    #[error("collector responded {status}: {body}")]
    Status {
        /// response status
        status: StatusCode,
        /// response body, lossily decoded
        body: String,
    },
}

/// How and where a sender ships requests.
#[derive(Debug, Clone)]
pub struct SenderOptions {
    /// Scheme and authority of the collector, e.g. `http://localhost:8080`
    pub endpoint: String,
    /// Overrides the generator's default path
    pub path: Option<String>,
    /// Sent with every request, after the format headers
    pub headers: HeaderMap,
    /// Overrides the generator's default timeout
    pub timeout: Option<Duration>,
    /// Time between sends, per worker
    pub period: Duration,
    /// Concurrent send loops sharing one generator
    pub workers: usize,
}

impl Default for SenderOptions {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            path: None,
            headers: HeaderMap::new(),
            timeout: None,
            period: Duration::from_secs(1),
            workers: 1,
        }
    }
}

/// What a successful send shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    /// logical records in the request
    pub records: usize,
    /// bytes on the wire
    pub bytes: usize,
    /// collector status
    pub status: StatusCode,
}

/// Periodically generates requests and POSTs them to a collector.
pub struct Sender<TGenerator> {
    generator: Arc<TGenerator>,
    client: HttpClient,
    uri: Uri,
    headers: HeaderMap,
    timeout: Duration,
    period: Duration,
    workers: usize,
}

impl<TGenerator> Sender<TGenerator>
where
    TGenerator: Generator + 'static,
{
    /// Create a new sender for a generator. The generator can be shared with other senders.
    pub fn new(
        generator: Arc<TGenerator>,
        client: HttpClient,
        options: SenderOptions,
    ) -> Result<Self, SendError> {
        let path = options.path.as_deref().unwrap_or(TGenerator::PATH);
        let uri: Uri = format!("{}{}", options.endpoint.trim_end_matches('/'), path).parse()?;
        Ok(Self {
            generator,
            client,
            uri,
            headers: options.headers,
            timeout: options.timeout.unwrap_or(TGenerator::DEFAULT_TIMEOUT),
            period: options.period,
            workers: options.workers.max(1),
        })
    }

    /// Where requests go
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Generate one request and deliver it.
    pub async fn send_once(&self) -> Result<SendReport, SendError> {
        let request = self.generator.generate()?;
        let records = request.size();
        let payload = request.serialize()?;
        let bytes = payload.len();

        let http_request = self.http_request(payload)?;
        let (status, body) = tokio::time::timeout(self.timeout, async {
            let response = self.client.request(http_request).await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            Ok::<_, SendError>((status, body))
        })
        .await
        .map_err(|_elapsed| SendError::Timeout(self.timeout))??;

        if !status.is_success() {
            return Err(SendError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(SendReport {
            records,
            bytes,
            status,
        })
    }

    /// Spawn this on a tokio runtime to keep your collector busy.
    /// Each worker sends once per period; failures are logged and sending carries on.
    pub async fn send_forever(self) {
        let workers = self.workers;
        let sender = Arc::new(self);
        futures::future::join_all(
            (0..workers).map(|worker| Arc::clone(&sender).send_worker_forever(worker)),
        )
        .await;
    }

    async fn send_worker_forever(self: Arc<Self>, worker: usize) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match self.send_once().await {
                Ok(report) => {
                    log::debug!(
                        "worker {worker} sent {} records in {} bytes to {}: {}",
                        report.records,
                        report.bytes,
                        self.uri,
                        report.status
                    );
                }
                Err(err) => {
                    log::error!("worker {worker} failed to send to {}: {err}", self.uri)
                }
            }
        }
    }

    fn http_request(&self, payload: Bytes) -> Result<http::Request<Full<Bytes>>, SendError> {
        let mut builder = http::Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, TGenerator::CONTENT_TYPE);
        if let Some(encoding) = TGenerator::CONTENT_ENCODING {
            builder = builder.header(CONTENT_ENCODING, encoding);
        }
        for (name, value) in TGenerator::PROTOCOL_HEADERS {
            builder = builder.header(*name, *value);
        }
        let mut request = builder.body(Full::new(payload))?;
        request.headers_mut().extend(self.headers.clone());
        Ok(request)
    }
}
