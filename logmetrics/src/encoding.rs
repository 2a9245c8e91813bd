//! Remote-write wire encoding: protobuf, then snappy block compression.
//!
//! Receivers expect the raw snappy block format, not the framed stream format.

use bytes::Bytes;
use prost::Message;

use crate::{
    error::GeneratorError,
    proto::prometheus::{TimeSeries, WriteRequest},
};

/// `Content-Type` of an encoded write request
pub const CONTENT_TYPE: &str = "application/x-protobuf";
/// `Content-Encoding` of an encoded write request
pub const CONTENT_ENCODING: &str = "snappy";
/// Protocol version header remote-write receivers look for
pub const REMOTE_WRITE_VERSION_HEADER: (&str, &str) =
    ("X-Prometheus-Remote-Write-Version", "0.1.0");

/// Serialize and compress a write request. Compression is always applied.
pub fn encode(request: &WriteRequest) -> Result<Bytes, GeneratorError> {
    let mut serialized = Vec::with_capacity(request.encoded_len());
    request.encode(&mut serialized)?;
    let compressed = snap::raw::Encoder::new().compress_vec(&serialized)?;
    Ok(Bytes::from(compressed))
}

/// Encode a batch of series as one write request.
pub fn encode_series(timeseries: Vec<TimeSeries>) -> Result<Bytes, GeneratorError> {
    encode(&WriteRequest { timeseries })
}

/// Decompress and parse a payload made by [`encode`].
pub fn decode(payload: &[u8]) -> Result<WriteRequest, GeneratorError> {
    let serialized = snap::raw::Decoder::new().decompress_vec(payload)?;
    Ok(WriteRequest::decode(serialized.as_slice())?)
}
