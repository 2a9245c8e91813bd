//! The opaque payloads handed to a sender.

use bytes::Bytes;

use crate::{
    encoding,
    error::GeneratorError,
    proto::prometheus::{TimeSeries, WriteRequest},
};

/// One cycle's worth of data, ready to put on the wire.
pub trait Request {
    /// The transport-ready body.
    fn serialize(&self) -> Result<Bytes, GeneratorError>;

    /// Count of logical records in the request.
    fn size(&self) -> usize;
}

/// A remote-write batch: one sample per series.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RemoteWriteRequest {
    write_request: WriteRequest,
}

impl RemoteWriteRequest {
    /// Wrap a batch of series
    pub fn new(timeseries: Vec<TimeSeries>) -> Self {
        Self {
            write_request: WriteRequest { timeseries },
        }
    }

    /// The series, in emission order
    pub fn timeseries(&self) -> &[TimeSeries] {
        &self.write_request.timeseries
    }

    /// Unwrap into the protobuf message
    pub fn into_inner(self) -> WriteRequest {
        self.write_request
    }
}

impl Request for RemoteWriteRequest {
    fn serialize(&self) -> Result<Bytes, GeneratorError> {
        encoding::encode(&self.write_request)
    }

    fn size(&self) -> usize {
        self.write_request.timeseries.len()
    }
}
