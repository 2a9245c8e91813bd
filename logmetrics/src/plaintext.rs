//! Newline-delimited log line batches.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{error::GeneratorError, random::RandomSource, request::Request};

/// Candidate lines used when none are configured.
pub const DEFAULT_LINES: [&str; 8] = [
    "level=info msg=\"request served\" method=GET path=/api/v1/users status=200 duration_ms=12",
    "level=info msg=\"request served\" method=POST path=/api/v1/orders status=201 duration_ms=48",
    "level=warn msg=\"slow query\" table=orders duration_ms=1250",
    "level=error msg=\"upstream unavailable\" upstream=payments retry_in=5s",
    "level=debug msg=\"cache miss\" key=user:1042",
    "level=info msg=\"connection accepted\" remote=10.0.3.17:51544",
    "level=info msg=\"job finished\" job=compaction blocks=12 duration_ms=3391",
    "level=warn msg=\"rate limited\" client=batch-ingest limit=500",
];

/// A batch of log lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainTextRequest {
    lines: Vec<String>,
}

impl PlainTextRequest {
    /// The sampled lines, in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Request for PlainTextRequest {
    /// Every line is followed by `\n`, including the last.
    fn serialize(&self) -> Result<Bytes, GeneratorError> {
        let capacity = self.lines.iter().map(|line| line.len() + 1).sum();
        let mut buffer = BytesMut::with_capacity(capacity);
        for line in &self.lines {
            buffer.put_slice(line.as_bytes());
            buffer.put_u8(b'\n');
        }
        Ok(buffer.freeze())
    }

    fn size(&self) -> usize {
        self.lines.len()
    }
}

/// Sample `lines_per_cycle` lines from `pool`, with replacement.
///
/// Asking for zero lines always succeeds with an empty batch; asking for more from
/// an empty pool is an `InvalidArgument`.
pub fn build(
    lines_per_cycle: usize,
    pool: &[impl AsRef<str>],
    random: &RandomSource,
) -> Result<PlainTextRequest, GeneratorError> {
    if lines_per_cycle == 0 {
        return Ok(PlainTextRequest::default());
    }
    if pool.is_empty() {
        return Err(GeneratorError::invalid_argument(format!(
            "cannot pick {lines_per_cycle} lines from an empty candidate pool"
        )));
    }
    let lines = (0..lines_per_cycle)
        .map(|_| {
            random
                .pick(pool)
                .map(|line| line.as_ref().to_owned())
                .ok_or_else(|| GeneratorError::invalid_argument("empty candidate pool"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PlainTextRequest { lines })
}

#[cfg(test)]
mod test {
    use crate::{error::GeneratorError, random::RandomSource, request::Request};

    use super::{build, DEFAULT_LINES};

    #[test_log::test]
    fn samples_from_the_pool() {
        let request = build(5, &["a", "b"], &RandomSource::seeded(1)).expect("pool has lines");
        assert_eq!(5, request.size());

        let payload = request.serialize().expect("plaintext serializes");
        let text = std::str::from_utf8(&payload).expect("utf-8");
        assert!(text.ends_with('\n'));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(5, lines.len());
        assert!(lines.iter().all(|line| *line == "a" || *line == "b"));
        assert_eq!(10, payload.len());
    }

    #[test_log::test]
    fn zero_lines_is_empty() {
        let random = RandomSource::seeded(2);
        let request = build(0, &DEFAULT_LINES, &random).expect("zero lines");
        assert_eq!(0, request.size());
        assert!(request.serialize().expect("serializes").is_empty());

        let empty: [&str; 0] = [];
        let request = build(0, &empty, &random).expect("zero lines from nothing");
        assert!(request.serialize().expect("serializes").is_empty());
    }

    #[test_log::test]
    fn empty_pool_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            build(3, &empty, &RandomSource::seeded(3)),
            Err(GeneratorError::InvalidArgument(_))
        ));
    }

    #[test_log::test]
    fn lines_are_preserved_verbatim() {
        let pool = vec![String::from("level=info msg=\"hello world\"")];
        let request =
            build(2, pool.as_slice(), &RandomSource::seeded(4)).expect("pool has lines");
        assert_eq!(
            "level=info msg=\"hello world\"\nlevel=info msg=\"hello world\"\n".as_bytes(),
            request.serialize().expect("serializes").as_ref()
        );
    }
}
