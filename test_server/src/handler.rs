use std::time::SystemTime;

use bytes::Bytes;
use http::{
    header::{CONTENT_ENCODING, CONTENT_TYPE},
    HeaderMap, Method, Request, Response, StatusCode,
};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use logmetrics::{encoding, types::EpochTime};

/// Longest plaintext preview that gets logged
const PREVIEW_CHARS: usize = 500;

/// Log one POST and acknowledge it.
pub async fn handle<TBody>(request: Request<TBody>) -> Response<Full<Bytes>>
where
    TBody: Body,
    TBody::Error: std::fmt::Display,
{
    if request.method() != Method::POST {
        return respond(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }
    let (parts, body) = request.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            log::warn!("error reading body on {}: {err}", parts.uri.path());
            return respond(StatusCode::BAD_REQUEST, "Error reading body");
        }
    };

    log::info!(
        "[{}] received {} bytes on {}",
        SystemTime::now().millis_since_epoch(),
        body.len(),
        parts.uri.path()
    );
    log::info!("content-type: {}", header(&parts.headers, CONTENT_TYPE));
    log::info!("headers: {:?}", parts.headers);
    log::info!("{}", describe(&parts.headers, &body));

    respond(StatusCode::OK, "OK")
}

fn respond(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

fn header(headers: &HeaderMap, name: http::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// A one-line account of the payload.
fn describe(headers: &HeaderMap, body: &[u8]) -> String {
    if header(headers, CONTENT_ENCODING) == encoding::CONTENT_ENCODING {
        return match encoding::decode(body) {
            Ok(write_request) => {
                let first = write_request
                    .timeseries
                    .first()
                    .map(|series| {
                        series
                            .labels
                            .iter()
                            .map(|label| format!("{}={}", label.name, label.value))
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default();
                format!(
                    "{} series, first: {{{first}}}",
                    write_request.timeseries.len()
                )
            }
            Err(err) => format!("undecodable remote-write payload: {err}"),
        };
    }
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("first {PREVIEW_CHARS} chars: {}...", &text[..cut]),
        None => format!("content: {text}"),
    }
}
