//! Text rendering of logged requests and responses.
//!
//! Layout of a rendered attempt:
//! ```text
//! ==> REQUEST/RESPONSE (Try=1, TryDuration=12ms, OpDuration=12ms) -- SUCCESSFUL OPERATION
//!    GET https://acct.blob.core.windows.net/c/b?comp=list&sig=REDACTED
//!    x-ms-version: 2016-05-31
//!    --------------------------------------------------------------------------------
//!    RESPONSE Status: 200 OK
//!    content-length: 0
//! ```
//! URLs go through [`redacted_uri`] and `Authorization` header values are
//! replaced, so rendered text never carries the request's credentials.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode, Uri};

use crate::pipeline::attempt::AttemptTiming;
use crate::pipeline::classify::{AttemptOutcome, SlowThreshold};
use crate::pipeline::redact::{redacted_uri, REDACTED};
use crate::pipeline::stack::capture_stack;

const SEPARATOR: &str =
    "   --------------------------------------------------------------------------------";

/// Owned copy of a request head, taken before the request is forwarded.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestSnapshot {
    pub fn capture<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Borrowed view of a response head.
#[derive(Debug, Clone, Copy)]
pub struct ResponseHead<'a> {
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
}

impl<'a> ResponseHead<'a> {
    pub fn of<B>(response: &'a Response<B>) -> Self {
        Self {
            status: response.status(),
            headers: response.headers(),
        }
    }
}

/// What the next stage produced for one attempt.
#[derive(Clone, Copy)]
pub enum Observed<'a> {
    Response(ResponseHead<'a>),
    Error(&'a dyn fmt::Display),
}

fn write_headers<W: Write>(w: &mut W, headers: &HeaderMap) -> fmt::Result {
    if headers.is_empty() {
        return w.write_str("   (no headers)\n");
    }

    let mut sorted: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let rendered = if *name == header::AUTHORIZATION {
            REDACTED.to_string()
        } else {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        };
        sorted.entry(name.as_str()).or_default().push(rendered);
    }

    for (name, values) in sorted {
        writeln!(w, "   {}: {}", name, values.join(", "))?;
    }
    Ok(())
}

/// Write the method, redacted URL and headers of `request`.
pub fn write_request<W: Write>(w: &mut W, request: &RequestSnapshot) -> fmt::Result {
    writeln!(w, "   {} {}", request.method, redacted_uri(&request.uri))?;
    write_headers(w, &request.headers)
}

/// Write `request` followed by the status and headers of `response`.
pub fn write_request_with_response<W: Write>(
    w: &mut W,
    request: &RequestSnapshot,
    response: ResponseHead<'_>,
) -> fmt::Result {
    write_request(w, request)?;
    writeln!(w, "{}", SEPARATOR)?;
    writeln!(w, "   RESPONSE Status: {}", response.status)?;
    write_headers(w, response.headers)
}

/// Render the informational record emitted before an attempt is forwarded.
pub fn outgoing_request(try_number: u32, request: &RequestSnapshot) -> String {
    let mut b = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(b, "==> OUTGOING REQUEST (Try={})", try_number);
    let _ = write_request(&mut b, request);
    b
}

fn write_stack<W: Write>(w: &mut W) -> fmt::Result {
    w.write_str(&String::from_utf8_lossy(&capture_stack()))
}

fn write_report<W: Write>(
    w: &mut W,
    outcome: AttemptOutcome,
    timing: &AttemptTiming,
    threshold: SlowThreshold,
    request: &RequestSnapshot,
    observed: Observed<'_>,
) -> fmt::Result {
    write!(
        w,
        "==> REQUEST/RESPONSE (Try={}, TryDuration={:?}, OpDuration={:?}) -- ",
        timing.try_number, timing.try_duration, timing.operation_duration
    )?;

    match (outcome, observed) {
        (AttemptOutcome::Success, Observed::Response(response)) => {
            w.write_str("SUCCESSFUL OPERATION\n")?;
            write_request_with_response(w, request, response)
        }
        (AttemptOutcome::SlowSuccess, Observed::Response(response)) => {
            writeln!(w, "SLOW OPERATION [tryDuration > {}]", threshold)?;
            write_request_with_response(w, request, response)
        }
        (AttemptOutcome::ClientError | AttemptOutcome::ServerError, Observed::Response(response)) => {
            w.write_str("OPERATION ERROR:\n")?;
            write_request_with_response(w, request, response)?;
            write_stack(w)
        }
        (_, Observed::Error(err)) => {
            writeln!(w, "NETWORK ERROR:\n{}", err)?;
            write_request(w, request)?;
            write_stack(w)
        }
        // Only reachable if a NetworkError outcome is paired with a response.
        (AttemptOutcome::NetworkError, Observed::Response(response)) => {
            w.write_str("NETWORK ERROR:\n")?;
            write_request_with_response(w, request, response)?;
            write_stack(w)
        }
    }
}

/// Render the record for a finished attempt. Error outcomes capture a stack.
pub fn attempt_report(
    outcome: AttemptOutcome,
    timing: &AttemptTiming,
    threshold: SlowThreshold,
    request: &RequestSnapshot,
    observed: Observed<'_>,
) -> String {
    let mut b = String::new();
    let _ = write_report(&mut b, outcome, timing, threshold, request, observed);
    b
}
