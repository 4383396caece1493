//! Request log policy: a tower layer that instruments every attempt of one
//! logical operation.
//!
//! # Responsibilities
//! - Count attempts and time each try and the whole operation
//! - Log the outgoing request (redacted) when the sink accepts Info
//! - Classify the outcome and emit through the filtered and forced channels
//! - Return the inner stage's response or error untouched
//!
//! # Design Decisions
//! - `RequestLogLayer` is the factory; each `layer()` call is one operation
//! - `RequestLog` is not `Clone`; the try counter belongs to one operation
//! - The retry driver calls attempts sequentially; `call(&mut self)` enforces it
//! - Rendering and stack capture only happen when some channel consumes them

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tokio::time::Instant;
use tower::{Layer, Service};

use crate::config::RequestLogConfig;
use crate::observability::metrics;
use crate::pipeline::attempt::{AttemptTiming, OperationAttempt};
use crate::pipeline::classify::{classify, Classification, SlowThreshold};
use crate::pipeline::render::{self, Observed, RequestSnapshot, ResponseHead};
use crate::pipeline::sink::{LogSink, Severity};

/// Runtime options for the request log policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestLogOptions {
    /// Warn (forced) when a single try takes longer than this.
    pub slow_threshold: SlowThreshold,
}

impl From<&RequestLogConfig> for RequestLogOptions {
    fn from(config: &RequestLogConfig) -> Self {
        Self {
            slow_threshold: SlowThreshold::from_millis(config.log_warning_if_try_over_threshold_ms),
        }
    }
}

/// Factory for per-operation [`RequestLog`] services.
#[derive(Clone)]
pub struct RequestLogLayer {
    options: RequestLogOptions,
    sink: Arc<dyn LogSink>,
}

impl RequestLogLayer {
    pub fn new(options: RequestLogOptions, sink: Arc<dyn LogSink>) -> Self {
        Self { options, sink }
    }

    pub fn options(&self) -> RequestLogOptions {
        self.options
    }
}

impl fmt::Debug for RequestLogLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogLayer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLog {
            inner,
            options: self.options,
            sink: Arc::clone(&self.sink),
            attempt: OperationAttempt::new(),
        }
    }
}

/// Logging stage for one logical operation and all of its attempts.
pub struct RequestLog<S> {
    inner: S,
    options: RequestLogOptions,
    sink: Arc<dyn LogSink>,
    attempt: OperationAttempt,
}

impl<S> RequestLog<S> {
    /// Attempt bookkeeping for this operation.
    pub fn attempt(&self) -> &OperationAttempt {
        &self.attempt
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: fmt::Debug> fmt::Debug for RequestLog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLog")
            .field("inner", &self.inner)
            .field("options", &self.options)
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLog<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: fmt::Display + Send + 'static,
    S::Future: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let started = self.attempt.begin(Instant::now());
        let snapshot = RequestSnapshot::capture(&request);

        if self.sink.should_log(Severity::Info) {
            let message = render::outgoing_request(started.try_number, &snapshot);
            self.sink.log(Severity::Info, &message);
        }

        let sink = Arc::clone(&self.sink);
        let threshold = self.options.slow_threshold;
        let try_start = Instant::now();
        let response = self.inner.call(request);

        Box::pin(async move {
            let result = response.await;
            let timing = started.finish(try_start, Instant::now());

            let status = result.as_ref().ok().map(|r| r.status());
            let classification = classify(status, timing.try_duration, threshold);
            metrics::record_attempt(classification.outcome, timing.try_duration);

            let observed = match &result {
                Ok(response) => Observed::Response(ResponseHead::of(response)),
                Err(err) => Observed::Error(err),
            };
            emit(sink.as_ref(), &classification, &timing, threshold, &snapshot, observed);

            result
        })
    }
}

/// Dispatch one attempt's record to the filtered and forced channels.
fn emit(
    sink: &dyn LogSink,
    classification: &Classification,
    timing: &AttemptTiming,
    threshold: SlowThreshold,
    request: &RequestSnapshot,
    observed: Observed<'_>,
) {
    let filtered = sink.should_log(classification.severity);
    if !filtered && !classification.force {
        return;
    }

    let message = render::attempt_report(classification.outcome, timing, threshold, request, observed);

    if classification.force {
        sink.force_log(classification.severity, &message);
    }
    if filtered {
        sink.log(classification.severity, &message);
    }
}
