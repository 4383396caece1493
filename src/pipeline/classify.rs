//! Severity classification of a single attempt.
//!
//! # Decision order (first match wins)
//! ```text
//! no response                       → NetworkError  Error    forced
//! status 500..=599                  → ServerError   Error    forced
//! status 400..=499, not allow-listed→ ClientError   Error    forced
//! try duration > threshold          → SlowSuccess   Warning  forced
//! otherwise                         → Success       Info
//! ```
//!
//! # Design Decisions
//! - Error conditions always take precedence over slowness
//! - 404, 409, 412 and 416 are expected outcomes for blob operations
//!   (missing blob, lease conflict, ETag mismatch, range past end)

use std::fmt;
use std::time::Duration;

use axum::http::StatusCode;

use crate::pipeline::sink::Severity;

/// Threshold used when the configured value is 0.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(3);

/// 4xx statuses that are normal answers from the storage service.
pub const EXPECTED_CLIENT_STATUSES: [StatusCode; 4] = [
    StatusCode::NOT_FOUND,
    StatusCode::CONFLICT,
    StatusCode::PRECONDITION_FAILED,
    StatusCode::RANGE_NOT_SATISFIABLE,
];

/// Slow-attempt threshold.
///
/// Built from a signed millisecond count: 0 selects [`DEFAULT_SLOW_THRESHOLD`],
/// a negative value disables escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlowThreshold {
    Disabled,
    After(Duration),
}

impl SlowThreshold {
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => SlowThreshold::After(DEFAULT_SLOW_THRESHOLD),
            m if m < 0 => SlowThreshold::Disabled,
            m => SlowThreshold::After(Duration::from_millis(m as u64)),
        }
    }

    /// Returns true if `try_duration` strictly exceeds an enabled threshold.
    pub fn is_exceeded_by(&self, try_duration: Duration) -> bool {
        match self {
            SlowThreshold::Disabled => false,
            SlowThreshold::After(limit) => !limit.is_zero() && try_duration > *limit,
        }
    }
}

impl Default for SlowThreshold {
    fn default() -> Self {
        SlowThreshold::After(DEFAULT_SLOW_THRESHOLD)
    }
}

impl fmt::Display for SlowThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlowThreshold::Disabled => f.write_str("disabled"),
            SlowThreshold::After(limit) => write!(f, "{:?}", limit),
        }
    }
}

/// What happened on one attempt; selects the message formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptOutcome {
    Success,
    SlowSuccess,
    ClientError,
    ServerError,
    NetworkError,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::SlowSuccess => "slow_success",
            AttemptOutcome::ClientError => "client_error",
            AttemptOutcome::ServerError => "server_error",
            AttemptOutcome::NetworkError => "network_error",
        }
    }

    /// Error outcomes carry a captured stack in their message.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::ClientError | AttemptOutcome::ServerError | AttemptOutcome::NetworkError
        )
    }
}

/// Result of classifying an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub outcome: AttemptOutcome,
    pub severity: Severity,
    /// Emit on the forced channel regardless of the sink's filter.
    pub force: bool,
}

impl Classification {
    fn new(outcome: AttemptOutcome) -> Self {
        let (severity, force) = match outcome {
            AttemptOutcome::Success => (Severity::Info, false),
            AttemptOutcome::SlowSuccess => (Severity::Warning, true),
            AttemptOutcome::ClientError
            | AttemptOutcome::ServerError
            | AttemptOutcome::NetworkError => (Severity::Error, true),
        };
        Self { outcome, severity, force }
    }
}

/// Returns true for 4xx statuses that should be logged as errors.
pub fn is_unexpected_client_error(status: StatusCode) -> bool {
    status.is_client_error() && !EXPECTED_CLIENT_STATUSES.contains(&status)
}

/// Classify one attempt. `status` is `None` when no response was obtained.
pub fn classify(
    status: Option<StatusCode>,
    try_duration: Duration,
    threshold: SlowThreshold,
) -> Classification {
    let outcome = match status {
        None => AttemptOutcome::NetworkError,
        Some(sc) if sc.is_server_error() => AttemptOutcome::ServerError,
        Some(sc) if is_unexpected_client_error(sc) => AttemptOutcome::ClientError,
        Some(_) if threshold.is_exceeded_by(try_duration) => AttemptOutcome::SlowSuccess,
        Some(_) => AttemptOutcome::Success,
    };
    Classification::new(outcome)
}
