//! Request logging stage of the storage client pipeline.
//!
//! # Data Flow
//! ```text
//! caller request
//!     → policy.rs (try count, operation start, Info "OUTGOING REQUEST")
//!     → next stage (transport, retry-aware caller owns the loop)
//!     → classify.rs (outcome, severity, force)
//!     → render.rs (message variant; redact.rs for the URL, stack.rs on errors)
//!     → sink.rs (filtered channel and/or forced channel)
//!     → original response or error back to the caller
//! ```
//!
//! # Design Decisions
//! - Logging is a side channel; results are never altered
//! - One policy instance per logical operation, attempts run sequentially
//! - The live request is never mutated; logs are rendered from a snapshot

pub mod attempt;
pub mod classify;
pub mod policy;
pub mod redact;
pub mod render;
pub mod sink;
pub mod stack;

pub use attempt::{AttemptStart, AttemptTiming, OperationAttempt};
pub use classify::{classify, AttemptOutcome, Classification, SlowThreshold, DEFAULT_SLOW_THRESHOLD};
pub use policy::{RequestLog, RequestLogLayer, RequestLogOptions};
pub use redact::{redact_sig_query_param, redacted_uri, REDACTED};
pub use sink::{LogSink, Severity};
pub use stack::capture_stack;
