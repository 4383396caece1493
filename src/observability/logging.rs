//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Provide `TracingSink`, the `LogSink` backed by `tracing` events
//!
//! # Design Decisions
//! - Filtered records go to `REQUEST_TARGET`, gated by the configured minimum
//!   severity and by whatever the ambient filter enables
//! - Forced records go to `FORCED_TARGET`, which has its own fmt layer and
//!   writer (stderr); the ambient filter never sees it, so a forced record is
//!   printed once and survives a quieter `RUST_LOG`

use std::io;

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::pipeline::{LogSink, Severity};

/// Target of records emitted through the filtered channel.
pub const REQUEST_TARGET: &str = "storage_request_log::request";

/// Target of records emitted through the forced channel.
pub const FORCED_TARGET: &str = "storage_request_log::forced";

const DEFAULT_FILTER: &str = "storage_request_log=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    subscriber(base, io::stdout, io::stderr).init();
}

/// Ambient filter for the main output; the forced target is always excluded.
fn env_filter(base: EnvFilter) -> EnvFilter {
    match format!("{}=off", FORCED_TARGET).parse() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Filter for the forced output: only the forced target, at warn and above.
fn forced_filter() -> Targets {
    Targets::new().with_target(FORCED_TARGET, Level::WARN)
}

fn subscriber<M, F>(base: EnvFilter, main: M, forced: F) -> impl Subscriber + Send + Sync + 'static
where
    M: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(main).with_filter(env_filter(base)))
        .with(fmt::layer().with_writer(forced).with_filter(forced_filter()))
}

/// `LogSink` that emits `tracing` events.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    min_severity: Severity,
}

impl TracingSink {
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl LogSink for TracingSink {
    fn should_log(&self, severity: Severity) -> bool {
        if severity < self.min_severity {
            return false;
        }
        match severity {
            Severity::Info => tracing::enabled!(target: REQUEST_TARGET, Level::INFO),
            Severity::Warning => tracing::enabled!(target: REQUEST_TARGET, Level::WARN),
            Severity::Error => tracing::enabled!(target: REQUEST_TARGET, Level::ERROR),
        }
    }

    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: REQUEST_TARGET, "{}", message),
            Severity::Warning => tracing::warn!(target: REQUEST_TARGET, "{}", message),
            Severity::Error => tracing::error!(target: REQUEST_TARGET, "{}", message),
        }
    }

    fn force_log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: FORCED_TARGET, forced = true, "{}", message),
            Severity::Warning => tracing::warn!(target: FORCED_TARGET, forced = true, "{}", message),
            Severity::Error => tracing::error!(target: FORCED_TARGET, forced = true, "{}", message),
        }
    }
}
