//! Logging sink contract consumed by the request log policy.
//!
//! # Responsibilities
//! - Define the ordered severity levels
//! - Expose the filter predicate (`should_log`)
//! - Expose the filtered and forced emission channels
//!
//! # Design Decisions
//! - `force_log` never consults `should_log`; the policy decides when to force
//! - Sink methods return `()`: a failing sink cannot change an operation's result

use std::fmt;
use std::str::FromStr;

/// Severity of a diagnostic record. Ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected info, warn or error)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Destination for diagnostic records.
pub trait LogSink: Send + Sync {
    /// Returns true if records of `severity` pass the configured filter.
    fn should_log(&self, severity: Severity) -> bool;

    /// Emit through the filtered channel. Callers check `should_log` first.
    fn log(&self, severity: Severity, message: &str);

    /// Emit regardless of the filter predicate.
    fn force_log(&self, severity: Severity, message: &str);
}
