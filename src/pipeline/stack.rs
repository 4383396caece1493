//! Call stack capture for error diagnostics.
//!
//! Capturing and symbolizing a backtrace is expensive; only the error
//! message formatters call this.

use std::backtrace::Backtrace;

/// Initial size of the capture buffer.
pub const INITIAL_STACK_BUFFER: usize = 1024;

/// First line of every captured stack.
pub const STACK_HEADER: &str = "stack backtrace:";

/// Smallest buffer, doubling from [`INITIAL_STACK_BUFFER`], that holds `len` bytes.
fn doubled_capacity(len: usize) -> usize {
    let mut capacity = INITIAL_STACK_BUFFER;
    while capacity < len {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}

/// Capture the current thread's call stack as text.
///
/// Ignores `RUST_BACKTRACE`; the trace is always taken and never truncated.
pub fn capture_stack() -> Vec<u8> {
    let trace = format!("{}\n{}\n", STACK_HEADER, Backtrace::force_capture());
    let mut buf = Vec::with_capacity(doubled_capacity(trace.len()));
    buf.extend_from_slice(trace.as_bytes());
    buf
}
