//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline::policy produces:
//!     → logging.rs (TracingSink: filtered and forced records)
//!     → metrics.rs (attempt counters and try-duration histograms)
//!
//! Consumers:
//!     → tracing subscriber (stdout)
//!     → metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, TracingSink};
