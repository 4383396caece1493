//! Request logging stage for a cloud object-storage client pipeline.

pub mod config;
pub mod observability;
pub mod pipeline;

pub use config::PipelineConfig;
pub use observability::TracingSink;
pub use pipeline::{LogSink, RequestLog, RequestLogLayer, RequestLogOptions, Severity};
