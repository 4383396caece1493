//! storage-request-log probe.
//!
//! Sends one logical operation through the request log stage over a plain
//! hyper client, re-issuing it up to `--attempts` times while the service
//! answers with a server error or the connection fails. There is no backoff;
//! this drives the pipeline, it is not a retry policy.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use clap::Parser;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower::{Layer, Service, ServiceExt};

use storage_request_log::config::{load_config, PipelineConfig};
use storage_request_log::observability::{init_tracing, metrics};
use storage_request_log::{RequestLogLayer, RequestLogOptions, Severity, TracingSink};

#[derive(Parser)]
#[command(name = "storage-request-log")]
#[command(about = "Send a storage request through the request log pipeline", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request URL, including any SAS query string.
    #[arg(short, long)]
    url: String,

    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Extra request header as "name: value". Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Maximum number of attempts for the operation.
    #[arg(short, long, default_value_t = 1)]
    attempts: u32,
}

fn build_request(cli: &Cli, method: &Method, uri: &Uri) -> Result<Request<Body>, Box<dyn std::error::Error>> {
    let mut builder = Request::builder().method(method.clone()).uri(uri.clone());
    for raw in &cli.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}', expected 'name: value'", raw))?;
        builder = builder.header(
            HeaderName::try_from(name.trim())?,
            HeaderValue::try_from(value.trim())?,
        );
    }
    Ok(builder.body(Body::empty())?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    let options = RequestLogOptions::from(&config.request_log);
    let min_severity: Severity = config.observability.log_level.parse()?;

    tracing::info!(
        slow_threshold = %options.slow_threshold,
        log_level = %min_severity,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let method: Method = cli.method.parse()?;
    let uri: Uri = cli.url.parse()?;

    let client: Client<HttpConnector, Body> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let layer = RequestLogLayer::new(options, Arc::new(TracingSink::new(min_severity)));
    let mut operation = layer.layer(client);

    let attempts = cli.attempts.max(1);
    let mut last_status: Option<StatusCode> = None;
    for attempt in 1..=attempts {
        let request = build_request(&cli, &method, &uri)?;
        match operation.ready().await?.call(request).await {
            Ok(response) => {
                let status = response.status();
                last_status = Some(status);
                if !status.is_server_error() {
                    break;
                }
            }
            Err(e) => {
                last_status = None;
                tracing::debug!(attempt, error = %e, "Attempt failed without a response");
            }
        }
    }

    match last_status {
        Some(status) => {
            println!("{}", status);
            Ok(())
        }
        None => Err(format!("no response after {} attempt(s)", attempts).into()),
    }
}
