//! Send a single request through the OpenStack transport.
//!
//! ```text
//! os-transport [--config transport.toml [--watch]] [-X POST] [-H "Name: value"]...
//!              [-d BODY] [--content-type application/json] URL
//!     → TransportConfig (file or defaults, CLI overrides)
//!     → Transport over a hyper client
//!     → status + body on stdout, redacted debug log on stderr
//! ```
//!
//! With `--watch` the request is repeated every `--interval` seconds until
//! Ctrl-C, and edits to the config file apply to the next request.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request};
use clap::Parser;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use openstack_transport::config::{load_config, watch_config, TransportConfig};
use openstack_transport::observability::init_tracing;
use openstack_transport::transport::replay::buffer_body;
use openstack_transport::Transport;

#[derive(Parser)]
#[command(name = "os-transport")]
#[command(about = "Send one request through the OpenStack logging/retrying transport", long_about = None)]
struct Cli {
    /// Target URL (http only).
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header, `Name: value`. May be repeated.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body.
    #[arg(short, long)]
    data: Option<String>,

    #[arg(long, default_value = "application/json")]
    content_type: String,

    /// TOML transport configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `max_retries` from the configuration.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Log requests and responses.
    #[arg(short, long)]
    verbose: bool,

    /// Repeat the request, reloading the config file whenever it changes.
    #[arg(short, long, requires = "config")]
    watch: bool,

    /// Seconds between requests in watch mode.
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

/// Command-line settings that win over the config file, on load and on reload.
#[derive(Clone, Copy)]
struct Overrides {
    max_retries: Option<u32>,
    verbose: bool,
}

impl Overrides {
    fn apply(&self, config: &mut TransportConfig) {
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        config.enable_logger |= self.verbose;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing("openstack_transport=debug");

    let overrides = Overrides {
        max_retries: cli.max_retries,
        verbose: cli.verbose,
    };
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TransportConfig::default(),
    };
    overrides.apply(&mut config);

    let client: Client<HttpConnector, Body> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let transport = Transport::from_config(client, &config);

    let (Some(path), true) = (&cli.config, cli.watch) else {
        return send(&transport, &cli).await;
    };

    let _watcher = watch_config(path, transport.clone(), move |config| overrides.apply(config))?;
    tracing::info!(path = %path.display(), interval = cli.interval, "watching config, Ctrl-C to stop");

    let mut ticker = tokio::time::interval(Duration::from_secs(cli.interval.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = send(&transport, &cli).await {
                    tracing::error!(error = %e, "request failed");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn send(transport: &Transport, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let response = transport.round_trip(build_request(cli)?).await?;
    let status = response.status();
    let body = buffer_body(response.into_body()).await?;

    println!("{}", status);
    println!("{}", String::from_utf8_lossy(&body));

    tracing::info!(status = status.as_u16(), bytes = body.len(), "Request complete");
    Ok(())
}

fn build_request(cli: &Cli) -> Result<Request<Body>, Box<dyn std::error::Error>> {
    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())?;
    let mut builder = Request::builder().method(method).uri(&cli.url);
    for raw in &cli.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}', expected 'Name: value'", raw))?;
        builder = builder.header(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    let request = match &cli.data {
        Some(data) => builder
            .header(CONTENT_TYPE, HeaderValue::from_str(&cli.content_type)?)
            .body(Body::from(data.clone()))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}
