//! restform CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments**: one request per invocation, described by flags.
//! 2. **Wire observability**: `tracing-subscriber` writing to stderr, filtered
//!    by `RESTFORM_LOG` (default `warn`), optionally as JSON lines.
//! 3. **Load configuration**: `--config FILE` is a `ClientConfig` TOML file.
//! 4. **Dispatch and print**: the status line goes to stdout, followed by the
//!    body, or by the alias-resolved nodes as JSON when a format is known.
//!
//! Exit status is 1 when the request cannot be built or sent. A non-2xx
//! response is printed and exits 0.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use client::{ClientConfig, RestClient};
use exchange::{Body, ContentType, RequestDescriptor, ResponseEnvelope, Verb};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use transform::{AliasMap, Format, Node, TransformExt};

const LOG_ENV: &str = "RESTFORM_LOG";

#[derive(Debug, Parser)]
#[command(name = "restform", about = "Send one REST request and print the response", version)]
struct Cli {
    /// Target URL; `http://` is assumed when no scheme is given.
    url: String,

    /// Port (default: the URL's port, then the configured default port).
    #[arg(short, long)]
    port: Option<u16>,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "get")]
    method: Verb,

    /// Request parameter, repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Request header, repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Message body for POST and PUT.
    #[arg(short, long)]
    data: Option<String>,

    /// Media type of `--data`.
    #[arg(long, default_value = "text/plain")]
    content_type: String,

    /// Decode the body as this format and print the resolved nodes as JSON.
    #[arg(short, long)]
    format: Option<Format>,

    /// Alias root key (`/`-separated path to the entity collection).
    #[arg(short, long)]
    root: Option<String>,

    /// Client configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected NAME:VALUE, got '{raw}'")),
    }
}

/// Port written in `target`, which may omit its scheme like any request target.
fn url_port(target: &str) -> Option<u16> {
    let target = target.trim();
    let absolute = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };
    url::Url::parse(&absolute).ok()?.port()
}

fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("failed to initialise logging")
}

impl Cli {
    fn port(&self, config: &ClientConfig) -> u16 {
        self.port
            .or_else(|| url_port(&self.url))
            .unwrap_or(config.default_port)
    }

    fn request(&self, config: &ClientConfig) -> anyhow::Result<RequestDescriptor> {
        let body = match &self.data {
            Some(_) if !self.method.allows_body() => bail!("--data cannot be used with {}", self.method),
            Some(text) => Body::message(text.as_str(), ContentType::from_mime(&self.content_type)),
            None => Body::None,
        };
        let request = RequestDescriptor::builder(self.method, self.url.as_str(), self.port(config), body)
            .params(self.params.iter().cloned().collect())
            .headers(self.headers.iter().cloned())
            .build()?;
        Ok(request)
    }

    fn alias(&self) -> AliasMap {
        self.root
            .as_deref()
            .map_or_else(AliasMap::whole_document, AliasMap::root)
    }

    /// The format to decode with: the flag, or the response type when a root
    /// key was given.
    fn format_for(&self, envelope: &ResponseEnvelope) -> Option<Format> {
        self.format.or_else(|| {
            self.root.as_ref()?;
            Format::from_content_type(&envelope.content_type()?)
        })
    }
}

fn render(cli: &Cli, envelope: &ResponseEnvelope) -> anyhow::Result<String> {
    let mut out = format!("{} ({} bytes)\n", envelope.status_code(), envelope.length());
    match cli.format_for(envelope) {
        Some(format) => {
            let nodes = format
                .transformer()
                .extract_nodes(envelope.body_as_text(), &cli.alias())
                .with_context(|| format!("response body is not valid {format}"))?;
            let json = serde_json::Value::Array(nodes.iter().map(Node::to_json).collect());
            out.push_str(&serde_json::to_string_pretty(&json)?);
        }
        None => out.push_str(envelope.body_as_text()),
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    debug!(?config, "Configuration resolved");

    let request = cli.request(&config)?;
    let client = RestClient::with_config(config)?;
    let envelope = client.get_with(&request)?;
    println!("{}", render(&cli, &envelope)?);
    Ok(())
}
