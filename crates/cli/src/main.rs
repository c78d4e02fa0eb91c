//! `anthropic-probe`: one request through the dispatch client.
//!
//! This binary is the composition root. It:
//!
//! 1. parses flags (with `ANTHROPIC_*` / `VERTEX_*` environment fallbacks),
//! 2. wires observability (JSON logs on stderr, optional OTLP export),
//! 3. builds a [`client::Client`] for the direct API or the Vertex AI gateway,
//! 4. sends one request and prints the response body to stdout.
//!
//! On failure the decoded error, status and retry advice are logged and the
//! process exits non-zero.

mod cli;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use client::{Client, ClientError, JsonResponse};

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let provider = telemetry::init()?;

    let outcome = run(args).await;

    if let Some(provider) = provider {
        telemetry::shutdown(provider);
    }
    outcome
}

async fn run(args: Args) -> anyhow::Result<()> {
    let client = Client::new(args.client_config()?);
    let mut body = args.request_body()?;
    let mutators = args.header_mutators()?;

    let request = client.new_request(args.method.clone(), &args.path, body.as_mut(), &mutators)?;

    if args.dry_run {
        println!("{} {}", request.method(), request.url());
        for (name, value) in request.headers() {
            let value = if value.is_sensitive() {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            println!("{name}: {value}");
        }
        if !request.body().is_empty() {
            println!();
            println!("{}", String::from_utf8_lossy(request.body()));
        }
        return Ok(());
    }

    let mut response = JsonResponse::default();
    let result = client.send(request, &mut response).await;

    match response.headers().rate_limits() {
        Ok(limits) => tracing::info!(
            requests_remaining = ?limits.requests_remaining,
            tokens_remaining = ?limits.tokens_remaining.map(|t| t.as_u64()),
            retry_after_secs = ?limits.retry_after.map(|d| d.as_secs()),
            exhausted = limits.is_exhausted(),
            "rate limits"
        ),
        Err(e) => tracing::warn!(error = %e, "malformed rate-limit headers"),
    }

    if let Err(err) = result {
        report(&err, &response);
        return Err(err).context("request failed");
    }

    let pretty = serde_json::to_string_pretty(&response.body)?;
    println!("{pretty}");
    Ok(())
}

fn report(err: &ClientError, response: &JsonResponse) {
    let retry_after = response
        .headers()
        .rate_limits()
        .ok()
        .and_then(|limits| limits.retry_after);
    tracing::error!(
        status = ?err.status().map(|s| s.as_u16()),
        error_type = ?err.error_type().map(|t| t.as_str()),
        retry = ?err.retry_policy(retry_after),
        "request failed"
    );
}
