//! Rugscope CLI - analyze tokens from a JSON request file
//!
//! Usage:
//!   rugscope request.json
//!   cat request.json | rugscope
//!
//! The request is the same body `POST /v1/analyze` accepts (or an array of
//! them). Results are printed as pretty JSON on stdout; logs go to stderr.

use eyre::{eyre, Result, WrapErr};
use rugscope::api::{validate_address, AnalyzeRequest};
use rugscope::{AnalysisRequest, EngineConfig, ProviderSet, RiskEngine};
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn read_input() -> Result<String> {
    let mut raw = String::new();
    match std::env::args().nth(1).filter(|a| a != "-") {
        Some(path) => {
            raw = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read {}", path))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut raw)
                .wrap_err("failed to read stdin")?;
        }
    }
    Ok(raw)
}

/// One request object or an array of them
fn parse_requests(raw: &str) -> Result<Vec<AnalyzeRequest>> {
    let value: serde_json::Value = serde_json::from_str(raw).wrap_err("input is not valid JSON")?;
    let requests = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(requests)
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let requests = parse_requests(&read_input()?)?;
    if requests.is_empty() {
        return Err(eyre!("no analysis requests in input"));
    }

    let config = EngineConfig::default();
    config.log_summary();
    let engine = Arc::new(RiskEngine::new(config)?);

    let mut results = Vec::with_capacity(requests.len());
    for req in requests {
        let address = validate_address(&req.token_address)?;
        let result = engine
            .analyze(
                AnalysisRequest::new(address, req.token),
                ProviderSet::from_prefetched(req.payloads),
            )
            .await;
        results.push(result);
    }

    let stats = engine.stats();
    info!(
        "🏁 Done: {} analyzed ({} AI, {} heuristic, {} fallback)",
        stats.analyses, stats.ai_scored, stats.heuristic_scored, stats.fallbacks
    );

    let output = if results.len() == 1 {
        serde_json::to_string_pretty(&results[0])?
    } else {
        serde_json::to_string_pretty(&results)?
    };
    println!("{}", output);
    Ok(())
}
