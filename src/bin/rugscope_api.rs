//! Rugscope API Server
//!
//! REST API over the token risk engine
//!
//! Usage:
//!   cargo run --bin rugscope_api
//!
//! Environment:
//!   PORT / RUGSCOPE_PORT - Server port (default: 8080)
//!   RUGSCOPE_HOST        - Server host (default: 0.0.0.0)
//!   RUST_LOG             - Log filter (default: info)
//!   RUGSCOPE_TRUST_PROXY - Rate-limit on X-Forwarded-For (default: false,
//!                          enable only behind a proxy that sets it)
//!   (see EngineConfig for the engine settings)

use rugscope::api::{create_router, start_cleanup_task, AppState};
use rugscope::{EngineConfig, RiskEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = EngineConfig::default();
    config.log_summary();
    let addr: SocketAddr = config.bind_addr().parse()?;

    // Model is trained once here and shared read-only by every request
    let engine = Arc::new(RiskEngine::new(config)?);
    let state = Arc::new(AppState::new(engine.clone()));

    start_cleanup_task(state.cache.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    info!("🚀 Rugscope API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/analyze          - Full token risk analysis");
    info!("  POST /v1/analyze/batch    - Batch analysis (up to {} tokens)", engine.config().max_batch);
    info!("  GET  /v1/stats            - Pipeline & cache statistics");
    info!("  GET  /v1/health           - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // peer address feeds the rate limiter key
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    let stats = engine.stats();
    info!("🛑 Shutdown signal received");
    info!("   Total analyzed: {}", stats.analyses);
    info!("   AI scored: {}", stats.ai_scored);
    info!("   Heuristic scored: {}", stats.heuristic_scored);
    info!("   Fallbacks: {}", stats.fallbacks);
    info!("👋 Rugscope API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════╗
    ║                                                  ║
    ║   R U G S C O P E                                ║
    ║   Token Contract Risk Scoring  v{:<17}║
    ║                                                  ║
    ╚══════════════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
