//! API Request Handlers

use alloy_primitives::Address;
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::types::*;
use crate::core::{AnalysisRequest, RiskEngine};
use crate::models::{AnalysisResult, AppError, RiskBand};
use crate::providers::ProviderSet;
use crate::utils::AnalysisCache;

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub engine: Arc<RiskEngine>,
    pub cache: AnalysisCache,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<RiskEngine>) -> Self {
        let cache = AnalysisCache::with_ttl(engine.config().cache_ttl_secs);
        Self {
            engine,
            cache,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn reject(err: &AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

/// Parse a 20-byte hex address, returning its checksummed form
pub fn validate_address(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") {
        return Err(AppError::invalid_address(format!(
            "Token address must start with 0x: {}",
            raw
        )));
    }
    trimmed
        .parse::<Address>()
        .map(|a| a.to_checksum(None))
        .map_err(|_| AppError::invalid_address(format!("Invalid token address format: {}", raw)))
}

/// Cache lookup, then a full pipeline run
async fn analyze_one(
    engine: &Arc<RiskEngine>,
    cache: &AnalysisCache,
    address: String,
    req: AnalyzeRequest,
) -> AnalysisResult {
    let fingerprint = req.fingerprint();
    if !req.skip_cache {
        if let Some(cached) = cache.get(&address, &fingerprint) {
            return cached;
        }
    }

    let result = engine
        .analyze(
            AnalysisRequest::new(address, req.token),
            ProviderSet::from_prefetched(req.payloads),
        )
        .await;
    cache.set(&fingerprint, &result);
    result
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Token Analysis
// ============================================

pub async fn analyze_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiFailure> {
    let start = Instant::now();

    let address = validate_address(&req.token_address).map_err(|e| {
        warn!("⚠️ Rejected analyze request: {}", e);
        reject(&e, start)
    })?;

    let result = analyze_one(&state.engine, &state.cache, address, req).await;

    Ok(Json(ApiResponse::success(result, elapsed_ms(start))))
}

// ============================================
// Batch Analysis
// ============================================

pub async fn batch_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAnalysisRequest>,
) -> Result<Json<ApiResponse<BatchAnalysisData>>, ApiFailure> {
    let start = Instant::now();
    let max_batch = state.engine.config().max_batch;

    if req.tokens.is_empty() {
        return Err(reject(
            &AppError::bad_request("tokens array cannot be empty"),
            start,
        ));
    }
    if req.tokens.len() > max_batch {
        return Err(reject(
            &AppError::bad_request(format!("Maximum {} tokens per batch request", max_batch)),
            start,
        ));
    }

    let total_requested = req.tokens.len();
    let semaphore = Arc::new(Semaphore::new(req.concurrency.clamp(1, 50)));
    let mut handles = Vec::with_capacity(total_requested);

    for item in req.tokens {
        let sem = semaphore.clone();
        let engine = state.engine.clone();
        let cache = state.cache.clone();

        handles.push(tokio::spawn(async move {
            let raw_address = item.token_address.clone();
            let address = match validate_address(&raw_address) {
                Ok(a) => a,
                Err(e) => return BatchTokenResult::failed(raw_address, &e),
            };
            let Ok(_permit) = sem.acquire().await else {
                return BatchTokenResult::failed(raw_address, &AppError::internal("batch semaphore closed"));
            };
            let result = analyze_one(&engine, &cache, address, item).await;
            BatchTokenResult {
                token_address: result.token_address.clone(),
                status: "success".to_string(),
                result: Some(result),
                error: None,
            }
        }));
    }

    let mut results = Vec::with_capacity(total_requested);
    for handle in handles {
        match handle.await {
            Ok(r) => results.push(r),
            Err(e) => warn!("⚠️ Batch task failed: {}", e),
        }
    }

    let band_count = |band: RiskBand| {
        results
            .iter()
            .filter_map(|r| r.result.as_ref())
            .filter(|r| r.risk_band == band)
            .count()
    };
    let total_critical = band_count(RiskBand::Critical);
    let total_high = band_count(RiskBand::High);
    let total_fallbacks = results
        .iter()
        .filter_map(|r| r.result.as_ref())
        .filter(|r| r.is_fallback())
        .count();

    info!(
        "📦 Batch: {} tokens, {} critical, {} high, {} fallbacks in {:.1}ms",
        results.len(),
        total_critical,
        total_high,
        total_fallbacks,
        elapsed_ms(start)
    );

    let data = BatchAnalysisData {
        total_requested,
        total_processed: results.len(),
        total_critical,
        total_high,
        total_fallbacks,
        results,
        processing_time_ms: elapsed_ms(start),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

impl BatchTokenResult {
    fn failed(token_address: String, err: &AppError) -> Self {
        Self {
            token_address,
            status: "error".to_string(),
            result: None,
            error: Some(ApiError::from(err)),
        }
    }
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let cache_stats = state.cache.stats();

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache_stats.entries, cache_stats.hit_rate, cache_stats.hits, cache_stats.misses
    );

    let data = StatsData {
        pipeline: state.engine.stats(),
        cache: cache_stats.into(),
        model_trees: state.engine.model().tree_count(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
