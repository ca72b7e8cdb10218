//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::PipelineStats;
use crate::models::{AnalysisResult, AppError, TokenData};
use crate::providers::Prefetched;
use crate::utils::CacheStats;

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

// ============================================
// Token Analysis
// ============================================

/// Token snapshot plus any pre-fetched provider payloads
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub token_address: String,
    #[serde(default)]
    pub token: TokenData,
    /// contract, honeypot, social, pairs, ai_response
    #[serde(flatten)]
    pub payloads: Prefetched,
    #[serde(default)]
    pub skip_cache: bool,
}

impl AnalyzeRequest {
    /// blake3 over the token snapshot and payloads; address and flags excluded
    pub fn fingerprint(&self) -> String {
        let inputs = serde_json::to_vec(&(&self.token, &self.payloads)).unwrap_or_default();
        blake3::hash(&inputs).to_hex().to_string()
    }
}

// ============================================
// Batch Analysis
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchAnalysisRequest {
    pub tokens: Vec<AnalyzeRequest>,
    /// Max concurrent analyses (default: 10, max: 50)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAnalysisData {
    pub total_requested: usize,
    pub total_processed: usize,
    pub total_critical: usize,
    pub total_high: usize,
    pub total_fallbacks: usize,
    pub results: Vec<BatchTokenResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchTokenResult {
    pub token_address: String,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsData {
    pub pipeline: PipelineStats,
    pub cache: CacheStatsData,
    pub model_trees: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsData {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

impl From<CacheStats> for CacheStatsData {
    fn from(s: CacheStats) -> Self {
        Self {
            entries: s.entries,
            hits: s.hits,
            misses: s.misses,
            hit_rate: s.hit_rate,
            ttl_secs: s.ttl_secs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;

    #[test]
    fn test_analyze_request_flattens_payloads() {
        let req: AnalyzeRequest = serde_json::from_str(
            r#"{
                "token_address": "0x6982508145454Ce325dDbE47a25d4ec3d2311933",
                "token": {"name": "Pepe", "symbol": "PEPE", "liquidityUSD": 1000},
                "contract": {"isVerified": true, "hasOwnershipRenounced": true},
                "ai_response": "{\"rugPullRisk\": 10}"
            }"#,
        )
        .unwrap();
        assert_eq!(req.token.symbol.as_deref(), Some("PEPE"));
        assert_eq!(req.token.liquidity_usd, Some(1000.0));
        assert!(req.payloads.contract.is_some_and(|c| c.is_verified));
        assert!(req.payloads.honeypot.is_none());
        assert!(req.payloads.ai_response.is_some());
        assert!(!req.skip_cache);
    }

    #[test]
    fn test_fingerprint_tracks_payloads() {
        let parse = |body: &str| serde_json::from_str::<AnalyzeRequest>(body).unwrap();
        let a = parse(r#"{"token_address": "0xabc", "ai_response": "{}"}"#);
        let b = parse(r#"{"token_address": "0xABC", "skip_cache": true, "ai_response": "{}"}"#);
        let c = parse(
            r#"{"token_address": "0xabc", "ai_response": "{}",
                "honeypot": {"honeypotResult": {"isHoneypot": true}}}"#,
        );
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_api_error_from_app_error() {
        let err = AppError::invalid_address("bad address");
        let api: ApiError = (&err).into();
        assert_eq!(api.code, err.code_str());
        assert_eq!(err.code, ErrorCode::TokenInvalidAddress);
        assert_eq!(api.message, "bad address");
    }

    #[test]
    fn test_batch_default_concurrency() {
        let req: BatchAnalysisRequest =
            serde_json::from_str(r#"{"tokens": [{"token_address": "0x1"}]}"#).unwrap();
        assert_eq!(req.concurrency, 10);
        assert_eq!(req.tokens.len(), 1);
    }
}
