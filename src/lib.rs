//! Rugscope Library
//!
//! Token contract risk scoring engine:
//! - Feature extraction from partially-missing provider data
//! - Heuristic risk model (rule scorers + bootstrap tree ensemble)
//! - AI assessment normalization with label-consistency enforcement
//! - Recommendation / risk-factor generation
//! - REST API over the engine

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{fallback_result, AnalysisRequest, PipelineStats, RiskEngine};
pub use models::{
    AnalysisResult, AppError, AppResult, EngineConfig, ErrorCode, RiskBand, RiskScoreSet,
    ScoreSource, TokenData, TokenFeatures,
};
pub use providers::{Prefetched, ProviderSet};
pub use utils::AnalysisCache;
