//! Core Module - Risk Scoring Logic
//!
//! Otak aplikasi: feature extraction, heuristic model, AI normalization,
//! score aggregation and the analysis pipeline.

pub mod aggregator;
pub mod estimator;
pub mod features;
pub mod forest;
pub mod heuristic;
pub mod market;
pub mod normalizer;
pub mod pipeline;
pub mod recommendations;

pub use aggregator::{cap_score, risk_band};
pub use estimator::{Estimator, FixedEstimator, RngEstimator};
pub use features::{extract_features, FeatureInputs};
pub use heuristic::{HeuristicModel, HeuristicScores};
pub use market::MarketSnapshot;
pub use normalizer::{normalize, NormalizedAssessment};
pub use pipeline::{fallback_result, AnalysisRequest, PipelineStats, RiskEngine};
