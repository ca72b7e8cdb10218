//! Analysis Pipeline - orchestrates one token analysis end to end
//!
//! Flow:
//! 1. Fan out to contract / honeypot / social / DEX adapters concurrently
//! 2. Each call is isolated: error, timeout or no data all become `None`
//! 3. Enrich the token from the canonical pair, extract features
//! 4. Ask the AI provider; on any failure fall back wholesale to the
//!    heuristic model
//! 5. Build recommendations, risk factors and the confidence level
//!
//! [`RiskEngine::analyze`] always returns a complete result. A panic inside
//! the pipeline surfaces as a `JoinError` and becomes the low-confidence
//! fallback result.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::aggregator::{finalize_heuristic, risk_band};
use crate::core::estimator::{Estimator, RngEstimator};
use crate::core::features::{check_features, enrich_token, extract_features, FeatureInputs};
use crate::core::heuristic::HeuristicModel;
use crate::core::market::{canonical_pair, MarketSnapshot};
use crate::core::normalizer::normalize;
use crate::core::recommendations::{
    ai_feature_summary, confidence_level, heuristic_feature_summary, recommendations,
    risk_factors, RiskFactorInputs, FALLBACK_FEATURES, FALLBACK_RECOMMENDATIONS,
    FALLBACK_RISK_FACTORS,
};
use crate::models::{
    AiAnalysis, AiAssessment, AnalysisResult, AppError, AppResult, ConfidenceLevel, EngineConfig,
    RiskScoreSet, ScoreSource, TokenData,
};
use crate::providers::{parse_assessment, AiContext, ProviderSet};
use crate::utils::constants::{
    FALLBACK_COMMUNITY, FALLBACK_CONFIDENCE, FALLBACK_CONTRACT, FALLBACK_LIQUIDITY,
    FALLBACK_OVERALL, FALLBACK_RUG_PULL,
};

/// One analysis request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub token_address: String,
    /// Caller-supplied token snapshot
    #[serde(default)]
    pub token: TokenData,
}

impl AnalysisRequest {
    pub fn new(token_address: impl Into<String>, token: TokenData) -> Self {
        Self {
            token_address: token_address.into(),
            token,
        }
    }
}

/// Snapshot of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub analyses: u64,
    pub ai_scored: u64,
    pub heuristic_scored: u64,
    pub fallbacks: u64,
    pub avg_latency_ms: u64,
}

/// Thread-safe statistics
#[derive(Debug, Default)]
struct EngineCounters {
    analyses: AtomicU64,
    ai_scored: AtomicU64,
    heuristic_scored: AtomicU64,
    fallbacks: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Await one adapter call with the timeout applied; any failure is `None`
async fn isolate<T, F>(provider: &'static str, timeout: Duration, call: F) -> Option<T>
where
    F: Future<Output = AppResult<Option<T>>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => {
            if value.is_none() {
                debug!("📭 {}: no data", provider);
            }
            value
        }
        Ok(Err(e)) => {
            warn!("⚠️ {} degraded: {}", provider, e);
            None
        }
        Err(_) => {
            let e = AppError::provider_timeout(provider, timeout.as_millis() as u64);
            warn!("⏱️ {} degraded: {}", provider, e);
            None
        }
    }
}

/// The risk engine: trained model + config, shared across requests
#[derive(Debug)]
pub struct RiskEngine {
    config: EngineConfig,
    model: HeuristicModel,
    counters: EngineCounters,
}

impl RiskEngine {
    /// Validate config and train the heuristic model once
    pub fn new(config: EngineConfig) -> AppResult<Self> {
        config.validate()?;
        let started = Instant::now();
        let model = HeuristicModel::train(
            config.model_seed,
            config.training_samples,
            config.tree_count,
        );
        info!(
            "🧠 Heuristic model ready: {} trees in {}ms",
            model.tree_count(),
            started.elapsed().as_millis()
        );
        Ok(Self::with_model(config, model))
    }

    /// Engine around an already-trained model
    pub fn with_model(config: EngineConfig, model: HeuristicModel) -> Self {
        Self {
            config,
            model,
            counters: EngineCounters::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &HeuristicModel {
        &self.model
    }

    pub fn stats(&self) -> PipelineStats {
        let analyses = self.counters.analyses.load(Ordering::Relaxed);
        let total_latency = self.counters.total_latency_ms.load(Ordering::Relaxed);
        PipelineStats {
            analyses,
            ai_scored: self.counters.ai_scored.load(Ordering::Relaxed),
            heuristic_scored: self.counters.heuristic_scored.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            avg_latency_ms: if analyses > 0 { total_latency / analyses } else { 0 },
        }
    }

    /// Analyze one token. Never fails: catastrophic errors yield the
    /// low-confidence fallback result.
    pub async fn analyze(self: &Arc<Self>, request: AnalysisRequest, providers: ProviderSet) -> AnalysisResult {
        let started = Instant::now();
        let engine = Arc::clone(self);
        let address = request.token_address.clone();
        let token = request.token.clone();

        let handle = tokio::spawn(async move { engine.run(&request, &providers).await });

        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                let e = AppError::pipeline_failed(join_error.to_string());
                error!("❌ Analysis of {} failed: {}", address, e);
                fallback_result(&address, &token)
            }
        };

        self.record(&result, started.elapsed());
        result
    }

    fn record(&self, result: &AnalysisResult, elapsed: Duration) {
        self.counters.analyses.fetch_add(1, Ordering::Relaxed);
        self.counters
            .total_latency_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
        let counter = match result.source {
            ScoreSource::Ai => &self.counters.ai_scored,
            ScoreSource::Heuristic => &self.counters.heuristic_scored,
            ScoreSource::Fallback => &self.counters.fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Run the pipeline in place with the configured estimator
    pub async fn run(&self, request: &AnalysisRequest, providers: &ProviderSet) -> AnalysisResult {
        let mut estimator = RngEstimator::from_seed_option(self.config.estimator_seed);
        self.run_with(request, providers, &mut estimator).await
    }

    /// Run the pipeline with an injected estimator
    pub async fn run_with(
        &self,
        request: &AnalysisRequest,
        providers: &ProviderSet,
        estimator: &mut dyn Estimator,
    ) -> AnalysisResult {
        let address = request.token_address.as_str();
        let timeout = self.config.provider_timeout;
        let symbol = request.token.symbol.clone().unwrap_or_default();

        info!("🔍 Analyzing {}", address);

        // 1-2. Fan out
        let (contract, honeypot, pairs, social) = tokio::join!(
            isolate(
                providers.contract.name(),
                timeout,
                providers.contract.fetch_contract(address)
            ),
            isolate(
                providers.honeypot.name(),
                timeout,
                providers.honeypot.fetch_honeypot(address)
            ),
            isolate(
                providers.market.name(),
                timeout,
                providers.market.fetch_pairs(address)
            ),
            async {
                if symbol.is_empty() {
                    None
                } else {
                    isolate(providers.social.name(), timeout, providers.social.fetch_social(&symbol)).await
                }
            },
        );

        // 3. Enrich + extract
        let best_pair = pairs.as_deref().and_then(canonical_pair);
        let token = enrich_token(&request.token, best_pair);
        let snapshot = MarketSnapshot {
            symbol: token.symbol.clone().unwrap_or_default(),
            name: token.name.clone().unwrap_or_default(),
            price: token.price,
            price_change_24h: token.price_change_24h,
            from_dex: best_pair.is_some(),
        };
        let features = extract_features(
            FeatureInputs {
                token: &token,
                contract: contract.as_ref(),
                honeypot: honeypot.as_ref(),
                social: social.as_ref(),
            },
            estimator,
            Utc::now(),
        );
        debug!("📐 Features for {}: {:?}", address, features);
        if let Err(e) = check_features(&features) {
            error!("❌ Analysis of {} failed: {}", address, e);
            return fallback_result(address, &request.token);
        }

        // 4. AI first, heuristic on any failure
        let context = AiContext {
            token_address: address.to_string(),
            token: token.clone(),
            contract: contract.clone(),
            honeypot: honeypot.clone(),
            social: social.clone(),
            pairs: pairs.clone(),
        };
        let assessment = self.assess(providers, &context).await;

        // 5. Presentation
        let (scores, summary, recs, factors, source, ai_analysis, raw_ensemble_risk) =
            match assessment {
                Some(assessment) => {
                    let normalized = normalize(&assessment, pairs.as_deref(), &snapshot);
                    let summary = ai_feature_summary(&normalized.scores);
                    let recs = if assessment.recommendations.is_empty() {
                        recommendations(&normalized.scores, &summary, honeypot.as_ref())
                    } else {
                        assessment.recommendations.clone()
                    };
                    let factors = if assessment.risk_factors.is_empty() {
                        risk_factors(RiskFactorInputs {
                            scores: &normalized.scores,
                            features: &features,
                            token: &token,
                            contract: contract.as_ref(),
                            honeypot: honeypot.as_ref(),
                        })
                    } else {
                        assessment.risk_factors.clone()
                    };
                    let analysis = AiAnalysis {
                        reasoning: normalized.reasoning,
                        confidence: normalized.confidence_pct,
                        ai_recommendations: assessment.recommendations,
                        ai_risk_factors: assessment.risk_factors,
                        labels: normalized.labels,
                    };
                    (normalized.scores, summary, recs, factors, ScoreSource::Ai, Some(analysis), None)
                }
                None => {
                    let heuristic = self.model.predict(&features);
                    let scores = finalize_heuristic(&heuristic, &snapshot);
                    let summary = heuristic_feature_summary(&scores, &features);
                    let recs = recommendations(&scores, &summary, honeypot.as_ref());
                    let factors = risk_factors(RiskFactorInputs {
                        scores: &scores,
                        features: &features,
                        token: &token,
                        contract: contract.as_ref(),
                        honeypot: honeypot.as_ref(),
                    });
                    (
                        scores,
                        summary,
                        recs,
                        factors,
                        ScoreSource::Heuristic,
                        None,
                        Some(heuristic.ensemble_risk),
                    )
                }
            };

        let band = risk_band(scores.overall_risk);
        info!(
            "{} {} scored {} ({}) via {:?}",
            band.emoji(),
            address,
            scores.overall_risk,
            band.as_str(),
            source
        );

        AnalysisResult {
            analysis_id: Uuid::new_v4(),
            token_address: address.to_string(),
            token_name: token.name.clone(),
            token_symbol: token.symbol.clone(),
            scores,
            risk_band: band,
            features: summary,
            recommendations: recs,
            risk_factors: factors,
            confidence_level: confidence_level(scores.confidence, contract.as_ref(), honeypot.as_ref()),
            source,
            ai_analysis,
            raw_ensemble_risk,
            analyzed_at: Utc::now(),
        }
    }

    /// AI call with the same isolation policy as the data adapters
    async fn assess(&self, providers: &ProviderSet, context: &AiContext) -> Option<AiAssessment> {
        let name = providers.ai.name();
        let timeout = self.config.provider_timeout;
        let text = match tokio::time::timeout(timeout, providers.ai.assess(context)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("⚠️ {} unavailable, using heuristic model: {}", name, e);
                return None;
            }
            Err(_) => {
                let e = AppError::provider_timeout(name, timeout.as_millis() as u64);
                warn!("⏱️ {} unavailable, using heuristic model: {}", name, e);
                return None;
            }
        };
        match parse_assessment(&text) {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!("⚠️ {} response malformed, using heuristic model: {}", name, e);
                None
            }
        }
    }
}

/// The single user-visible failure state
pub fn fallback_result(token_address: &str, token: &TokenData) -> AnalysisResult {
    let scores = RiskScoreSet {
        overall_risk: FALLBACK_OVERALL,
        rug_pull: FALLBACK_RUG_PULL,
        liquidity: FALLBACK_LIQUIDITY,
        contract: FALLBACK_CONTRACT,
        community: FALLBACK_COMMUNITY,
        contract_security: FALLBACK_FEATURES.contract_security,
        liquidity_safety: FALLBACK_FEATURES.liquidity_safety,
        community_health: FALLBACK_FEATURES.community_health,
        market_stability: FALLBACK_FEATURES.market_stability,
        confidence: FALLBACK_CONFIDENCE,
    };
    AnalysisResult {
        analysis_id: Uuid::new_v4(),
        token_address: token_address.to_string(),
        token_name: token.name.clone(),
        token_symbol: token.symbol.clone(),
        scores,
        risk_band: risk_band(scores.overall_risk),
        features: FALLBACK_FEATURES,
        recommendations: FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        risk_factors: FALLBACK_RISK_FACTORS.iter().map(|s| s.to_string()).collect(),
        confidence_level: ConfidenceLevel::Low,
        source: ScoreSource::Fallback,
        ai_analysis: None,
        raw_ensemble_risk: None,
        analyzed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimator::FixedEstimator;
    use crate::models::{ContractInfo, HoneypotReport, HoneypotResult, RiskBand};
    use crate::providers::Prefetched;

    fn engine() -> RiskEngine {
        let mut config = EngineConfig::seeded(7, 11);
        config.training_samples = 120;
        config.tree_count = 3;
        RiskEngine::new(config).unwrap()
    }

    fn honeypot_payload() -> Prefetched {
        Prefetched {
            contract: Some(ContractInfo::default()),
            honeypot: Some(HoneypotReport {
                honeypot_result: HoneypotResult {
                    is_honeypot: true,
                    sell_tax: 60.0,
                    ..Default::default()
                },
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_result_shape() {
        let result = fallback_result("0xabc", &TokenData::default());
        assert_eq!(result.scores.overall_risk, 75);
        assert_eq!(result.scores.confidence, 0.3);
        assert_eq!(result.confidence_level, ConfidenceLevel::Low);
        assert_eq!(result.risk_band, RiskBand::Critical);
        assert!(result.is_fallback());
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.risk_factors.len(), 3);
    }

    #[tokio::test]
    async fn test_heuristic_path_without_ai() {
        let engine = engine();
        let request = AnalysisRequest::new("0xabc", TokenData::default());
        let providers = ProviderSet::from_prefetched(honeypot_payload());
        let mut est = FixedEstimator::midpoint();

        let result = engine.run_with(&request, &providers, &mut est).await;
        assert_eq!(result.source, ScoreSource::Heuristic);
        assert!(result.scores.overall_risk >= 80);
        assert!(result.raw_ensemble_risk.is_some());
        assert!(result.ai_analysis.is_none());
        assert!(result
            .risk_factors
            .iter()
            .any(|f| f.contains("HONEYPOT CONFIRMED")));
    }

    #[tokio::test]
    async fn test_malformed_ai_falls_back() {
        let engine = engine();
        let mut payload = honeypot_payload();
        payload.ai_response = Some("Sorry, I can't analyze this token.".into());
        let providers = ProviderSet::from_prefetched(payload);
        let request = AnalysisRequest::new("0xabc", TokenData::default());

        let result = engine.run(&request, &providers).await;
        assert_eq!(result.source, ScoreSource::Heuristic);
    }

    #[tokio::test]
    async fn test_ai_path_prefers_ai_lists() {
        let engine = engine();
        let payload = Prefetched {
            ai_response: Some(
                r#"```json
                {"rugPullRisk": 50, "liquidityRisk": 15, "contractRisk": 20, "communityRisk": 30,
                 "confidence": 99, "reasoning": "ok", "recommendations": ["Hold"], "riskFactors": []}
                ```"#
                    .into(),
            ),
            ..Default::default()
        };
        let providers = ProviderSet::from_prefetched(payload);
        let request = AnalysisRequest::new("0xabc", TokenData::default());

        let result = engine.run(&request, &providers).await;
        assert_eq!(result.source, ScoreSource::Ai);
        assert_eq!(result.scores.rug_pull, 5);
        assert_eq!(result.scores.liquidity, 10);
        assert_eq!(result.recommendations, vec!["Hold".to_string()]);
        assert!(!result.risk_factors.is_empty());
        let ai = result.ai_analysis.unwrap();
        assert_eq!(ai.confidence, 95.0);
        assert_eq!(result.scores.confidence, 0.95);
    }

    #[tokio::test]
    async fn test_analyze_counts_sources() {
        let engine = Arc::new(engine());
        let request = AnalysisRequest::new("0xabc", TokenData::default());
        engine.analyze(request.clone(), ProviderSet::empty()).await;
        engine.analyze(request, ProviderSet::empty()).await;

        let stats = engine.stats();
        assert_eq!(stats.analyses, 2);
        assert_eq!(stats.heuristic_scored, 2);
        assert_eq!(stats.ai_scored, 0);
        assert_eq!(stats.fallbacks, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::seeded(1, 1);
        config.tree_count = 0;
        assert!(RiskEngine::new(config).is_err());
    }
}
