//! AI Risk Normalizer
//!
//! Turns a raw AI assessment into a bounded, label-consistent score set.
//!
//! Pipeline (order matters):
//! 1. High-risk bypass: any raw score > 90 skips step 2 entirely
//! 2. Calibration transforms (rug x0.10, community x0.40, contract and
//!    liquidity piecewise; liquidity replaced by the DEX rule when pair
//!    data exists)
//! 3. Safety scores = 100 - transformed risk
//! 4. Ultra-high-risk override of market stability
//! 5. Cap every score to [1, 98]
//! 6. Overall = capped mean of the four capped primary risks
//! 7. Label consistency pass (last; overall is not recomputed)

use tracing::{debug, info};

use crate::core::aggregator::{
    cap_score, complete_labels, enforce_label_consistency, is_ultra_high_risk,
    resolve_market_stability,
};
use crate::core::market::{canonical_pair, dex_liquidity_risk, MarketSnapshot};
use crate::models::{AiAssessment, DexPair, MetricLabels, RiskScoreSet};
use crate::utils::constants::{
    AI_BYPASS_THRESHOLD, AI_COMMUNITY_FACTOR, AI_CONFIDENCE_MAX, AI_CONFIDENCE_MIN,
    AI_CONTRACT_FACTOR, AI_CONTRACT_OFFSET, AI_CONTRACT_SCALE_ABOVE, AI_LIQUIDITY_FACTOR,
    AI_LIQUIDITY_SCALE_ABOVE, AI_LOW_LIQUIDITY_DISCOUNT, AI_RUG_PULL_FACTOR,
    HIGH_RISK_REASONING_PREFIX,
};

/// Normalized AI output
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAssessment {
    pub scores: RiskScoreSet,
    /// Raw scores were trusted untouched
    pub bypassed: bool,
    /// All four transformed risks exceeded the ultra threshold
    pub ultra_high_risk: bool,
    /// Clamped AI confidence in percent
    pub confidence_pct: f64,
    pub reasoning: String,
    pub labels: MetricLabels,
}

#[inline]
fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Rug-pull calibration
pub fn transform_rug_pull(raw: f64) -> f64 {
    (raw * AI_RUG_PULL_FACTOR).round()
}

/// Community calibration
pub fn transform_community(raw: f64) -> f64 {
    (raw * AI_COMMUNITY_FACTOR).round()
}

/// Contract calibration (scaled above 30, offset below)
pub fn transform_contract(raw: f64) -> f64 {
    if raw > AI_CONTRACT_SCALE_ABOVE {
        (raw * AI_CONTRACT_FACTOR).round()
    } else {
        (raw - AI_CONTRACT_OFFSET).round().max(0.0)
    }
}

/// Liquidity calibration when no DEX data exists
pub fn transform_liquidity(raw: f64) -> f64 {
    let scaled = if raw > AI_LIQUIDITY_SCALE_ABOVE {
        (raw * AI_LIQUIDITY_FACTOR).round()
    } else {
        raw.round()
    };
    if raw <= AI_LIQUIDITY_SCALE_ABOVE {
        (scaled - AI_LOW_LIQUIDITY_DISCOUNT).max(0.0)
    } else {
        scaled
    }
}

/// Mean of the four primary risks
pub fn primary_mean(scores: &RiskScoreSet) -> f64 {
    scores.primary_risks().iter().map(|r| f64::from(*r)).sum::<f64>() / 4.0
}

/// AI confidence clamped to [70, 95] percent
pub fn clamp_confidence(confidence: Option<f64>) -> f64 {
    confidence
        .filter(|c| c.is_finite())
        .unwrap_or(AI_CONFIDENCE_MIN)
        .clamp(AI_CONFIDENCE_MIN, AI_CONFIDENCE_MAX)
}

/// Normalize one AI assessment.
///
/// `dex_pairs` being `Some` (even empty) means DEX data was fetched; the
/// liquidity score is then derived from the canonical pair.
pub fn normalize(
    raw: &AiAssessment,
    dex_pairs: Option<&[DexPair]>,
    market: &MarketSnapshot,
) -> NormalizedAssessment {
    let raw_scores = [
        sanitize(raw.rug_pull),
        sanitize(raw.liquidity),
        sanitize(raw.contract),
        sanitize(raw.community),
    ];
    let bypassed = raw_scores.iter().any(|s| *s > AI_BYPASS_THRESHOLD);

    // Steps 1-2
    let transformed = if bypassed {
        info!(
            "🚨 AI high-risk bypass: raw scores {:?} kept untouched",
            raw_scores
        );
        raw_scores
    } else {
        let liquidity = match dex_pairs {
            Some(pairs) => dex_liquidity_risk(canonical_pair(pairs)),
            None => transform_liquidity(raw_scores[1]),
        };
        [
            transform_rug_pull(raw_scores[0]),
            liquidity,
            transform_contract(raw_scores[2]),
            transform_community(raw_scores[3]),
        ]
    };
    let [rug_pull, liquidity, contract, community] = transformed;

    // Step 3
    let contract_security = cap_score(100.0 - contract);
    let liquidity_safety = cap_score(100.0 - liquidity);
    let community_health = cap_score(100.0 - community);

    // Step 4
    let ultra_high_risk = is_ultra_high_risk(transformed);
    let market_stability = resolve_market_stability(
        transformed,
        [contract_security, liquidity_safety, community_health],
        market,
    );

    // Step 5
    let mut capped = RiskScoreSet {
        overall_risk: 0,
        rug_pull: cap_score(rug_pull),
        liquidity: cap_score(liquidity),
        contract: cap_score(contract),
        community: cap_score(community),
        contract_security,
        liquidity_safety,
        community_health,
        market_stability: cap_score(market_stability),
        confidence: clamp_confidence(raw.confidence) / 100.0,
    };

    // Step 6: mean of the primaries as reported, not the pre-cap values
    capped.overall_risk = cap_score(primary_mean(&capped));

    // Step 7
    let scores = enforce_label_consistency(capped);

    debug!(
        "🧮 AI normalized: raw={:?} transformed={:?} overall={} bypass={} ultra={}",
        raw_scores, transformed, scores.overall_risk, bypassed, ultra_high_risk
    );

    let reasoning = if bypassed || ultra_high_risk {
        format!("{}{}", HIGH_RISK_REASONING_PREFIX, raw.reasoning)
    } else {
        raw.reasoning.clone()
    };

    NormalizedAssessment {
        labels: complete_labels(&raw.labels, &scores),
        scores,
        bypassed,
        ultra_high_risk,
        confidence_pct: clamp_confidence(raw.confidence),
        reasoning,
    }
}
