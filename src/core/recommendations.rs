//! Recommendation / Risk-Factor Generator
//!
//! Fixed message selection keyed on final scores and raw provider flags.
//! The overall-risk bands (85 / 70 / 50 / 35 / 25) are user-facing and
//! must stay aligned with the scoring thresholds.

use crate::core::heuristic::{honeypot_risk, ownership_risk};
use crate::models::{
    ConfidenceLevel, ContractInfo, FeatureSummary, HoneypotReport, RiskScoreSet, TokenData,
    TokenFeatures,
};

// ============================================
// FIXED TEXTS
// ============================================

pub const NO_MAJOR_RISK_FACTORS: &str = "✅ No major risk factors identified";
pub const STANDARD_DUE_DILIGENCE: &str = "📊 Standard due diligence recommended";

/// Recommendations for the catastrophic fallback result
pub const FALLBACK_RECOMMENDATIONS: [&str; 2] = [
    "⚠️ ANALYSIS ERROR - Exercise extreme caution",
    "🚨 Unable to verify token safety - Recommend avoiding until more data available",
];

/// Risk factors for the catastrophic fallback result
pub const FALLBACK_RISK_FACTORS: [&str; 3] = [
    "Insufficient data for comprehensive analysis",
    "Unable to verify contract security",
    "Cannot confirm liquidity safety",
];

/// Feature summary for the catastrophic fallback result
pub const FALLBACK_FEATURES: FeatureSummary = FeatureSummary {
    contract_security: 30,
    liquidity_safety: 25,
    community_health: 20,
    market_stability: 35,
    ownership_risk: 80,
    honeypot_risk: 75,
};

// ============================================
// FEATURE SUMMARY
// ============================================

/// Summary for heuristic-path results
pub fn heuristic_feature_summary(scores: &RiskScoreSet, features: &TokenFeatures) -> FeatureSummary {
    FeatureSummary {
        contract_security: scores.contract_security,
        liquidity_safety: scores.liquidity_safety,
        community_health: scores.community_health,
        market_stability: scores.market_stability,
        ownership_risk: ownership_risk(features),
        honeypot_risk: honeypot_risk(features),
    }
}

/// Summary for AI-path results (rug pull and liquidity stand in for
/// ownership and honeypot risk)
pub fn ai_feature_summary(scores: &RiskScoreSet) -> FeatureSummary {
    FeatureSummary {
        contract_security: scores.contract_security,
        liquidity_safety: scores.liquidity_safety,
        community_health: scores.community_health,
        market_stability: scores.market_stability,
        ownership_risk: scores.rug_pull,
        honeypot_risk: scores.liquidity,
    }
}

// ============================================
// RECOMMENDATIONS
// ============================================

/// Recommendation lines for a final score set
pub fn recommendations(
    scores: &RiskScoreSet,
    summary: &FeatureSummary,
    honeypot: Option<&HoneypotReport>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let overall = scores.overall_risk;

    if overall >= 85 {
        out.push("🚨 EXTREME DANGER - DO NOT INVEST. This token shows multiple critical scam indicators.".into());
    } else if overall >= 70 {
        out.push("💀 VERY HIGH RISK - Strong recommendation to avoid. Multiple red flags detected.".into());
    } else if overall >= 50 {
        out.push("⚠️ HIGH RISK - Exercise extreme caution. Consider avoiding this investment.".into());
    } else if overall >= 35 {
        out.push("⚠️ Moderate risk detected - Conduct thorough research before investing.".into());
    } else if overall < 25 {
        out.push("✅ Low risk profile - This appears to be a relatively safe investment.".into());
    }

    let confirmed = honeypot.map(|h| h.honeypot_result.is_honeypot).unwrap_or(false);
    if summary.honeypot_risk > 80 || confirmed {
        out.push("💀 CRITICAL: HONEYPOT DETECTED - You will NOT be able to sell this token after purchase".into());
    } else if summary.honeypot_risk > 50 {
        out.push("🔍 High honeypot risk - Verify selling capability before investing".into());
    }

    if summary.ownership_risk > 70 {
        out.push("🚨 CRITICAL: High owner token concentration - Extreme rug pull risk".into());
    } else if summary.ownership_risk > 50 {
        out.push("⚠️ Significant owner concentration - Monitor for potential rug pull".into());
    }

    if summary.contract_security < 30 {
        out.push("⚠️ DANGER: Critical contract security issues - Unverified or risky contract detected".into());
    } else if summary.contract_security > 80 {
        out.push("✅ Excellent contract security - Verified and well-structured".into());
    }

    if summary.liquidity_safety < 25 {
        out.push("🚨 CRITICAL: Liquidity manipulation detected - Trading may be impossible".into());
    } else if summary.liquidity_safety > 75 {
        out.push("💧 Good liquidity safety - Trading appears unrestricted".into());
    }

    if scores.confidence > 0.8 {
        out.push("🎯 High confidence analysis - Sufficient data for reliable assessment".into());
    } else if scores.confidence < 0.5 {
        out.push("❓ Moderate confidence - Limited data available, exercise extra caution".into());
    }

    if out.is_empty() {
        out.push(STANDARD_DUE_DILIGENCE.into());
    }
    out
}

// ============================================
// RISK FACTORS
// ============================================

/// Inputs the risk-factor rules look at
#[derive(Debug, Clone, Copy)]
pub struct RiskFactorInputs<'a> {
    pub scores: &'a RiskScoreSet,
    pub features: &'a TokenFeatures,
    pub token: &'a TokenData,
    pub contract: Option<&'a ContractInfo>,
    pub honeypot: Option<&'a HoneypotReport>,
}

/// Independent, fixed-text risk factors
pub fn risk_factors(inputs: RiskFactorInputs<'_>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let hp = inputs.honeypot.map(|h| &h.honeypot_result);

    if hp.map(|h| h.is_honeypot).unwrap_or(false) {
        out.push("🚨 HONEYPOT CONFIRMED - Cannot sell after purchase".into());
    }

    let sell = inputs.features.sell_tax;
    let buy = inputs.features.buy_tax;
    if sell > 30.0 {
        out.push(format!("💸 EXTREME sell tax: {}% - May prevent selling", sell));
    } else if sell > 20.0 {
        out.push(format!("💸 Very high sell tax: {}%", sell));
    } else if sell > 10.0 {
        out.push(format!("💸 High sell tax: {}%", sell));
    }

    if buy > 15.0 {
        out.push(format!("💸 Very high buy tax: {}%", buy));
    } else if buy > 10.0 {
        out.push(format!("💸 High buy tax: {}%", buy));
    }

    if let Some(contract) = inputs.contract {
        if !contract.is_verified {
            out.push("❌ Contract source code not verified".into());
        }
        if !contract.has_ownership_renounced {
            out.push("⚠️ Contract ownership not renounced - Owner retains control".into());
        }
    }

    let owner = inputs.features.owner_token_percentage;
    if owner > 50.0 {
        out.push(format!("🏦 High owner concentration: {:.1}% of supply", owner));
    }

    if !inputs.token.is_liquidity_locked && inputs.token.liquidity_lock_end_time.is_none() {
        out.push("🌊 Liquidity not locked - Can be removed at any time".into());
    }

    if inputs.token.creation_time.is_some() {
        let age = inputs.features.contract_age_days;
        if age < 1.0 {
            out.push("🕐 VERY NEW TOKEN - Less than 1 day old".into());
        } else if age < 7.0 {
            out.push("🕐 Very new token - Less than 1 week old".into());
        }
    }

    if inputs.scores.rug_pull > 80 {
        out.push("💀 EXTREME rug pull probability".into());
    } else if inputs.scores.rug_pull > 60 {
        out.push("⚠️ High rug pull probability".into());
    }

    if inputs.scores.liquidity > 75 {
        out.push("🌊 Critical liquidity manipulation risk".into());
    }

    if out.is_empty() {
        out.push(NO_MAJOR_RISK_FACTORS.into());
    }
    out
}

// ============================================
// CONFIDENCE LEVEL
// ============================================

/// Qualitative confidence, boosted by data coverage
pub fn confidence_level(
    confidence: f64,
    contract: Option<&ContractInfo>,
    honeypot: Option<&HoneypotReport>,
) -> ConfidenceLevel {
    let mut adjusted = if confidence.is_finite() { confidence } else { 0.0 };
    if contract.is_some() && honeypot.is_some() {
        adjusted += 0.2;
    }
    if contract.map(|c| c.is_verified).unwrap_or(false) {
        adjusted += 0.1;
    }
    if honeypot.is_some() {
        adjusted += 0.15;
    }
    let adjusted = adjusted.min(1.0);

    if adjusted > 0.85 {
        ConfidenceLevel::VeryHigh
    } else if adjusted > 0.7 {
        ConfidenceLevel::High
    } else if adjusted > 0.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HoneypotResult;

    fn scores(overall: u8, confidence: f64) -> RiskScoreSet {
        RiskScoreSet {
            overall_risk: overall,
            rug_pull: 10,
            liquidity: 10,
            contract: 50,
            community: 50,
            contract_security: 50,
            liquidity_safety: 50,
            community_health: 50,
            market_stability: 50,
            confidence,
        }
    }

    fn neutral_summary() -> FeatureSummary {
        FeatureSummary {
            contract_security: 50,
            liquidity_safety: 50,
            community_health: 50,
            market_stability: 50,
            ownership_risk: 40,
            honeypot_risk: 10,
        }
    }

    fn honeypot(is_honeypot: bool) -> HoneypotReport {
        HoneypotReport {
            honeypot_result: HoneypotResult {
                is_honeypot,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_overall_bands() {
        let s = neutral_summary();
        assert!(recommendations(&scores(90, 0.6), &s, None)[0].contains("EXTREME DANGER"));
        assert!(recommendations(&scores(72, 0.6), &s, None)[0].contains("VERY HIGH RISK"));
        assert!(recommendations(&scores(50, 0.6), &s, None)[0].contains("HIGH RISK"));
        assert!(recommendations(&scores(35, 0.6), &s, None)[0].contains("Moderate risk"));
        assert!(recommendations(&scores(10, 0.6), &s, None)[0].contains("Low risk profile"));
        // 25..35 has no band line and nothing else fires
        assert_eq!(
            recommendations(&scores(30, 0.6), &s, None),
            vec![STANDARD_DUE_DILIGENCE.to_string()]
        );
    }

    #[test]
    fn test_confirmed_honeypot_recommendation() {
        let recs = recommendations(&scores(30, 0.6), &neutral_summary(), Some(&honeypot(true)));
        assert!(recs.iter().any(|r| r.contains("HONEYPOT DETECTED")));
    }

    #[test]
    fn test_confidence_lines() {
        let recs = recommendations(&scores(30, 0.9), &neutral_summary(), None);
        assert!(recs.iter().any(|r| r.contains("High confidence")));
        let recs = recommendations(&scores(30, 0.3), &neutral_summary(), None);
        assert!(recs.iter().any(|r| r.contains("Limited data")));
    }

    #[test]
    fn test_risk_factors() {
        let features = TokenFeatures {
            sell_tax: 35.0,
            buy_tax: 12.0,
            owner_token_percentage: 60.0,
            contract_age_days: 0.5,
            ..Default::default()
        };
        let token = TokenData {
            creation_time: Some(chrono::Utc::now()),
            ..Default::default()
        };
        let contract = ContractInfo::default();
        let hp = honeypot(true);
        let s = RiskScoreSet {
            rug_pull: 90,
            liquidity: 80,
            ..Default::default()
        };
        let factors = risk_factors(RiskFactorInputs {
            scores: &s,
            features: &features,
            token: &token,
            contract: Some(&contract),
            honeypot: Some(&hp),
        });
        assert!(factors[0].contains("HONEYPOT CONFIRMED"));
        assert!(factors.iter().any(|f| f.contains("EXTREME sell tax: 35%")));
        assert!(factors.iter().any(|f| f.contains("High buy tax: 12%")));
        assert!(factors.iter().any(|f| f.contains("not verified")));
        assert!(factors.iter().any(|f| f.contains("60.0% of supply")));
        assert!(factors.iter().any(|f| f.contains("Liquidity not locked")));
        assert!(factors.iter().any(|f| f.contains("Less than 1 day")));
        assert!(factors.iter().any(|f| f.contains("EXTREME rug pull")));
        assert!(factors.iter().any(|f| f.contains("Critical liquidity")));
    }

    #[test]
    fn test_no_risk_factors() {
        let features = TokenFeatures::default();
        let token = TokenData {
            is_liquidity_locked: true,
            ..Default::default()
        };
        let factors = risk_factors(RiskFactorInputs {
            scores: &RiskScoreSet::default(),
            features: &features,
            token: &token,
            contract: None,
            honeypot: None,
        });
        assert_eq!(factors, vec![NO_MAJOR_RISK_FACTORS.to_string()]);
    }

    #[test]
    fn test_confidence_level_boosts() {
        assert_eq!(confidence_level(0.4, None, None), ConfidenceLevel::Low);
        assert_eq!(confidence_level(0.6, None, None), ConfidenceLevel::Medium);
        let verified = ContractInfo {
            is_verified: true,
            ..Default::default()
        };
        let hp = honeypot(false);
        // 0.5 + 0.2 + 0.1 + 0.15
        assert_eq!(
            confidence_level(0.5, Some(&verified), Some(&hp)),
            ConfidenceLevel::VeryHigh
        );
        assert_eq!(confidence_level(0.3, None, Some(&hp)), ConfidenceLevel::Low);
        assert_eq!(confidence_level(0.6, None, Some(&hp)), ConfidenceLevel::High);
    }
}
