//! Score Aggregator
//!
//! Final bounds enforcement shared by both scoring paths. Every reported
//! score passes through `cap_score`, so nothing is ever exactly 0 or 100.

use crate::core::heuristic::HeuristicScores;
use crate::core::market::{boosted_market_stability, MarketSnapshot};
use crate::models::{MetricLabels, RiskBand, RiskScoreSet};
use crate::utils::constants::{
    CRITICAL_BAND, CRITICAL_RISK_FLOOR, CRITICAL_SAFETY_CEILINGS, HIGH_BAND, HIGH_RISK_FLOOR,
    HIGH_SAFETY_CEILINGS, MODERATE_BAND, SCORE_CEILING, SCORE_FLOOR, ULTRA_HIGH_RISK_MARKET_STABILITY,
    ULTRA_HIGH_RISK_THRESHOLD,
};

/// Round and clamp into the reportable range [1, 98]
pub fn cap_score(x: f64) -> u8 {
    if !x.is_finite() {
        return if x == f64::INFINITY {
            SCORE_CEILING
        } else {
            SCORE_FLOOR
        };
    }
    x.round()
        .clamp(SCORE_FLOOR as f64, SCORE_CEILING as f64) as u8
}

/// Label band for an overall risk
pub fn risk_band(overall: u8) -> RiskBand {
    if overall >= CRITICAL_BAND {
        RiskBand::Critical
    } else if overall >= HIGH_BAND {
        RiskBand::High
    } else if overall >= MODERATE_BAND {
        RiskBand::Moderate
    } else {
        RiskBand::Low
    }
}

/// All four primary risks above the ultra threshold
pub fn is_ultra_high_risk(risks: [f64; 4]) -> bool {
    risks.iter().all(|r| *r > ULTRA_HIGH_RISK_THRESHOLD)
}

/// Market stability after the ultra override and the safety boost
pub fn resolve_market_stability(
    risks: [f64; 4],
    safety: [u8; 3],
    market: &MarketSnapshot,
) -> f64 {
    if is_ultra_high_risk(risks) {
        ULTRA_HIGH_RISK_MARKET_STABILITY
    } else {
        boosted_market_stability(market, safety)
    }
}

/// Bounded score set for the heuristic path.
///
/// Overall risk is the model's weighted and threshold-enforced value;
/// safety scores are the complements of the primary risks.
pub fn finalize_heuristic(scores: &HeuristicScores, market: &MarketSnapshot) -> RiskScoreSet {
    let risks = [
        scores.rug_pull as f64,
        scores.liquidity as f64,
        scores.contract as f64,
        scores.community as f64,
    ];
    let contract_security = cap_score(100.0 - risks[2]);
    let liquidity_safety = cap_score(100.0 - risks[1]);
    let community_health = cap_score(100.0 - risks[3]);
    let market_stability = resolve_market_stability(
        risks,
        [contract_security, liquidity_safety, community_health],
        market,
    );

    RiskScoreSet {
        overall_risk: cap_score(scores.overall_risk as f64),
        rug_pull: cap_score(risks[0]),
        liquidity: cap_score(risks[1]),
        contract: cap_score(risks[2]),
        community: cap_score(risks[3]),
        contract_security,
        liquidity_safety,
        community_health,
        market_stability: cap_score(market_stability),
        confidence: scores.confidence.clamp(0.0, 1.0),
    }
}

/// Nudge primary/safety pairs so numbers never contradict the label.
///
/// Overall risk is left untouched; it was fixed before this pass.
pub fn enforce_label_consistency(mut set: RiskScoreSet) -> RiskScoreSet {
    let (floor, ceilings) = match risk_band(set.overall_risk) {
        RiskBand::Critical => (CRITICAL_RISK_FLOOR, CRITICAL_SAFETY_CEILINGS),
        RiskBand::High => (HIGH_RISK_FLOOR, HIGH_SAFETY_CEILINGS),
        _ => return set,
    };

    set.rug_pull = set.rug_pull.max(floor);
    set.liquidity = set.liquidity.max(floor);
    set.contract = set.contract.max(floor);
    set.community = set.community.max(floor);

    set.contract_security = set.contract_security.min(ceilings[0]);
    set.liquidity_safety = set.liquidity_safety.min(ceilings[1]);
    set.community_health = set.community_health.min(ceilings[2]);
    set.market_stability = set.market_stability.min(ceilings[3]);

    recap(set)
}

/// Re-apply [1, 98] to every score
pub fn recap(mut set: RiskScoreSet) -> RiskScoreSet {
    let c = |v: u8| cap_score(v as f64);
    set.overall_risk = c(set.overall_risk);
    set.rug_pull = c(set.rug_pull);
    set.liquidity = c(set.liquidity);
    set.contract = c(set.contract);
    set.community = c(set.community);
    set.contract_security = c(set.contract_security);
    set.liquidity_safety = c(set.liquidity_safety);
    set.community_health = c(set.community_health);
    set.market_stability = c(set.market_stability);
    set
}

/// Qualitative label for a 0-100 score
pub fn score_label(score: u8) -> &'static str {
    match score {
        0..=10 => "Very Low",
        11..=25 => "Low",
        26..=40 => "Low-Moderate",
        41..=60 => "Moderate",
        61..=75 => "Moderate-High",
        76..=90 => "High",
        _ => "Very High",
    }
}

/// Fill any label the AI left out from the final scores
pub fn complete_labels(labels: &MetricLabels, set: &RiskScoreSet) -> MetricLabels {
    let pick = |given: &Option<String>, score: u8| -> Option<String> {
        given
            .as_ref()
            .filter(|l| !l.trim().is_empty())
            .cloned()
            .or_else(|| Some(score_label(score).to_string()))
    };
    MetricLabels {
        rug_pull: pick(&labels.rug_pull, set.rug_pull),
        liquidity: pick(&labels.liquidity, set.liquidity),
        contract: pick(&labels.contract, set.contract),
        community: pick(&labels.community, set.community),
        contract_security: pick(&labels.contract_security, set.contract_security),
        liquidity_safety: pick(&labels.liquidity_safety, set.liquidity_safety),
        community_health: pick(&labels.community_health, set.community_health),
        market_stability: pick(&labels.market_stability, set.market_stability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_score_bounds() {
        assert_eq!(cap_score(0.0), 1);
        assert_eq!(cap_score(-40.0), 1);
        assert_eq!(cap_score(100.0), 98);
        assert_eq!(cap_score(55.4), 55);
        assert_eq!(cap_score(55.5), 56);
        assert_eq!(cap_score(f64::NAN), 1);
        assert_eq!(cap_score(f64::INFINITY), 98);
    }

    #[test]
    fn test_cap_score_idempotent() {
        for x in [-1e9, -3.2, 0.0, 0.49, 1.0, 42.5, 97.6, 98.0, 99.9, 100.0, 1e9] {
            let once = cap_score(x);
            assert_eq!(cap_score(once as f64), once);
        }
    }

    #[test]
    fn test_risk_bands() {
        assert_eq!(risk_band(70), RiskBand::Critical);
        assert_eq!(risk_band(69), RiskBand::High);
        assert_eq!(risk_band(50), RiskBand::High);
        assert_eq!(risk_band(30), RiskBand::Moderate);
        assert_eq!(risk_band(29), RiskBand::Low);
    }

    #[test]
    fn test_critical_consistency_pass() {
        let set = RiskScoreSet {
            overall_risk: 75,
            rug_pull: 40,
            liquidity: 98,
            contract: 60,
            community: 20,
            contract_security: 40,
            liquidity_safety: 2,
            community_health: 80,
            market_stability: 95,
            confidence: 0.8,
        };
        let out = enforce_label_consistency(set);
        assert_eq!(out.overall_risk, 75);
        assert!(out.primary_risks().iter().all(|r| (90..=98).contains(r)));
        assert_eq!(out.contract_security, 10);
        assert_eq!(out.liquidity_safety, 2);
        assert_eq!(out.community_health, 10);
        assert_eq!(out.market_stability, 10);
    }

    #[test]
    fn test_high_consistency_pass() {
        let set = RiskScoreSet {
            overall_risk: 55,
            rug_pull: 10,
            liquidity: 10,
            contract: 10,
            community: 10,
            contract_security: 90,
            liquidity_safety: 90,
            community_health: 90,
            market_stability: 90,
            confidence: 0.8,
        };
        let out = enforce_label_consistency(set);
        assert_eq!(out.primary_risks(), [80, 80, 80, 80]);
        assert_eq!(out.contract_security, 20);
        assert_eq!(out.liquidity_safety, 15);
        assert_eq!(out.community_health, 20);
        assert_eq!(out.market_stability, 20);
    }

    #[test]
    fn test_moderate_untouched() {
        let set = RiskScoreSet {
            overall_risk: 45,
            rug_pull: 10,
            contract_security: 90,
            ..Default::default()
        };
        assert_eq!(enforce_label_consistency(set), set);
    }

    #[test]
    fn test_finalize_heuristic_pairs_sum_to_100() {
        let scores = HeuristicScores {
            overall_risk: 30,
            rug_pull: 20,
            liquidity: 35,
            contract: 40,
            community: 50,
            confidence: 0.9,
            ensemble_risk: 33.0,
        };
        let market = MarketSnapshot::default();
        let set = finalize_heuristic(&scores, &market);
        assert_eq!(set.contract as u16 + set.contract_security as u16, 100);
        assert_eq!(set.liquidity as u16 + set.liquidity_safety as u16, 100);
        assert_eq!(set.community as u16 + set.community_health as u16, 100);
        assert_eq!(set.market_stability, 60);
        assert!(set.all_scores().iter().all(|s| (1..=98).contains(s)));
    }

    #[test]
    fn test_ultra_high_risk_forces_market_stability() {
        let scores = HeuristicScores {
            overall_risk: 100,
            rug_pull: 100,
            liquidity: 100,
            contract: 100,
            community: 100,
            confidence: 0.5,
            ensemble_risk: 90.0,
        };
        let market = MarketSnapshot {
            symbol: "USDT".into(),
            price: Some(1.0),
            ..Default::default()
        };
        let set = finalize_heuristic(&scores, &market);
        assert_eq!(set.market_stability, 5);
        assert_eq!(set.overall_risk, 98);
        assert_eq!(set.contract_security, 1);
    }

    #[test]
    fn test_labels() {
        assert_eq!(score_label(10), "Very Low");
        assert_eq!(score_label(25), "Low");
        assert_eq!(score_label(40), "Low-Moderate");
        assert_eq!(score_label(60), "Moderate");
        assert_eq!(score_label(75), "Moderate-High");
        assert_eq!(score_label(90), "High");
        assert_eq!(score_label(91), "Very High");

        let given = MetricLabels {
            rug_pull: Some("Custom".into()),
            ..Default::default()
        };
        let set = RiskScoreSet {
            rug_pull: 95,
            liquidity: 5,
            ..Default::default()
        };
        let labels = complete_labels(&given, &set);
        assert_eq!(labels.rug_pull.as_deref(), Some("Custom"));
        assert_eq!(labels.liquidity.as_deref(), Some("Very Low"));
    }
}
