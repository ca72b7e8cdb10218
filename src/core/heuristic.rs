//! Heuristic Risk Model
//!
//! Rule-based scorer used whenever the AI provider is unavailable.
//!
//! Structure:
//! 1. Four additive rule tables (rug pull, liquidity, contract, community),
//!    each clamped to 0-100. These are fully deterministic.
//! 2. Weighted overall: 0.4 rug + 0.35 liquidity + 0.2 contract + 0.05 community
//! 3. Threshold enforcement: stacked scam indicators force the overall up,
//!    stacked legitimacy indicators cap it.
//! 4. Confidence from the spread of the bootstrap tree ensemble.

use tracing::{debug, info};

use crate::core::forest::TreeEnsemble;
use crate::models::TokenFeatures;
use crate::utils::constants::{
    LEGIT_CEILING, LEGIT_CEILING_STRONG, SCAM_FLOOR, SCAM_FLOOR_STRONG, WEIGHT_COMMUNITY,
    WEIGHT_CONTRACT, WEIGHT_LIQUIDITY, WEIGHT_RUG_PULL,
};

// ============================================
// RULE WEIGHTS (calibration constants)
// ============================================

/// Rug-pull rule table
pub mod rug_pull_weights {
    pub const BASE: f64 = 5.0;
    pub const HONEYPOT: f64 = 85.0;
    pub const PROBABILITY_80: f64 = 80.0;
    pub const PROBABILITY_60: f64 = 60.0;
    pub const PROBABILITY_40: f64 = 40.0;
    pub const OWNER_70: f64 = 70.0;
    pub const OWNER_50: f64 = 50.0;
    pub const OWNER_30: f64 = 30.0;
    pub const OWNER_10: f64 = 15.0;
    pub const NO_LOCK: f64 = 60.0;
    pub const LOCK_UNDER_30: f64 = 40.0;
    pub const LOCK_UNDER_90: f64 = 20.0;
    pub const LOCK_OVER_YEAR: f64 = -15.0;
    pub const UNVERIFIED: f64 = 25.0;
    pub const NOT_RENOUNCED: f64 = 30.0;
    pub const PROXY: f64 = 20.0;
    pub const AGE_UNDER_1: f64 = 40.0;
    pub const AGE_UNDER_7: f64 = 25.0;
    pub const AGE_UNDER_30: f64 = 10.0;
    pub const AGE_OVER_YEAR: f64 = -10.0;
    pub const WHALES_OVER_5: f64 = 25.0;
    pub const WHALES_OVER_2: f64 = 15.0;
}

/// Liquidity rule table
pub mod liquidity_weights {
    pub const BASE: f64 = 3.0;
    pub const HONEYPOT: f64 = 95.0;
    pub const PROBABILITY_70: f64 = 85.0;
    pub const SELL_30: f64 = 80.0;
    pub const SELL_20: f64 = 60.0;
    pub const SELL_15: f64 = 40.0;
    pub const SELL_10: f64 = 25.0;
    pub const SELL_5: f64 = 10.0;
    pub const BUY_20: f64 = 40.0;
    pub const BUY_15: f64 = 25.0;
    pub const BUY_10: f64 = 15.0;
    pub const POOL_UNDER_1K: f64 = 50.0;
    pub const POOL_UNDER_10K: f64 = 30.0;
    pub const POOL_UNDER_50K: f64 = 15.0;
    pub const NO_LOCK: f64 = 45.0;
    pub const LOCK_UNDER_30: f64 = 25.0;
    pub const ANOMALY_80: f64 = 35.0;
    pub const ANOMALY_60: f64 = 20.0;
    pub const DEAD_VOLUME: f64 = 30.0;
    pub const PUMPED_VOLUME: f64 = 25.0;
}

/// Contract rule table
pub mod contract_weights {
    pub const BASE: f64 = 8.0;
    pub const UNVERIFIED: f64 = 50.0;
    pub const NOT_RENOUNCED: f64 = 30.0;
    pub const AGE_UNDER_1: f64 = 45.0;
    pub const AGE_UNDER_7: f64 = 30.0;
    pub const AGE_UNDER_30: f64 = 15.0;
    pub const AGE_OVER_2_YEARS: f64 = -10.0;
    pub const OVERLY_COMPLEX: f64 = 25.0;
    pub const TOO_SIMPLE: f64 = 20.0;
    pub const PROXY: f64 = 25.0;
    pub const PUNITIVE_TAX: f64 = 20.0;
}

/// Community rule table
pub mod community_weights {
    pub const BASE: f64 = 60.0;
    pub const TWITTER_100K: f64 = -35.0;
    pub const TWITTER_50K: f64 = -25.0;
    pub const TWITTER_10K: f64 = -15.0;
    pub const TWITTER_1K: f64 = -8.0;
    pub const TWITTER_UNDER_100: f64 = 20.0;
    pub const TELEGRAM_50K: f64 = -25.0;
    pub const TELEGRAM_10K: f64 = -15.0;
    pub const TELEGRAM_1K: f64 = -8.0;
    pub const TELEGRAM_UNDER_100: f64 = 15.0;
    pub const SENTIMENT_85: f64 = -20.0;
    pub const SENTIMENT_70: f64 = -10.0;
    pub const SENTIMENT_UNDER_20: f64 = 35.0;
    pub const SENTIMENT_UNDER_30: f64 = 25.0;
    pub const SOCIAL_VOLUME_80: f64 = -15.0;
    pub const SOCIAL_VOLUME_UNDER_20: f64 = 20.0;
    pub const DOXXED: f64 = -20.0;
    pub const WHITEPAPER: f64 = -10.0;
}

#[inline]
fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

// ============================================
// RULE TABLES
// ============================================

/// Rug-pull risk (0-100)
pub fn rug_pull_risk(f: &TokenFeatures) -> u8 {
    use rug_pull_weights::*;
    let mut risk = BASE;

    if f.is_honeypot {
        risk += HONEYPOT;
    }
    if f.honeypot_probability > 80.0 {
        risk += PROBABILITY_80;
    } else if f.honeypot_probability > 60.0 {
        risk += PROBABILITY_60;
    } else if f.honeypot_probability > 40.0 {
        risk += PROBABILITY_40;
    }

    if f.owner_token_percentage > 70.0 {
        risk += OWNER_70;
    } else if f.owner_token_percentage > 50.0 {
        risk += OWNER_50;
    } else if f.owner_token_percentage > 30.0 {
        risk += OWNER_30;
    } else if f.owner_token_percentage > 10.0 {
        risk += OWNER_10;
    }

    if f.liquidity_lock_days == 0.0 {
        risk += NO_LOCK;
    } else if f.liquidity_lock_days < 30.0 {
        risk += LOCK_UNDER_30;
    } else if f.liquidity_lock_days < 90.0 {
        risk += LOCK_UNDER_90;
    } else if f.liquidity_lock_days > 365.0 {
        risk += LOCK_OVER_YEAR;
    }

    if !f.is_verified {
        risk += UNVERIFIED;
    }
    if !f.ownership_renounced {
        risk += NOT_RENOUNCED;
    }
    if f.is_proxy {
        risk += PROXY;
    }

    if f.contract_age_days < 1.0 {
        risk += AGE_UNDER_1;
    } else if f.contract_age_days < 7.0 {
        risk += AGE_UNDER_7;
    } else if f.contract_age_days < 30.0 {
        risk += AGE_UNDER_30;
    } else if f.contract_age_days > 365.0 {
        risk += AGE_OVER_YEAR;
    }

    if f.whale_holder_count > 5.0 {
        risk += WHALES_OVER_5;
    } else if f.whale_holder_count > 2.0 {
        risk += WHALES_OVER_2;
    }

    clamp_score(risk)
}

/// Liquidity risk (0-100)
pub fn liquidity_risk(f: &TokenFeatures) -> u8 {
    use liquidity_weights::*;
    let mut risk = BASE;

    if f.is_honeypot {
        risk += HONEYPOT;
    }
    if f.honeypot_probability > 70.0 {
        risk += PROBABILITY_70;
    }

    if f.sell_tax > 30.0 {
        risk += SELL_30;
    } else if f.sell_tax > 20.0 {
        risk += SELL_20;
    } else if f.sell_tax > 15.0 {
        risk += SELL_15;
    } else if f.sell_tax > 10.0 {
        risk += SELL_10;
    } else if f.sell_tax > 5.0 {
        risk += SELL_5;
    }

    if f.buy_tax > 20.0 {
        risk += BUY_20;
    } else if f.buy_tax > 15.0 {
        risk += BUY_15;
    } else if f.buy_tax > 10.0 {
        risk += BUY_10;
    }

    if f.liquidity_usd < 1_000.0 {
        risk += POOL_UNDER_1K;
    } else if f.liquidity_usd < 10_000.0 {
        risk += POOL_UNDER_10K;
    } else if f.liquidity_usd < 50_000.0 {
        risk += POOL_UNDER_50K;
    }

    if f.liquidity_lock_days == 0.0 {
        risk += NO_LOCK;
    } else if f.liquidity_lock_days < 30.0 {
        risk += LOCK_UNDER_30;
    }

    if f.volume_anomaly_score > 80.0 {
        risk += ANOMALY_80;
    } else if f.volume_anomaly_score > 60.0 {
        risk += ANOMALY_60;
    }

    if f.volume_to_market_cap < 0.001 {
        risk += DEAD_VOLUME;
    } else if f.volume_to_market_cap > 2.0 {
        risk += PUMPED_VOLUME;
    }

    clamp_score(risk)
}

/// Contract risk (0-100)
pub fn contract_risk(f: &TokenFeatures) -> u8 {
    use contract_weights::*;
    let mut risk = BASE;

    if !f.is_verified {
        risk += UNVERIFIED;
    }
    if !f.ownership_renounced {
        risk += NOT_RENOUNCED;
    }

    if f.contract_age_days < 1.0 {
        risk += AGE_UNDER_1;
    } else if f.contract_age_days < 7.0 {
        risk += AGE_UNDER_7;
    } else if f.contract_age_days < 30.0 {
        risk += AGE_UNDER_30;
    } else if f.contract_age_days > 730.0 {
        risk += AGE_OVER_2_YEARS;
    }

    if f.contract_complexity > 100.0 {
        risk += OVERLY_COMPLEX;
    } else if f.contract_complexity < 10.0 {
        risk += TOO_SIMPLE;
    }

    if f.is_proxy {
        risk += PROXY;
    }
    if f.sell_tax > 25.0 || f.buy_tax > 20.0 {
        risk += PUNITIVE_TAX;
    }

    clamp_score(risk)
}

/// Community risk (0-100, 60 is neutral)
pub fn community_risk(f: &TokenFeatures) -> u8 {
    use community_weights::*;
    let mut risk = BASE;

    if f.twitter_followers > 100_000.0 {
        risk += TWITTER_100K;
    } else if f.twitter_followers > 50_000.0 {
        risk += TWITTER_50K;
    } else if f.twitter_followers > 10_000.0 {
        risk += TWITTER_10K;
    } else if f.twitter_followers > 1_000.0 {
        risk += TWITTER_1K;
    } else if f.twitter_followers < 100.0 {
        risk += TWITTER_UNDER_100;
    }

    if f.telegram_members > 50_000.0 {
        risk += TELEGRAM_50K;
    } else if f.telegram_members > 10_000.0 {
        risk += TELEGRAM_10K;
    } else if f.telegram_members > 1_000.0 {
        risk += TELEGRAM_1K;
    } else if f.telegram_members < 100.0 {
        risk += TELEGRAM_UNDER_100;
    }

    // Narrower band first so both penalties are reachable
    if f.social_sentiment > 85.0 {
        risk += SENTIMENT_85;
    } else if f.social_sentiment > 70.0 {
        risk += SENTIMENT_70;
    } else if f.social_sentiment < 20.0 {
        risk += SENTIMENT_UNDER_20;
    } else if f.social_sentiment < 30.0 {
        risk += SENTIMENT_UNDER_30;
    }

    if f.social_volume_score > 80.0 {
        risk += SOCIAL_VOLUME_80;
    } else if f.social_volume_score < 20.0 {
        risk += SOCIAL_VOLUME_UNDER_20;
    }

    if f.team_doxxed {
        risk += DOXXED;
    }
    if f.has_whitepaper {
        risk += WHITEPAPER;
    }

    clamp_score(risk)
}

// ============================================
// THRESHOLD ENFORCEMENT
// ============================================

/// Number of critical scam indicators present
pub fn scam_indicator_count(f: &TokenFeatures) -> usize {
    [
        f.is_honeypot,
        f.honeypot_probability > 70.0,
        f.sell_tax > 20.0,
        f.owner_token_percentage > 50.0,
        f.liquidity_lock_days < 1.0,
        !f.is_verified && f.contract_age_days < 7.0,
    ]
    .iter()
    .filter(|hit| **hit)
    .count()
}

/// Number of legitimacy indicators present
pub fn legit_indicator_count(f: &TokenFeatures) -> usize {
    [
        f.is_verified,
        f.ownership_renounced,
        f.contract_age_days > 365.0,
        f.liquidity_lock_days > 365.0,
        f.twitter_followers > 10_000.0,
        f.sell_tax < 5.0,
        f.owner_token_percentage < 10.0,
    ]
    .iter()
    .filter(|hit| **hit)
    .count()
}

/// Push stacked-scam profiles up and stacked-legit profiles down
pub fn enforce_thresholds(base: u8, f: &TokenFeatures) -> u8 {
    let scam = scam_indicator_count(f);
    if scam >= 3 {
        return base.max(SCAM_FLOOR_STRONG);
    }
    if scam >= 2 {
        return base.max(SCAM_FLOOR);
    }

    let legit = legit_indicator_count(f);
    if legit >= 5 {
        return base.min(LEGIT_CEILING_STRONG);
    }
    if legit >= 3 {
        return base.min(LEGIT_CEILING);
    }

    base.min(100)
}

// ============================================
// DERIVED FEATURE RISKS
// ============================================

/// Owner-concentration risk for the feature summary (0-100)
pub fn ownership_risk(f: &TokenFeatures) -> u8 {
    let mut risk: f64 = 40.0;
    if f.owner_token_percentage > 70.0 {
        risk += 50.0;
    } else if f.owner_token_percentage > 50.0 {
        risk += 35.0;
    } else if f.owner_token_percentage > 30.0 {
        risk += 20.0;
    } else if f.owner_token_percentage > 10.0 {
        risk += 10.0;
    } else {
        risk -= 15.0;
    }
    if !f.ownership_renounced {
        risk += 25.0;
    }
    clamp_score(risk)
}

/// Honeypot risk for the feature summary (0-100)
pub fn honeypot_risk(f: &TokenFeatures) -> u8 {
    if f.is_honeypot {
        return 100;
    }
    clamp_score(10.0 + f.honeypot_probability * 0.8)
}

// ============================================
// MODEL
// ============================================

/// Output of the heuristic model, before global capping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicScores {
    pub overall_risk: u8,
    pub rug_pull: u8,
    pub liquidity: u8,
    pub contract: u8,
    pub community: u8,
    pub confidence: f64,
    /// Mean tree prediction, diagnostics only
    pub ensemble_risk: f64,
}

/// Trained-once, read-only heuristic model
#[derive(Debug, Clone)]
pub struct HeuristicModel {
    ensemble: TreeEnsemble,
}

impl HeuristicModel {
    /// Train the ensemble on seeded synthetic data
    pub fn train(seed: u64, sample_count: usize, tree_count: usize) -> Self {
        Self {
            ensemble: TreeEnsemble::train_synthetic(seed, sample_count, tree_count),
        }
    }

    pub fn tree_count(&self) -> usize {
        self.ensemble.len()
    }

    /// Score one feature vector
    pub fn predict(&self, f: &TokenFeatures) -> HeuristicScores {
        let ensemble = self.ensemble.predict(f);

        let rug_pull = rug_pull_risk(f);
        let liquidity = liquidity_risk(f);
        let contract = contract_risk(f);
        let community = community_risk(f);

        let weighted = rug_pull as f64 * WEIGHT_RUG_PULL
            + liquidity as f64 * WEIGHT_LIQUIDITY
            + contract as f64 * WEIGHT_CONTRACT
            + community as f64 * WEIGHT_COMMUNITY;
        let base = clamp_score(weighted);
        let overall_risk = enforce_thresholds(base, f);

        debug!(
            "🤖 Heuristic: rug={} liq={} contract={} community={} base={} overall={} trees={:.1}",
            rug_pull, liquidity, contract, community, base, overall_risk, ensemble.mean
        );
        if overall_risk != base {
            info!(
                "⚖️ Threshold enforcement moved overall risk {} -> {}",
                base, overall_risk
            );
        }

        HeuristicScores {
            overall_risk,
            rug_pull,
            liquidity,
            contract,
            community,
            confidence: ensemble.confidence,
            ensemble_risk: ensemble.mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// honeypot, sell 60, owner 70, no lock, unverified, 3 days old
    fn scam_template() -> TokenFeatures {
        TokenFeatures {
            is_honeypot: true,
            honeypot_probability: 100.0,
            sell_tax: 60.0,
            owner_token_percentage: 70.0,
            liquidity_lock_days: 0.0,
            is_verified: false,
            contract_age_days: 3.0,
            market_cap_rank: 9999.0,
            top_holders_concentration: 50.0,
            total_holders: 100.0,
            social_sentiment: 50.0,
            ..Default::default()
        }
    }

    /// verified, renounced, 2 years old, locked 2 years, 60k followers
    fn legit_template() -> TokenFeatures {
        TokenFeatures {
            is_verified: true,
            ownership_renounced: true,
            contract_age_days: 800.0,
            liquidity_lock_days: 730.0,
            twitter_followers: 60_000.0,
            telegram_members: 20_000.0,
            sell_tax: 1.0,
            buy_tax: 1.0,
            owner_token_percentage: 3.0,
            contract_complexity: 45.0,
            liquidity_usd: 2_000_000.0,
            volume_to_market_cap: 0.1,
            volume_anomaly_score: 28.0,
            social_sentiment: 75.0,
            social_volume_score: 60.0,
            ..Default::default()
        }
    }

    fn model() -> HeuristicModel {
        HeuristicModel::train(42, 300, 5)
    }

    #[test]
    fn test_scam_template_scores_high() {
        let scores = model().predict(&scam_template());
        assert!(scores.overall_risk >= 80, "got {}", scores.overall_risk);
        assert_eq!(scores.rug_pull, 100);
        assert_eq!(scores.liquidity, 100);
    }

    #[test]
    fn test_legit_template_scores_low() {
        let scores = model().predict(&legit_template());
        assert!(scores.overall_risk <= 35, "got {}", scores.overall_risk);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let m = model();
        let f = scam_template();
        assert_eq!(m.predict(&f), m.predict(&f));
    }

    #[test]
    fn test_rug_pull_table() {
        // base 5 + owner>10 (15) + lock<90 (20) + not renounced (30) + age>365 (-10)
        let f = TokenFeatures {
            is_verified: true,
            owner_token_percentage: 20.0,
            liquidity_lock_days: 60.0,
            contract_age_days: 400.0,
            ..Default::default()
        };
        assert_eq!(rug_pull_risk(&f), 60);
    }

    #[test]
    fn test_contract_table() {
        // base 8 + complexity<10 (20); verified, renounced, age 60d
        let f = TokenFeatures {
            is_verified: true,
            ownership_renounced: true,
            contract_age_days: 60.0,
            contract_complexity: 5.0,
            ..Default::default()
        };
        assert_eq!(contract_risk(&f), 28);
    }

    #[test]
    fn test_community_sentiment_bands() {
        let mut f = TokenFeatures {
            twitter_followers: 5_000.0,
            telegram_members: 5_000.0,
            social_volume_score: 50.0,
            social_sentiment: 25.0,
            ..Default::default()
        };
        // 60 - 8 - 8 + 25
        assert_eq!(community_risk(&f), 69);
        f.social_sentiment = 10.0;
        assert_eq!(community_risk(&f), 79);
        f.social_sentiment = 90.0;
        assert_eq!(community_risk(&f), 24);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let maxed = TokenFeatures {
            is_honeypot: true,
            honeypot_probability: 100.0,
            sell_tax: 99.0,
            buy_tax: 99.0,
            is_proxy: true,
            whale_holder_count: 20.0,
            volume_anomaly_score: 95.0,
            volume_to_market_cap: 10.0,
            contract_complexity: 500.0,
            ..Default::default()
        };
        for score in [
            rug_pull_risk(&maxed),
            liquidity_risk(&maxed),
            contract_risk(&maxed),
            community_risk(&maxed),
        ] {
            assert!(score <= 100);
        }
        let glowing = TokenFeatures {
            twitter_followers: 1e6,
            telegram_members: 1e6,
            social_sentiment: 99.0,
            social_volume_score: 99.0,
            team_doxxed: true,
            has_whitepaper: true,
            ..Default::default()
        };
        assert_eq!(community_risk(&glowing), 0);
    }

    #[test]
    fn test_threshold_enforcement() {
        let mut f = legit_template();
        assert_eq!(enforce_thresholds(60, &f), 25);
        f.ownership_renounced = false;
        f.liquidity_lock_days = 100.0;
        f.owner_token_percentage = 20.0;
        // verified, age, followers, sell<5 -> 4 legit indicators
        assert_eq!(enforce_thresholds(60, &f), 35);

        let scam = scam_template();
        assert_eq!(enforce_thresholds(10, &scam), 85);
    }

    #[test]
    fn test_derived_feature_risks() {
        let f = scam_template();
        assert_eq!(ownership_risk(&f), 100);
        assert_eq!(honeypot_risk(&f), 100);
        let g = legit_template();
        assert_eq!(ownership_risk(&g), 25);
        assert_eq!(honeypot_risk(&g), 10);
    }
}
