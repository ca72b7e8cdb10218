//! Feature Extraction Module
//!
//! Converts loosely-typed provider payloads into a flat `TokenFeatures`
//! vector. Any payload may be absent. Provider values are sanitized here;
//! [`check_features`] rejects vectors a custom estimator has poisoned.
//!
//! Gaps are filled in one of two ways:
//! - Fixed defaults (rank 9999, concentration 50, holders 100, sentiment 50)
//! - Bounded estimates drawn from an injected `Estimator` (owner share,
//!   lock duration, complexity). Range bounds are decision boundaries and
//!   are pinned by tests.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::core::estimator::Estimator;
use crate::models::{
    AppError, AppResult, ContractInfo, DexPair, FeatureKey, HoneypotReport, SocialStats, TokenData,
    TokenFeatures,
};
use crate::utils::constants::{
    DEFAULT_HOLDER_CONCENTRATION, DEFAULT_MARKET_CAP_RANK, DEFAULT_SOCIAL_SENTIMENT,
    DEFAULT_TOTAL_HOLDERS, SECS_PER_DAY,
};

lazy_static! {
    static ref FUNCTION_RE: Regex = Regex::new(r"function\s+").unwrap();
    static ref MODIFIER_RE: Regex = Regex::new(r"modifier\s+").unwrap();
}

/// Provider outputs for one token (any may be missing)
#[derive(Debug, Clone, Copy)]
pub struct FeatureInputs<'a> {
    pub token: &'a TokenData,
    pub contract: Option<&'a ContractInfo>,
    pub honeypot: Option<&'a HoneypotReport>,
    pub social: Option<&'a SocialStats>,
}

/// Finite value or fallback
#[inline]
fn finite_or(v: f64, default: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

/// First strictly positive finite value among candidates
fn first_positive(candidates: &[Option<f64>]) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| v.is_finite() && *v > 0.0)
}

// ============================================
// ENRICHMENT
// ============================================

/// Copy market figures from the canonical DEX pair onto the token snapshot
pub fn enrich_token(token: &TokenData, pair: Option<&DexPair>) -> TokenData {
    let Some(pair) = pair else {
        return token.clone();
    };

    let mut enriched = token.clone();
    if let Some(base) = &pair.base_token {
        if !base.name.is_empty() {
            enriched.name = Some(base.name.clone());
        }
        if !base.symbol.is_empty() {
            enriched.symbol = Some(base.symbol.clone());
        }
    }
    enriched.price = Some(pair.price().unwrap_or(0.0));
    enriched.market_cap = Some(
        first_positive(&[pair.market_cap, pair.fdv, token.market_cap]).unwrap_or(0.0),
    );
    enriched.trading_volume =
        Some(first_positive(&[pair.volume.h24, token.trading_volume]).unwrap_or(0.0));
    enriched.price_change_24h = Some(pair.price_change.h24.unwrap_or(0.0));
    if let Some(usd) = pair.liquidity.usd.filter(|v| v.is_finite()) {
        enriched.liquidity_usd = Some(usd);
    }
    enriched
}

// ============================================
// DERIVATIONS
// ============================================

/// Days since creation, 0 when unknown
pub fn contract_age_days(creation: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match creation {
        Some(created) => {
            let secs = (now - created).num_seconds() as f64;
            (secs / SECS_PER_DAY).max(0.0)
        }
        None => 0.0,
    }
}

/// Honeypot probability from the simulator verdict and taxes
pub fn honeypot_probability(report: Option<&HoneypotReport>) -> f64 {
    let Some(report) = report else {
        return 0.0;
    };
    let hp = &report.honeypot_result;
    if hp.is_honeypot {
        return 100.0;
    }

    let sell = finite_or(hp.sell_tax, 0.0);
    let buy = finite_or(hp.buy_tax, 0.0);
    let mut probability: f64 = 0.0;

    if sell > 50.0 {
        probability += 80.0;
    } else if sell > 30.0 {
        probability += 60.0;
    } else if sell > 20.0 {
        probability += 40.0;
    } else if sell > 10.0 {
        probability += 20.0;
    }

    if buy > 20.0 {
        probability += 30.0;
    } else if buy > 15.0 {
        probability += 20.0;
    }

    probability.min(100.0)
}

/// Measured owner share, or an estimate from renouncement and age
pub fn owner_token_percentage(
    token: &TokenData,
    contract: Option<&ContractInfo>,
    age_days: f64,
    estimator: &mut dyn Estimator,
) -> f64 {
    if let Some(pct) = token.owner_token_percentage.filter(|v| v.is_finite()) {
        return pct.clamp(0.0, 100.0);
    }
    if contract.map(|c| c.has_ownership_renounced).unwrap_or(false) {
        return estimator.sample(0.0..10.0);
    }
    if age_days < 7.0 {
        estimator.sample(30.0..80.0)
    } else if age_days < 30.0 {
        estimator.sample(20.0..50.0)
    } else {
        estimator.sample(5.0..25.0)
    }
}

/// Remaining lock days, or an estimate when only a "locked" flag exists
pub fn liquidity_lock_days(
    token: &TokenData,
    now: DateTime<Utc>,
    estimator: &mut dyn Estimator,
) -> f64 {
    if let Some(end) = token.liquidity_lock_end_time {
        let secs = (end - now).num_seconds() as f64;
        return (secs / SECS_PER_DAY).max(0.0);
    }
    if token.is_liquidity_locked {
        return estimator.sample(30.0..330.0);
    }
    0.0
}

/// Volume / market cap (market cap of 1 when missing)
pub fn volume_ratio(token: &TokenData) -> f64 {
    let volume = token
        .trading_volume
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    let market_cap = first_positive(&[token.market_cap]).unwrap_or(1.0);
    volume / market_cap
}

/// Suspicious-volume score from the volume ratio
pub fn volume_anomaly_score(ratio: f64) -> f64 {
    if ratio > 5.0 {
        return 95.0;
    }
    if ratio > 2.0 {
        return 80.0;
    }
    if ratio > 1.0 {
        return 60.0;
    }
    if ratio < 0.001 {
        return 70.0;
    }
    (30.0 - ratio * 20.0).clamp(0.0, 100.0)
}

/// Function + 2 x modifier count in verified source, else an estimate
pub fn contract_complexity(contract: Option<&ContractInfo>, estimator: &mut dyn Estimator) -> f64 {
    match contract.and_then(|c| c.source_code.as_deref()) {
        Some(src) if !src.trim().is_empty() => {
            let functions = FUNCTION_RE.find_iter(src).count();
            let modifiers = MODIFIER_RE.find_iter(src).count();
            (functions + modifiers * 2) as f64
        }
        _ => 10.0 + estimator.sample(0.0..50.0).floor(),
    }
}

/// Holder spread: inverse of concentration, nudged by holder count
pub fn holder_distribution_score(concentration: f64, total_holders: f64) -> f64 {
    let mut score = 100.0 - concentration;
    if total_holders > 10_000.0 {
        score += 20.0;
    } else if total_holders > 1_000.0 {
        score += 10.0;
    } else if total_holders < 100.0 {
        score -= 20.0;
    }
    score.clamp(0.0, 100.0)
}

// ============================================
// EXTRACTION
// ============================================

/// Build the feature vector for one token snapshot
pub fn extract_features(
    inputs: FeatureInputs<'_>,
    estimator: &mut dyn Estimator,
    now: DateTime<Utc>,
) -> TokenFeatures {
    let token = inputs.token;
    let hp = inputs.honeypot.map(|r| &r.honeypot_result);
    let social = inputs.social;
    let community = token.community_data.as_ref();
    let developer = token.developer_data.as_ref();

    let age = contract_age_days(token.creation_time, now);
    let ratio = volume_ratio(token);
    let change = finite_or(token.price_change_24h.unwrap_or(0.0), 0.0);
    let concentration =
        first_positive(&[token.holder_concentration]).unwrap_or(DEFAULT_HOLDER_CONCENTRATION);
    let holders = first_positive(&[token.total_holders]).unwrap_or(DEFAULT_TOTAL_HOLDERS);

    let features = TokenFeatures {
        is_honeypot: hp.map(|h| h.is_honeypot).unwrap_or(false),
        honeypot_probability: honeypot_probability(inputs.honeypot),
        sell_tax: finite_or(hp.map(|h| h.sell_tax).unwrap_or(0.0), 0.0),
        buy_tax: finite_or(hp.map(|h| h.buy_tax).unwrap_or(0.0), 0.0),
        owner_token_percentage: owner_token_percentage(token, inputs.contract, age, estimator),
        liquidity_lock_days: liquidity_lock_days(token, now, estimator),

        is_verified: inputs.contract.map(|c| c.is_verified).unwrap_or(false),
        ownership_renounced: inputs
            .contract
            .map(|c| c.has_ownership_renounced)
            .unwrap_or(false),
        contract_age_days: age,
        contract_complexity: contract_complexity(inputs.contract, estimator),
        is_proxy: inputs.contract.and_then(|c| c.is_proxy).unwrap_or(false),

        price_volatility: change.abs(),
        volume_anomaly_score: volume_anomaly_score(ratio),
        market_cap_rank: first_positive(&[token.market_cap_rank]).unwrap_or(DEFAULT_MARKET_CAP_RANK),
        volume_to_market_cap: finite_or(ratio, 0.0),
        price_change_24h: change.abs(),
        liquidity_usd: first_positive(&[token.liquidity_usd]).unwrap_or(0.0),

        top_holders_concentration: concentration,
        total_holders: holders,
        holder_distribution_score: holder_distribution_score(concentration, holders),
        whale_holder_count: first_positive(&[token.whale_holders]).unwrap_or(0.0),

        twitter_followers: first_positive(&[
            social.and_then(|s| s.twitter_followers),
            community.and_then(|c| c.twitter_followers),
        ])
        .unwrap_or(0.0),
        telegram_members: first_positive(&[
            social.and_then(|s| s.telegram_channel_user_count),
            community.and_then(|c| c.telegram_users),
        ])
        .unwrap_or(0.0),
        social_sentiment: first_positive(&[social.and_then(|s| s.bullish_sentiment)])
            .unwrap_or(DEFAULT_SOCIAL_SENTIMENT),
        social_volume_score: first_positive(&[social.and_then(|s| s.social_volume)])
            .unwrap_or(0.0),

        github_stars: first_positive(&[developer.and_then(|d| d.stars)]).unwrap_or(0.0),
        github_forks: first_positive(&[developer.and_then(|d| d.forks)]).unwrap_or(0.0),
        commit_activity: first_positive(&[developer.and_then(|d| d.commit_count)]).unwrap_or(0.0),
        has_whitepaper: token.has_whitepaper,
        team_doxxed: token.team_doxxed,
    };

    debug!(
        "🔬 Features: honeypot={} prob={:.0} sell={:.1} owner={:.1}% lock={:.0}d verified={} age={:.1}d",
        features.is_honeypot,
        features.honeypot_probability,
        features.sell_tax,
        features.owner_token_percentage,
        features.liquidity_lock_days,
        features.is_verified,
        features.contract_age_days,
    );

    features
}

/// Every feature must be a finite number before scoring
pub fn check_features(features: &TokenFeatures) -> AppResult<()> {
    let bad: Vec<String> = FeatureKey::ALL
        .iter()
        .filter(|key| !features.get(**key).is_finite())
        .map(|key| format!("{:?}", key))
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(AppError::feature_extraction_failed(format!(
            "non-finite features: {}",
            bad.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimator::FixedEstimator;
    use crate::models::{HoneypotResult, PairLiquidity, PairToken, WindowValue};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn report(is_honeypot: bool, sell: f64, buy: f64) -> HoneypotReport {
        HoneypotReport {
            honeypot_result: HoneypotResult {
                is_honeypot,
                sell_tax: sell,
                buy_tax: buy,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_honeypot_probability_bands() {
        assert_eq!(honeypot_probability(None), 0.0);
        assert_eq!(honeypot_probability(Some(&report(true, 0.0, 0.0))), 100.0);
        assert_eq!(honeypot_probability(Some(&report(false, 55.0, 0.0))), 80.0);
        assert_eq!(honeypot_probability(Some(&report(false, 25.0, 16.0))), 60.0);
        assert_eq!(honeypot_probability(Some(&report(false, 60.0, 25.0))), 100.0);
        assert_eq!(honeypot_probability(Some(&report(false, 10.0, 15.0))), 0.0);
    }

    #[test]
    fn test_owner_percentage_estimation_ranges() {
        let token = TokenData::default();
        let renounced = ContractInfo {
            has_ownership_renounced: true,
            ..Default::default()
        };
        let mut low = FixedEstimator::low();
        let mut high = FixedEstimator::new(1.0);

        assert_eq!(owner_token_percentage(&token, Some(&renounced), 1.0, &mut low), 0.0);
        assert_eq!(owner_token_percentage(&token, Some(&renounced), 1.0, &mut high), 10.0);
        assert_eq!(owner_token_percentage(&token, None, 3.0, &mut low), 30.0);
        assert_eq!(owner_token_percentage(&token, None, 3.0, &mut high), 80.0);
        assert_eq!(owner_token_percentage(&token, None, 10.0, &mut low), 20.0);
        assert_eq!(owner_token_percentage(&token, None, 100.0, &mut high), 25.0);
    }

    #[test]
    fn test_measured_owner_percentage_wins() {
        let token = TokenData {
            owner_token_percentage: Some(12.5),
            ..Default::default()
        };
        let mut est = FixedEstimator::new(1.0);
        assert_eq!(owner_token_percentage(&token, None, 0.0, &mut est), 12.5);
    }

    #[test]
    fn test_lock_duration() {
        let mut est = FixedEstimator::low();
        let expiring = TokenData {
            liquidity_lock_end_time: Some(now() + Duration::days(10)),
            ..Default::default()
        };
        assert!((liquidity_lock_days(&expiring, now(), &mut est) - 10.0).abs() < 1e-9);

        let expired = TokenData {
            liquidity_lock_end_time: Some(now() - Duration::days(3)),
            ..Default::default()
        };
        assert_eq!(liquidity_lock_days(&expired, now(), &mut est), 0.0);

        let flagged = TokenData {
            is_liquidity_locked: true,
            ..Default::default()
        };
        assert_eq!(liquidity_lock_days(&flagged, now(), &mut est), 30.0);
        assert_eq!(liquidity_lock_days(&TokenData::default(), now(), &mut est), 0.0);
    }

    #[test]
    fn test_volume_anomaly_table() {
        assert_eq!(volume_anomaly_score(6.0), 95.0);
        assert_eq!(volume_anomaly_score(3.0), 80.0);
        assert_eq!(volume_anomaly_score(1.5), 60.0);
        assert_eq!(volume_anomaly_score(0.0005), 70.0);
        assert!((volume_anomaly_score(0.5) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_contract_complexity_counts_source() {
        let contract = ContractInfo {
            source_code: Some(
                "function a() {} function b() {} modifier onlyOwner() {} functional".into(),
            ),
            ..Default::default()
        };
        let mut est = FixedEstimator::new(1.0);
        assert_eq!(contract_complexity(Some(&contract), &mut est), 4.0);
        assert_eq!(contract_complexity(None, &mut FixedEstimator::low()), 10.0);
    }

    #[test]
    fn test_missing_inputs_use_defaults() {
        let token = TokenData::default();
        let inputs = FeatureInputs {
            token: &token,
            contract: None,
            honeypot: None,
            social: None,
        };
        let f = extract_features(inputs, &mut FixedEstimator::low(), now());
        assert_eq!(f.market_cap_rank, 9999.0);
        assert_eq!(f.top_holders_concentration, 50.0);
        assert_eq!(f.total_holders, 100.0);
        assert_eq!(f.social_sentiment, 50.0);
        assert_eq!(f.contract_age_days, 0.0);
        assert_eq!(f.liquidity_lock_days, 0.0);
        assert_eq!(f.volume_anomaly_score, 70.0);
        // holders == 100 is not < 100
        assert_eq!(f.holder_distribution_score, 50.0);
        assert!(!f.is_verified);
    }

    #[test]
    fn test_nan_inputs_are_sanitized() {
        let token = TokenData {
            price_change_24h: Some(f64::NAN),
            trading_volume: Some(f64::NAN),
            ..Default::default()
        };
        let hp = report(false, f64::NAN, f64::INFINITY);
        let inputs = FeatureInputs {
            token: &token,
            contract: None,
            honeypot: Some(&hp),
            social: None,
        };
        let f = extract_features(inputs, &mut FixedEstimator::low(), now());
        assert_eq!(f.sell_tax, 0.0);
        assert_eq!(f.buy_tax, 0.0);
        assert_eq!(f.price_volatility, 0.0);
        assert!(f.volume_to_market_cap.is_finite());
    }

    #[test]
    fn test_enrich_from_pair() {
        let token = TokenData {
            name: Some("Old".into()),
            market_cap: Some(5.0),
            ..Default::default()
        };
        let pair = DexPair {
            base_token: Some(PairToken {
                address: "0xabc".into(),
                name: "Shiny".into(),
                symbol: "SHN".into(),
            }),
            price_usd: Some("0.25".into()),
            volume: WindowValue { h24: Some(1000.0) },
            liquidity: PairLiquidity { usd: Some(2500.0) },
            fdv: Some(40_000.0),
            ..Default::default()
        };
        let enriched = enrich_token(&token, Some(&pair));
        assert_eq!(enriched.name.as_deref(), Some("Shiny"));
        assert_eq!(enriched.symbol.as_deref(), Some("SHN"));
        assert_eq!(enriched.price, Some(0.25));
        assert_eq!(enriched.market_cap, Some(40_000.0));
        assert_eq!(enriched.trading_volume, Some(1000.0));
        assert_eq!(enriched.price_change_24h, Some(0.0));
        assert_eq!(enriched.liquidity_usd, Some(2500.0));
    }

    #[test]
    fn test_check_features_rejects_non_finite() {
        assert!(check_features(&TokenFeatures::default()).is_ok());

        let poisoned = TokenFeatures {
            owner_token_percentage: f64::NAN,
            contract_complexity: f64::INFINITY,
            ..Default::default()
        };
        let err = check_features(&poisoned).unwrap_err();
        assert_eq!(err.code, crate::models::ErrorCode::FeatureExtractionFailed);
        assert!(err.message.contains("OwnerTokenPercentage"));
    }
}
