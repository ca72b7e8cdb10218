//! Market Stability & DEX Liquidity Rules
//!
//! Market stability is scored two ways:
//! - Stablecoins: distance of the price from the $1 peg
//! - Everything else: absolute 24h price change as a volatility proxy
//!
//! When real DEX pair data is available the AI liquidity score is replaced
//! by a rule over on-chain liquidity and volume.

use crate::models::DexPair;
use crate::utils::constants::{
    is_stablecoin, DEX_MID_LIQUIDITY_USD, DEX_THIN_MARKET_USD, MARKET_BOOST_SAFETY_THRESHOLD,
    MARKET_STABILITY_BOOST,
};

/// Highest 24h-volume pair (first wins on ties)
pub fn canonical_pair(pairs: &[DexPair]) -> Option<&DexPair> {
    pairs.iter().fold(None, |best: Option<&DexPair>, pair| match best {
        Some(b) if b.volume_h24() >= pair.volume_h24() => Some(b),
        _ => Some(pair),
    })
}

/// Market figures the stability rules need
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub price_change_24h: Option<f64>,
    /// True when the figures came from a DEX pair
    pub from_dex: bool,
}

/// Base market stability (0-100)
pub fn market_stability(snapshot: &MarketSnapshot) -> f64 {
    if is_stablecoin(&snapshot.symbol, &snapshot.name) {
        let Some(price) = snapshot.price.filter(|p| p.is_finite() && *p > 0.0) else {
            return 70.0;
        };
        let deviation_pct = (price - 1.0).abs() * 100.0;
        return if deviation_pct < 0.01 {
            100.0
        } else if deviation_pct < 0.05 {
            97.0
        } else if deviation_pct < 0.1 {
            94.0
        } else if deviation_pct < 0.2 {
            89.0
        } else {
            80.0
        };
    }

    match snapshot.price_change_24h.filter(|c| c.is_finite()) {
        Some(change) => {
            let volatility = change.abs();
            if volatility <= 2.0 {
                95.0
            } else if volatility <= 5.0 {
                85.0
            } else if volatility <= 10.0 {
                75.0
            } else {
                50.0
            }
        }
        None => 60.0,
    }
}

/// Market stability with the strong-safety boost applied.
///
/// The boost only applies to DEX-sourced figures when contract security,
/// liquidity safety and community health all exceed the threshold.
pub fn boosted_market_stability(snapshot: &MarketSnapshot, safety: [u8; 3]) -> f64 {
    let base = market_stability(snapshot);
    let strong = safety.iter().all(|s| *s > MARKET_BOOST_SAFETY_THRESHOLD);
    if snapshot.from_dex && strong {
        (base + MARKET_STABILITY_BOOST).min(100.0)
    } else {
        base
    }
}

/// Liquidity risk from real pool data (canonical pair)
pub fn dex_liquidity_risk(pair: Option<&DexPair>) -> f64 {
    let Some(pair) = pair else {
        return 80.0;
    };
    let liquidity = pair.liquidity_usd();
    let volume = pair.volume_h24();

    if liquidity < DEX_THIN_MARKET_USD || volume < DEX_THIN_MARKET_USD {
        80.0
    } else if liquidity < DEX_MID_LIQUIDITY_USD {
        40.0
    } else {
        10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PairLiquidity, WindowValue};

    fn stablecoin(price: Option<f64>) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "USDC".into(),
            name: "USD Coin".into(),
            price,
            price_change_24h: Some(0.01),
            from_dex: true,
        }
    }

    fn pair(liquidity: f64, volume: f64) -> DexPair {
        DexPair {
            liquidity: PairLiquidity {
                usd: Some(liquidity),
            },
            volume: WindowValue { h24: Some(volume) },
            ..Default::default()
        }
    }

    #[test]
    fn test_stablecoin_peg_bands() {
        assert_eq!(market_stability(&stablecoin(Some(1.0))), 100.0);
        assert_eq!(market_stability(&stablecoin(Some(1.0003))), 97.0);
        assert_eq!(market_stability(&stablecoin(Some(0.9992))), 94.0);
        assert_eq!(market_stability(&stablecoin(Some(1.0015))), 89.0);
        assert_eq!(market_stability(&stablecoin(Some(0.95))), 80.0);
        assert_eq!(market_stability(&stablecoin(None)), 70.0);
    }

    #[test]
    fn test_volatility_bands() {
        let mut s = MarketSnapshot {
            symbol: "PEPE".into(),
            name: "Pepe".into(),
            ..Default::default()
        };
        assert_eq!(market_stability(&s), 60.0);
        s.price_change_24h = Some(-2.0);
        assert_eq!(market_stability(&s), 95.0);
        s.price_change_24h = Some(4.0);
        assert_eq!(market_stability(&s), 85.0);
        s.price_change_24h = Some(10.0);
        assert_eq!(market_stability(&s), 75.0);
        s.price_change_24h = Some(-40.0);
        assert_eq!(market_stability(&s), 50.0);
    }

    #[test]
    fn test_boost_requires_dex_and_strong_safety() {
        let mut s = MarketSnapshot {
            symbol: "ETH".into(),
            name: "Ether".into(),
            price_change_24h: Some(30.0),
            from_dex: true,
            ..Default::default()
        };
        assert_eq!(boosted_market_stability(&s, [90, 85, 81]), 80.0);
        assert_eq!(boosted_market_stability(&s, [90, 80, 81]), 50.0);
        s.from_dex = false;
        assert_eq!(boosted_market_stability(&s, [90, 85, 81]), 50.0);
        assert_eq!(boosted_market_stability(&stablecoin(Some(1.0)), [99, 99, 99]), 100.0);
    }

    #[test]
    fn test_canonical_pair_prefers_volume_then_order() {
        let pairs = vec![pair(1.0, 100.0), pair(2.0, 900.0), pair(3.0, 900.0), pair(4.0, 50.0)];
        let best = canonical_pair(&pairs).unwrap();
        assert_eq!(best.liquidity_usd(), 2.0);
        assert!(canonical_pair(&[]).is_none());
    }

    #[test]
    fn test_dex_liquidity_rule() {
        assert_eq!(dex_liquidity_risk(None), 80.0);
        assert_eq!(dex_liquidity_risk(Some(&pair(5_000.0, 50_000.0))), 80.0);
        assert_eq!(dex_liquidity_risk(Some(&pair(500_000.0, 9_000.0))), 80.0);
        assert_eq!(dex_liquidity_risk(Some(&pair(50_000.0, 50_000.0))), 40.0);
        assert_eq!(dex_liquidity_risk(Some(&pair(500_000.0, 50_000.0))), 10.0);
    }
}
