//! DexScreener Feed - DEX pair data
//!
//! ✅ USED FOR:
//! - Canonical pair discovery (highest 24h volume)
//! - Token name/symbol/price enrichment when the market feed is empty
//! - Liquidity risk from real pool data
//!
//! ❌ NOT USED FOR:
//! - Honeypot/tax detection (that comes from the honeypot simulator)
//!
//! Payload shape: `{ "pairs": [ { pairAddress, dexId, baseToken, priceUsd,
//! volume: {h24}, liquidity: {usd}, priceChange: {h24}, marketCap, fdv,
//! txns: {h24: {buys, sells}} } ] }`

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::market::canonical_pair;
use crate::models::{AppError, AppResult, DexPair};
use crate::providers::traits::MarketSource;

/// DexScreener API response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// Parse a raw DexScreener body
pub fn parse_response(body: &str) -> AppResult<DexScreenerResponse> {
    serde_json::from_str(body)
        .map_err(|e| AppError::provider_unavailable("dex", format!("Failed to parse DexScreener response: {}", e)))
}

/// Where the feed's pairs come from
#[derive(Debug, Clone)]
enum FeedSource {
    /// Already-decoded pairs; `None` means the aggregator had nothing
    Pairs(Option<Vec<DexPair>>),
    /// Raw response body, decoded on fetch
    Body(String),
}

/// Market adapter backed by an already-fetched DexScreener payload.
///
/// An empty pair list is still real (empty) data and drives the DEX
/// liquidity rule. A raw body that fails to decode is an adapter error,
/// so the pipeline treats it as missing market data.
#[derive(Debug, Clone)]
pub struct DexScreenerFeed {
    source: FeedSource,
}

impl Default for DexScreenerFeed {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DexScreenerFeed {
    pub fn new(pairs: Option<Vec<DexPair>>) -> Self {
        Self {
            source: FeedSource::Pairs(pairs),
        }
    }

    /// Feed over an undecoded DexScreener response body
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            source: FeedSource::Body(body.into()),
        }
    }

    fn resolve(&self) -> AppResult<Option<Vec<DexPair>>> {
        match &self.source {
            FeedSource::Pairs(pairs) => Ok(pairs.clone()),
            FeedSource::Body(body) => parse_response(body).map(|r| r.pairs),
        }
    }
}

impl MarketSource for DexScreenerFeed {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    fn fetch_pairs<'a>(
        &'a self,
        token_address: &'a str,
    ) -> BoxFuture<'a, AppResult<Option<Vec<DexPair>>>> {
        Box::pin(async move {
            debug!("🔍 DexScreener: pairs for {}", token_address);
            let pairs = self.resolve()?;
            if let Some(list) = &pairs {
                match canonical_pair(list) {
                    Some(best) => info!(
                        "📊 DexScreener: {} pairs, best {} (${:.2} liquidity, ${:.2} volume)",
                        list.len(),
                        best.dex_id.as_deref().unwrap_or("unknown"),
                        best.liquidity_usd(),
                        best.volume_h24()
                    ),
                    None => info!("📊 DexScreener: no pairs for {}", token_address),
                }
            }
            Ok(pairs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "pairs": [
            {
                "pairAddress": "0xpair1",
                "dexId": "uniswap",
                "baseToken": {"address": "0xtoken", "name": "Pepe", "symbol": "PEPE"},
                "priceUsd": "0.0000012",
                "volume": {"h24": 1500000},
                "liquidity": {"usd": 4200000},
                "priceChange": {"h24": -3.2},
                "marketCap": 500000000,
                "txns": {"h24": {"buys": 120, "sells": 98}}
            },
            {
                "pairAddress": "0xpair2",
                "dexId": "sushiswap",
                "volume": {"h24": 20000},
                "liquidity": {"usd": 80000}
            }
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let response = parse_response(BODY).unwrap();
        let pairs = response.pairs.unwrap();
        assert_eq!(pairs.len(), 2);
        let best = canonical_pair(&pairs).unwrap();
        assert_eq!(best.pair_address.as_deref(), Some("0xpair1"));
        assert_eq!(best.price(), Some(0.0000012));
        assert_eq!(best.txns.h24.buys, 120);
    }

    #[test]
    fn test_missing_pairs_field() {
        assert!(parse_response(r#"{"schemaVersion": "1.0.0"}"#).unwrap().pairs.is_none());
        assert!(parse_response(r#"{"pairs": null}"#).unwrap().pairs.is_none());
    }

    #[tokio::test]
    async fn test_invalid_body_is_adapter_error() {
        assert!(parse_response("<html>rate limited</html>").is_err());
        let feed = DexScreenerFeed::from_body("<html>rate limited</html>");
        let err = feed.fetch_pairs("0xtoken").await.unwrap_err();
        assert_eq!(err.code, crate::models::ErrorCode::ProviderUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_pairs() {
        let feed = DexScreenerFeed::from_body(BODY);
        let pairs = feed.fetch_pairs("0xtoken").await.unwrap().unwrap();
        assert_eq!(pairs.len(), 2);

        let empty = DexScreenerFeed::new(Some(vec![]));
        let pairs = empty.fetch_pairs("0xtoken").await.unwrap();
        assert!(pairs.is_some_and(|p| p.is_empty()));

        let none = DexScreenerFeed::default();
        assert!(none.fetch_pairs("0xtoken").await.unwrap().is_none());
    }
}
