//! Prefetched Provider - adapters backed by caller-supplied payloads
//!
//! The API and CLI receive provider payloads inline with the request.
//! This adapter replays them through the same traits a live client would
//! implement, so the pipeline never knows the difference.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{
    AppError, AppResult, ContractInfo, DexPair, HoneypotReport, SocialStats,
};
use crate::providers::ai::UnavailableAi;
use crate::providers::dexscreener::DexScreenerFeed;
use crate::providers::traits::{
    AiContext, AiSource, ContractSource, HoneypotSource, MarketSource, ProviderSet, SocialSource,
};

/// Raw provider payloads for one token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefetched {
    pub contract: Option<ContractInfo>,
    pub honeypot: Option<HoneypotReport>,
    pub social: Option<SocialStats>,
    pub pairs: Option<Vec<DexPair>>,
    /// Raw DexScreener response body, used when `pairs` is absent
    pub dexscreener_response: Option<String>,
    /// Raw AI response text
    pub ai_response: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PrefetchedProvider {
    payload: Prefetched,
}

impl PrefetchedProvider {
    pub fn new(payload: Prefetched) -> Self {
        Self { payload }
    }
}

impl ContractSource for PrefetchedProvider {
    fn name(&self) -> &'static str {
        "contract:prefetched"
    }

    fn fetch_contract<'a>(&'a self, _: &'a str) -> BoxFuture<'a, AppResult<Option<ContractInfo>>> {
        Box::pin(async move { Ok(self.payload.contract.clone()) })
    }
}

impl HoneypotSource for PrefetchedProvider {
    fn name(&self) -> &'static str {
        "honeypot:prefetched"
    }

    fn fetch_honeypot<'a>(&'a self, _: &'a str) -> BoxFuture<'a, AppResult<Option<HoneypotReport>>> {
        Box::pin(async move { Ok(self.payload.honeypot.clone()) })
    }
}

impl SocialSource for PrefetchedProvider {
    fn name(&self) -> &'static str {
        "social:prefetched"
    }

    fn fetch_social<'a>(&'a self, _: &'a str) -> BoxFuture<'a, AppResult<Option<SocialStats>>> {
        Box::pin(async move { Ok(self.payload.social.clone()) })
    }
}

impl AiSource for PrefetchedProvider {
    fn name(&self) -> &'static str {
        "ai:prefetched"
    }

    fn assess<'a>(&'a self, _: &'a AiContext) -> BoxFuture<'a, AppResult<String>> {
        Box::pin(async move {
            self.payload
                .ai_response
                .clone()
                .ok_or_else(|| AppError::ai_unavailable("no AI response supplied"))
        })
    }
}

impl ProviderSet {
    /// Adapter set replaying one prefetched payload
    pub fn from_prefetched(payload: Prefetched) -> Self {
        let feed = match (&payload.pairs, &payload.dexscreener_response) {
            (None, Some(body)) => DexScreenerFeed::from_body(body.clone()),
            (pairs, _) => DexScreenerFeed::new(pairs.clone()),
        };
        let market: Arc<dyn MarketSource> = Arc::new(feed);
        let ai: Arc<dyn AiSource> = if payload.ai_response.is_some() {
            Arc::new(PrefetchedProvider::new(payload.clone()))
        } else {
            Arc::new(UnavailableAi)
        };
        let provider = Arc::new(PrefetchedProvider::new(payload));

        Self {
            contract: provider.clone(),
            honeypot: provider.clone(),
            social: provider,
            market,
            ai,
        }
    }

    /// Every adapter reports missing data
    pub fn empty() -> Self {
        Self::from_prefetched(Prefetched::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;

    #[tokio::test]
    async fn test_replays_payloads() {
        let payload = Prefetched {
            contract: Some(ContractInfo {
                is_verified: true,
                ..Default::default()
            }),
            ai_response: Some("{\"rugPullRisk\": 10}".into()),
            ..Default::default()
        };
        let set = ProviderSet::from_prefetched(payload);

        let contract = set.contract.fetch_contract("0xabc").await.unwrap();
        assert!(contract.is_some_and(|c| c.is_verified));
        assert!(set.honeypot.fetch_honeypot("0xabc").await.unwrap().is_none());
        assert!(set.social.fetch_social("ABC").await.unwrap().is_none());
        assert!(set.market.fetch_pairs("0xabc").await.unwrap().is_none());
        assert_eq!(set.ai.name(), "ai:prefetched");
    }

    #[tokio::test]
    async fn test_empty_set_has_no_ai() {
        let set = ProviderSet::empty();
        assert_eq!(set.ai.name(), "ai:unavailable");
        let ctx = AiContext {
            token_address: "0xabc".into(),
            token: Default::default(),
            contract: None,
            honeypot: None,
            social: None,
            pairs: None,
        };
        let err = set.ai.assess(&ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AiUnavailable);
    }

    #[tokio::test]
    async fn test_raw_dexscreener_body() {
        let payload: Prefetched = serde_json::from_str(
            r#"{"dexscreener_response": "{\"pairs\": [{\"dexId\": \"uniswap\", \"volume\": {\"h24\": 10}}]}"}"#,
        )
        .unwrap();
        let set = ProviderSet::from_prefetched(payload);
        let pairs = set.market.fetch_pairs("0xabc").await.unwrap().unwrap();
        assert_eq!(pairs[0].dex_id.as_deref(), Some("uniswap"));

        // decoded pairs win over the raw body
        let payload = Prefetched {
            pairs: Some(vec![]),
            dexscreener_response: Some("not json".into()),
            ..Default::default()
        };
        let set = ProviderSet::from_prefetched(payload);
        assert!(set.market.fetch_pairs("0xabc").await.unwrap().is_some_and(|p| p.is_empty()));

        let payload = Prefetched {
            dexscreener_response: Some("not json".into()),
            ..Default::default()
        };
        let set = ProviderSet::from_prefetched(payload);
        assert!(set.market.fetch_pairs("0xabc").await.is_err());
    }

    #[test]
    fn test_payload_deserializes_partial() {
        let payload: Prefetched = serde_json::from_str(
            r#"{"honeypot": {"honeypotResult": {"isHoneypot": true, "sellTax": 99}}}"#,
        )
        .unwrap();
        let report = payload.honeypot.unwrap();
        assert!(report.honeypot_result.is_honeypot);
        assert_eq!(report.honeypot_result.sell_tax, 99.0);
    }
}
