//! Adapter Traits - External Collaborator Boundary
//!
//! Each adapter wraps one data source and returns `Ok(Some(_))` with data,
//! `Ok(None)` when the source has nothing, or an error. The pipeline treats
//! errors, timeouts and `None` identically (missing data).
//!
//! Methods return boxed futures so adapters can live behind `Arc<dyn _>`.

use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::models::{
    AppResult, ContractInfo, DexPair, HoneypotReport, SocialStats, TokenData,
};

/// Block-explorer contract info
pub trait ContractSource: Send + Sync {
    fn name(&self) -> &'static str {
        "contract"
    }

    fn fetch_contract<'a>(
        &'a self,
        token_address: &'a str,
    ) -> BoxFuture<'a, AppResult<Option<ContractInfo>>>;
}

/// Honeypot simulator
pub trait HoneypotSource: Send + Sync {
    fn name(&self) -> &'static str {
        "honeypot"
    }

    fn fetch_honeypot<'a>(
        &'a self,
        token_address: &'a str,
    ) -> BoxFuture<'a, AppResult<Option<HoneypotReport>>>;
}

/// Social-stats provider (keyed by symbol)
pub trait SocialSource: Send + Sync {
    fn name(&self) -> &'static str {
        "social"
    }

    fn fetch_social<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, AppResult<Option<SocialStats>>>;
}

/// DEX aggregator pairs
pub trait MarketSource: Send + Sync {
    fn name(&self) -> &'static str {
        "dex"
    }

    fn fetch_pairs<'a>(
        &'a self,
        token_address: &'a str,
    ) -> BoxFuture<'a, AppResult<Option<Vec<DexPair>>>>;
}

/// Everything the AI provider may look at
#[derive(Debug, Clone)]
pub struct AiContext {
    pub token_address: String,
    pub token: TokenData,
    pub contract: Option<ContractInfo>,
    pub honeypot: Option<HoneypotReport>,
    pub social: Option<SocialStats>,
    pub pairs: Option<Vec<DexPair>>,
}

/// Generative AI model returning free-form text
pub trait AiSource: Send + Sync {
    fn name(&self) -> &'static str {
        "ai"
    }

    /// Raw response text, expected to contain one JSON assessment
    fn assess<'a>(&'a self, context: &'a AiContext) -> BoxFuture<'a, AppResult<String>>;
}

/// Dependency-injected adapter set for one analysis
#[derive(Clone)]
pub struct ProviderSet {
    pub contract: Arc<dyn ContractSource>,
    pub honeypot: Arc<dyn HoneypotSource>,
    pub social: Arc<dyn SocialSource>,
    pub market: Arc<dyn MarketSource>,
    pub ai: Arc<dyn AiSource>,
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("contract", &self.contract.name())
            .field("honeypot", &self.honeypot.name())
            .field("social", &self.social.name())
            .field("market", &self.market.name())
            .field("ai", &self.ai.name())
            .finish()
    }
}
