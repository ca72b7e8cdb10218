//! Providers Module - External Data Sources
//!
//! Jalur data:
//! - Contract info, honeypot simulation, social stats (by symbol)
//! - DexScreener pairs (canonical pair = highest 24h volume)
//! - Generative AI assessment (free text with embedded JSON)
//!
//! Every source sits behind a trait so the pipeline can be driven by live
//! clients, prefetched payloads, or test doubles.

pub mod ai;
pub mod dexscreener;
pub mod prefetched;
pub mod traits;

pub use ai::{extract_json_object, parse_assessment, UnavailableAi};
pub use dexscreener::{DexScreenerFeed, DexScreenerResponse};
pub use prefetched::{Prefetched, PrefetchedProvider};
pub use traits::{
    AiContext, AiSource, ContractSource, HoneypotSource, MarketSource, ProviderSet, SocialSource,
};
