//! Type definitions for Rugscope
//! All core data structures for token risk analysis
//!
//! Provider payloads keep the wire shapes of the upstream services
//! (camelCase or snake_case as the service emits them). Engine output
//! types are serialized in snake_case.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================
// LENIENT WIRE DECODING
// ============================================

/// Numbers may arrive as `null`, numeric strings or garbage; anything that is
/// not a finite number reads as 0
fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(n.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Epoch values above this are milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

fn epoch_to_datetime(v: f64) -> Option<DateTime<Utc>> {
    if !v.is_finite() {
        return None;
    }
    let millis = if v.abs() >= EPOCH_MILLIS_THRESHOLD { v } else { v * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Parse a timestamp leniently: RFC3339, a bare date, or epoch seconds or
/// milliseconds (string or number)
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(epoch_to_datetime),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
                .or_else(|| s.parse::<f64>().ok().and_then(epoch_to_datetime))
        }
        _ => None,
    }
}

/// Unparseable timestamps read as unknown
fn timestamp_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

// ============================================
// FEATURE VECTOR
// ============================================

/// Flat feature vector describing one token snapshot.
///
/// Every field has a defined value: missing provider data is replaced by a
/// documented default or a bounded estimate during extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenFeatures {
    // Critical scam indicators
    pub is_honeypot: bool,
    pub honeypot_probability: f64,
    pub sell_tax: f64,
    pub buy_tax: f64,
    /// % of supply held by deployer/owner
    pub owner_token_percentage: f64,
    /// Days of liquidity lock remaining
    pub liquidity_lock_days: f64,

    // Contract security
    pub is_verified: bool,
    pub ownership_renounced: bool,
    pub contract_age_days: f64,
    /// Function-count proxy
    pub contract_complexity: f64,
    pub is_proxy: bool,

    // Market
    pub price_volatility: f64,
    pub volume_anomaly_score: f64,
    pub market_cap_rank: f64,
    pub volume_to_market_cap: f64,
    pub price_change_24h: f64,
    pub liquidity_usd: f64,

    // Holder distribution
    pub top_holders_concentration: f64,
    pub total_holders: f64,
    pub holder_distribution_score: f64,
    pub whale_holder_count: f64,

    // Social
    pub twitter_followers: f64,
    pub telegram_members: f64,
    pub social_sentiment: f64,
    pub social_volume_score: f64,

    // Developer / project
    pub github_stars: f64,
    pub github_forks: f64,
    pub commit_activity: f64,
    pub has_whitepaper: bool,
    pub team_doxxed: bool,
}

/// Addressable feature names, used by the tree ensemble for splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    IsHoneypot,
    HoneypotProbability,
    SellTax,
    BuyTax,
    OwnerTokenPercentage,
    LiquidityLockDays,
    IsVerified,
    OwnershipRenounced,
    ContractAgeDays,
    ContractComplexity,
    IsProxy,
    PriceVolatility,
    VolumeAnomalyScore,
    MarketCapRank,
    VolumeToMarketCap,
    PriceChange24h,
    LiquidityUsd,
    TopHoldersConcentration,
    TotalHolders,
    HolderDistributionScore,
    WhaleHolderCount,
    TwitterFollowers,
    TelegramMembers,
    SocialSentiment,
    SocialVolumeScore,
    GithubStars,
    GithubForks,
    CommitActivity,
    HasWhitepaper,
    TeamDoxxed,
}

impl FeatureKey {
    /// Every feature, in declaration order
    pub const ALL: [FeatureKey; 30] = [
        Self::IsHoneypot,
        Self::HoneypotProbability,
        Self::SellTax,
        Self::BuyTax,
        Self::OwnerTokenPercentage,
        Self::LiquidityLockDays,
        Self::IsVerified,
        Self::OwnershipRenounced,
        Self::ContractAgeDays,
        Self::ContractComplexity,
        Self::IsProxy,
        Self::PriceVolatility,
        Self::VolumeAnomalyScore,
        Self::MarketCapRank,
        Self::VolumeToMarketCap,
        Self::PriceChange24h,
        Self::LiquidityUsd,
        Self::TopHoldersConcentration,
        Self::TotalHolders,
        Self::HolderDistributionScore,
        Self::WhaleHolderCount,
        Self::TwitterFollowers,
        Self::TelegramMembers,
        Self::SocialSentiment,
        Self::SocialVolumeScore,
        Self::GithubStars,
        Self::GithubForks,
        Self::CommitActivity,
        Self::HasWhitepaper,
        Self::TeamDoxxed,
    ];

    /// Features the ensemble prefers for splits
    pub const CRITICAL: [FeatureKey; 5] = [
        Self::IsHoneypot,
        Self::HoneypotProbability,
        Self::SellTax,
        Self::OwnerTokenPercentage,
        Self::LiquidityLockDays,
    ];
}

#[inline]
fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl TokenFeatures {
    /// Numeric view of a feature (flags map to 0/1)
    pub fn get(&self, key: FeatureKey) -> f64 {
        use FeatureKey::*;
        match key {
            IsHoneypot => flag(self.is_honeypot),
            HoneypotProbability => self.honeypot_probability,
            SellTax => self.sell_tax,
            BuyTax => self.buy_tax,
            OwnerTokenPercentage => self.owner_token_percentage,
            LiquidityLockDays => self.liquidity_lock_days,
            IsVerified => flag(self.is_verified),
            OwnershipRenounced => flag(self.ownership_renounced),
            ContractAgeDays => self.contract_age_days,
            ContractComplexity => self.contract_complexity,
            IsProxy => flag(self.is_proxy),
            PriceVolatility => self.price_volatility,
            VolumeAnomalyScore => self.volume_anomaly_score,
            MarketCapRank => self.market_cap_rank,
            VolumeToMarketCap => self.volume_to_market_cap,
            PriceChange24h => self.price_change_24h,
            LiquidityUsd => self.liquidity_usd,
            TopHoldersConcentration => self.top_holders_concentration,
            TotalHolders => self.total_holders,
            HolderDistributionScore => self.holder_distribution_score,
            WhaleHolderCount => self.whale_holder_count,
            TwitterFollowers => self.twitter_followers,
            TelegramMembers => self.telegram_members,
            SocialSentiment => self.social_sentiment,
            SocialVolumeScore => self.social_volume_score,
            GithubStars => self.github_stars,
            GithubForks => self.github_forks,
            CommitActivity => self.commit_activity,
            HasWhitepaper => flag(self.has_whitepaper),
            TeamDoxxed => flag(self.team_doxxed),
        }
    }

    /// Copy one feature from another vector
    pub fn take_from(&mut self, other: &TokenFeatures, key: FeatureKey) {
        use FeatureKey::*;
        match key {
            IsHoneypot => self.is_honeypot = other.is_honeypot,
            HoneypotProbability => self.honeypot_probability = other.honeypot_probability,
            SellTax => self.sell_tax = other.sell_tax,
            BuyTax => self.buy_tax = other.buy_tax,
            OwnerTokenPercentage => self.owner_token_percentage = other.owner_token_percentage,
            LiquidityLockDays => self.liquidity_lock_days = other.liquidity_lock_days,
            IsVerified => self.is_verified = other.is_verified,
            OwnershipRenounced => self.ownership_renounced = other.ownership_renounced,
            ContractAgeDays => self.contract_age_days = other.contract_age_days,
            ContractComplexity => self.contract_complexity = other.contract_complexity,
            IsProxy => self.is_proxy = other.is_proxy,
            PriceVolatility => self.price_volatility = other.price_volatility,
            VolumeAnomalyScore => self.volume_anomaly_score = other.volume_anomaly_score,
            MarketCapRank => self.market_cap_rank = other.market_cap_rank,
            VolumeToMarketCap => self.volume_to_market_cap = other.volume_to_market_cap,
            PriceChange24h => self.price_change_24h = other.price_change_24h,
            LiquidityUsd => self.liquidity_usd = other.liquidity_usd,
            TopHoldersConcentration => {
                self.top_holders_concentration = other.top_holders_concentration
            }
            TotalHolders => self.total_holders = other.total_holders,
            HolderDistributionScore => {
                self.holder_distribution_score = other.holder_distribution_score
            }
            WhaleHolderCount => self.whale_holder_count = other.whale_holder_count,
            TwitterFollowers => self.twitter_followers = other.twitter_followers,
            TelegramMembers => self.telegram_members = other.telegram_members,
            SocialSentiment => self.social_sentiment = other.social_sentiment,
            SocialVolumeScore => self.social_volume_score = other.social_volume_score,
            GithubStars => self.github_stars = other.github_stars,
            GithubForks => self.github_forks = other.github_forks,
            CommitActivity => self.commit_activity = other.commit_activity,
            HasWhitepaper => self.has_whitepaper = other.has_whitepaper,
            TeamDoxxed => self.team_doxxed = other.team_doxxed,
        }
    }
}

// ============================================
// PROVIDER PAYLOADS
// ============================================

/// Token snapshot supplied by the caller, enriched from the canonical DEX pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenData {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trading_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    #[serde(rename = "liquidityUSD", alias = "liquidityUsd")]
    pub liquidity_usd: Option<f64>,
    pub market_cap_rank: Option<f64>,
    #[serde(deserialize_with = "timestamp_or_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp_or_none")]
    pub liquidity_lock_end_time: Option<DateTime<Utc>>,
    pub is_liquidity_locked: bool,
    /// Measured owner share; estimated when absent
    pub owner_token_percentage: Option<f64>,
    pub holder_concentration: Option<f64>,
    pub total_holders: Option<f64>,
    pub whale_holders: Option<f64>,
    pub community_data: Option<CommunityData>,
    pub developer_data: Option<DeveloperData>,
    pub has_whitepaper: bool,
    pub team_doxxed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityData {
    pub twitter_followers: Option<f64>,
    pub telegram_users: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeveloperData {
    pub stars: Option<f64>,
    pub forks: Option<f64>,
    pub commit_count: Option<f64>,
}

/// Block-explorer contract info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractInfo {
    pub is_verified: bool,
    pub has_ownership_renounced: bool,
    pub source_code: Option<String>,
    pub is_proxy: Option<bool>,
}

/// Honeypot simulator verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoneypotRiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoneypotResult {
    pub is_honeypot: bool,
    #[serde(deserialize_with = "number_or_zero")]
    pub sell_tax: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub buy_tax: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub transfer_tax: f64,
    pub blocked_sells: bool,
    pub custom_gas: bool,
    pub warnings: Vec<String>,
    pub honeypot_risk_level: HoneypotRiskLevel,
    pub simulation_success: bool,
}

/// Honeypot adapter envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotReport {
    pub honeypot_result: HoneypotResult,
}

/// Social-stats adapter payload (snake_case on the wire)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialStats {
    pub twitter_followers: Option<f64>,
    pub telegram_channel_user_count: Option<f64>,
    pub bullish_sentiment: Option<f64>,
    pub social_volume: Option<f64>,
    pub social_contributors: Option<f64>,
}

/// Rolling-window figure (`{ h24 }`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowValue {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairLiquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxnCounts {
    pub buys: u64,
    pub sells: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairTxns {
    pub h24: TxnCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// DEX aggregator trading pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexPair {
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub base_token: Option<PairToken>,
    /// Decimal string as emitted by the aggregator
    pub price_usd: Option<String>,
    pub volume: WindowValue,
    pub liquidity: PairLiquidity,
    pub price_change: WindowValue,
    pub market_cap: Option<f64>,
    pub fdv: Option<f64>,
    pub txns: PairTxns,
}

impl DexPair {
    /// 24h volume, 0 when unknown
    pub fn volume_h24(&self) -> f64 {
        self.volume.h24.unwrap_or(0.0)
    }

    /// Pool liquidity in USD, 0 when unknown
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.usd.unwrap_or(0.0)
    }

    /// Parsed USD price
    pub fn price(&self) -> Option<f64> {
        self.price_usd
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }
}

/// Raw AI assessment after JSON extraction.
///
/// Non-numeric scores are already coerced to 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiAssessment {
    pub rug_pull: f64,
    pub liquidity: f64,
    pub contract: f64,
    pub community: f64,
    /// Reported confidence (percent); None when absent or non-numeric
    pub confidence: Option<f64>,
    pub reasoning: String,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub labels: MetricLabels,
}

// ============================================
// SCORES
// ============================================

/// Bounded set of risk metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreSet {
    pub overall_risk: u8,
    pub rug_pull: u8,
    pub liquidity: u8,
    pub contract: u8,
    pub community: u8,
    pub contract_security: u8,
    pub liquidity_safety: u8,
    pub community_health: u8,
    pub market_stability: u8,
    /// 0.0 - 1.0
    pub confidence: f64,
}

impl RiskScoreSet {
    /// All eight primary/safety scores plus overall
    pub fn all_scores(&self) -> [u8; 9] {
        [
            self.overall_risk,
            self.rug_pull,
            self.liquidity,
            self.contract,
            self.community,
            self.contract_security,
            self.liquidity_safety,
            self.community_health,
            self.market_stability,
        ]
    }

    pub fn primary_risks(&self) -> [u8; 4] {
        [self.rug_pull, self.liquidity, self.contract, self.community]
    }
}

/// Risk label band derived from overall risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::Moderate => "MODERATE",
            RiskBand::High => "HIGH",
            RiskBand::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskBand::Low => "✅",
            RiskBand::Moderate => "🟡",
            RiskBand::High => "🔴",
            RiskBand::Critical => "💀",
        }
    }
}

/// Qualitative confidence shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::VeryHigh => "Very High",
        }
    }
}

/// Which path produced the scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Ai,
    Heuristic,
    Fallback,
}

/// Per-metric qualitative labels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricLabels {
    pub rug_pull: Option<String>,
    pub liquidity: Option<String>,
    pub contract: Option<String>,
    pub community: Option<String>,
    pub contract_security: Option<String>,
    pub liquidity_safety: Option<String>,
    pub community_health: Option<String>,
    pub market_stability: Option<String>,
}

/// Presentation-facing feature summary (0-100 each)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub contract_security: u8,
    pub liquidity_safety: u8,
    pub community_health: u8,
    pub market_stability: u8,
    pub ownership_risk: u8,
    pub honeypot_risk: u8,
}

/// AI narrative carried alongside AI-path scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub reasoning: String,
    /// Clamped percent (70-95)
    pub confidence: f64,
    pub ai_recommendations: Vec<String>,
    pub ai_risk_factors: Vec<String>,
    pub labels: MetricLabels,
}

/// Final analysis for one token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub token_address: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub scores: RiskScoreSet,
    pub risk_band: RiskBand,
    pub features: FeatureSummary,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub confidence_level: ConfidenceLevel,
    pub source: ScoreSource,
    pub ai_analysis: Option<AiAnalysis>,
    /// Mean tree prediction (diagnostics only)
    pub raw_ensemble_risk: Option<f64>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.source == ScoreSource::Fallback
    }
}
