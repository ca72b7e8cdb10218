//! Constants Module - Single Source of Truth
//!
//! Semua konstanta kalibrasi dan threshold yang dipakai scoring engine
//! HARUS didefinisikan di sini. Tidak ada hardcoded values di modul lain!
//!
//! The scoring weights below are calibration constants pinned by tests.
//! They have no derivation beyond observed behaviour and must not be
//! re-tuned without new labelled data.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "Rugscope";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// RUNTIME DEFAULTS
// ============================================

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default per-adapter timeout (milliseconds)
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

/// Default cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default maximum tokens per batch request
pub const DEFAULT_MAX_BATCH: usize = 100;

/// Default seed for synthetic training data
pub const DEFAULT_MODEL_SEED: u64 = 0x5eed_cafe;

// ============================================
// TREE ENSEMBLE
// ============================================

/// Number of bootstrap trees
pub const DEFAULT_TREE_COUNT: usize = 15;

/// Synthetic training population size
pub const DEFAULT_TRAINING_SAMPLES: usize = 1000;

/// Depth beyond which a node becomes a leaf
pub const TREE_MAX_DEPTH: usize = 8;

/// Nodes with fewer samples become leaves
pub const TREE_MIN_SAMPLES: usize = 3;

/// Prediction of an untrained tree
pub const UNTRAINED_TREE_PREDICTION: f64 = 50.0;

/// Population shares for synthetic training data
pub const SCAM_SHARE: f64 = 0.4;
pub const LEGIT_SHARE: f64 = 0.4;

/// Confidence = 1 - variance / divisor, floored and capped
pub const CONFIDENCE_VARIANCE_DIVISOR: f64 = 1000.0;
pub const MIN_HEURISTIC_CONFIDENCE: f64 = 0.4;

// ============================================
// HEURISTIC OVERALL WEIGHTS
// ============================================

pub const WEIGHT_RUG_PULL: f64 = 0.4;
pub const WEIGHT_LIQUIDITY: f64 = 0.35;
pub const WEIGHT_CONTRACT: f64 = 0.2;
pub const WEIGHT_COMMUNITY: f64 = 0.05;

/// Overall floor when >= 3 scam indicators fire
pub const SCAM_FLOOR_STRONG: u8 = 85;
/// Overall floor when >= 2 scam indicators fire
pub const SCAM_FLOOR: u8 = 80;
/// Overall ceiling when >= 5 legit indicators fire
pub const LEGIT_CEILING_STRONG: u8 = 25;
/// Overall ceiling when >= 3 legit indicators fire
pub const LEGIT_CEILING: u8 = 35;

// ============================================
// AI NORMALIZER
// ============================================

/// Any raw score above this skips every transformation
pub const AI_BYPASS_THRESHOLD: f64 = 90.0;

pub const AI_RUG_PULL_FACTOR: f64 = 0.10;
pub const AI_COMMUNITY_FACTOR: f64 = 0.40;
pub const AI_CONTRACT_FACTOR: f64 = 0.40;
pub const AI_CONTRACT_SCALE_ABOVE: f64 = 30.0;
pub const AI_CONTRACT_OFFSET: f64 = 10.0;
pub const AI_LIQUIDITY_FACTOR: f64 = 0.40;
pub const AI_LIQUIDITY_SCALE_ABOVE: f64 = 20.0;
pub const AI_LOW_LIQUIDITY_DISCOUNT: f64 = 5.0;

/// All four transformed risks above this force market stability down
pub const ULTRA_HIGH_RISK_THRESHOLD: f64 = 80.0;
pub const ULTRA_HIGH_RISK_MARKET_STABILITY: f64 = 5.0;

/// AI confidence is clamped to this range (percent)
pub const AI_CONFIDENCE_MIN: f64 = 70.0;
pub const AI_CONFIDENCE_MAX: f64 = 95.0;

/// Reasoning prefix when the bypass or ultra override fires
pub const HIGH_RISK_REASONING_PREFIX: &str = "HIGH RISK TOKEN DETECTED: ";

// ============================================
// SCORE BOUNDS
// ============================================

/// No reported score is ever exactly 0 or 100
pub const SCORE_FLOOR: u8 = 1;
pub const SCORE_CEILING: u8 = 98;

/// Label bands used by the consistency pass
pub const CRITICAL_BAND: u8 = 70;
pub const HIGH_BAND: u8 = 50;
pub const MODERATE_BAND: u8 = 30;

/// Critical band: risk floor, then safety ceilings
/// (contract security, liquidity safety, community health, market stability)
pub const CRITICAL_RISK_FLOOR: u8 = 90;
pub const CRITICAL_SAFETY_CEILINGS: [u8; 4] = [10, 5, 10, 10];

/// High band: risk floor, then safety ceilings
pub const HIGH_RISK_FLOOR: u8 = 80;
pub const HIGH_SAFETY_CEILINGS: [u8; 4] = [20, 15, 20, 20];

// ============================================
// MARKET DATA
// ============================================

/// Known stablecoin symbols (compared case-insensitively)
pub const STABLECOIN_SYMBOLS: [&str; 9] = [
    "USDT", "USDC", "DAI", "BUSD", "TUSD", "USDD", "FRAX", "LUSD", "sUSD",
];

/// Safety boost when DEX data exists and all safety scores are strong
pub const MARKET_STABILITY_BOOST: f64 = 30.0;
pub const MARKET_BOOST_SAFETY_THRESHOLD: u8 = 80;

/// DEX liquidity rule thresholds (USD)
pub const DEX_THIN_MARKET_USD: f64 = 10_000.0;
pub const DEX_MID_LIQUIDITY_USD: f64 = 100_000.0;

// ============================================
// FEATURE DEFAULTS
// ============================================

pub const DEFAULT_MARKET_CAP_RANK: f64 = 9999.0;
pub const DEFAULT_HOLDER_CONCENTRATION: f64 = 50.0;
pub const DEFAULT_TOTAL_HOLDERS: f64 = 100.0;
pub const DEFAULT_SOCIAL_SENTIMENT: f64 = 50.0;

/// Seconds per day for timestamp-derived features
pub const SECS_PER_DAY: f64 = 86_400.0;

// ============================================
// CATASTROPHIC FALLBACK
// ============================================

/// Result returned when the whole pipeline fails
pub const FALLBACK_OVERALL: u8 = 75;
pub const FALLBACK_RUG_PULL: u8 = 70;
pub const FALLBACK_LIQUIDITY: u8 = 65;
pub const FALLBACK_CONTRACT: u8 = 60;
pub const FALLBACK_COMMUNITY: u8 = 80;
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Check whether a symbol/name pair identifies a stablecoin
pub fn is_stablecoin(symbol: &str, name: &str) -> bool {
    STABLECOIN_SYMBOLS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(symbol.trim()))
        || name.to_lowercase().contains("usd")
}
