//! Bootstrap Tree Ensemble
//!
//! Trained once at startup on synthetic, labelled token profiles:
//! - 40% scam profiles (risk 80-100)
//! - 40% legitimate profiles (risk 5-35)
//! - 20% borderline profiles (risk 35-80), a per-feature 50/50 blend
//!
//! Each tree is grown on a bootstrap resample, splitting on a random
//! critical feature at the sample mean. The ensemble's spread drives the
//! heuristic confidence; its mean is kept for diagnostics only. The four
//! risk sub-scores come from the rule tables in `heuristic`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::models::{FeatureKey, TokenFeatures};
use crate::utils::constants::{
    CONFIDENCE_VARIANCE_DIVISOR, LEGIT_SHARE, MIN_HEURISTIC_CONFIDENCE, SCAM_SHARE,
    TREE_MAX_DEPTH, TREE_MIN_SAMPLES, UNTRAINED_TREE_PREDICTION,
};

// ============================================
// TRAINING DATA
// ============================================

/// One labelled training profile
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub features: TokenFeatures,
    pub risk: f64,
}

#[inline]
fn count_below<R: Rng>(rng: &mut R, n: u32) -> f64 {
    rng.gen_range(0..n) as f64
}

/// Honeypots, punitive taxes, fresh unverified contracts
pub fn scam_profile<R: Rng>(rng: &mut R) -> TokenFeatures {
    TokenFeatures {
        is_honeypot: rng.gen_bool(0.6),
        honeypot_probability: rng.gen_range(60.0..100.0),
        sell_tax: rng.gen_range(15.0..85.0),
        buy_tax: rng.gen_range(5.0..35.0),
        owner_token_percentage: rng.gen_range(40.0..90.0),
        liquidity_lock_days: rng.gen_range(0.0..7.0),

        is_verified: rng.gen_bool(0.2),
        ownership_renounced: rng.gen_bool(0.1),
        contract_age_days: rng.gen_range(0.0..14.0),
        contract_complexity: rng.gen_range(5.0..35.0),
        is_proxy: rng.gen_bool(0.3),

        price_volatility: rng.gen_range(20.0..100.0),
        volume_anomaly_score: rng.gen_range(60.0..100.0),
        market_cap_rank: count_below(rng, 2000) + 1000.0,
        volume_to_market_cap: rng.gen_range(0.0..0.1),
        price_change_24h: (rng.gen::<f64>() - 0.3) * 200.0,
        liquidity_usd: rng.gen_range(0.0..10_000.0),

        top_holders_concentration: rng.gen_range(70.0..100.0),
        total_holders: count_below(rng, 500) + 10.0,
        holder_distribution_score: rng.gen_range(0.0..30.0),
        whale_holder_count: count_below(rng, 8) + 2.0,

        twitter_followers: count_below(rng, 1000),
        telegram_members: count_below(rng, 500),
        social_sentiment: rng.gen_range(10.0..50.0),
        social_volume_score: rng.gen_range(0.0..30.0),

        github_stars: count_below(rng, 10),
        github_forks: count_below(rng, 5),
        commit_activity: count_below(rng, 20),
        has_whitepaper: false,
        team_doxxed: false,
    }
}

/// Verified, aged, well-distributed tokens with real communities
pub fn legit_profile<R: Rng>(rng: &mut R) -> TokenFeatures {
    TokenFeatures {
        is_honeypot: false,
        honeypot_probability: rng.gen_range(0.0..15.0),
        sell_tax: rng.gen_range(0.0..8.0),
        buy_tax: rng.gen_range(0.0..5.0),
        owner_token_percentage: rng.gen_range(0.0..15.0),
        liquidity_lock_days: rng.gen_range(365.0..1365.0),

        is_verified: true,
        ownership_renounced: rng.gen_bool(0.7),
        contract_age_days: rng.gen_range(365.0..1865.0),
        contract_complexity: rng.gen_range(30.0..110.0),
        is_proxy: rng.gen_bool(0.2),

        price_volatility: rng.gen_range(5.0..35.0),
        volume_anomaly_score: rng.gen_range(0.0..30.0),
        market_cap_rank: count_below(rng, 500) + 1.0,
        volume_to_market_cap: rng.gen_range(0.05..0.85),
        price_change_24h: (rng.gen::<f64>() - 0.5) * 40.0,
        liquidity_usd: rng.gen_range(100_000.0..5_100_000.0),

        top_holders_concentration: rng.gen_range(20.0..60.0),
        total_holders: count_below(rng, 50_000) + 5000.0,
        holder_distribution_score: rng.gen_range(70.0..100.0),
        whale_holder_count: count_below(rng, 3),

        twitter_followers: count_below(rng, 200_000) + 10_000.0,
        telegram_members: count_below(rng, 100_000) + 5000.0,
        social_sentiment: rng.gen_range(60.0..90.0),
        social_volume_score: rng.gen_range(50.0..90.0),

        github_stars: count_below(rng, 2000) + 100.0,
        github_forks: count_below(rng, 500) + 50.0,
        commit_activity: count_below(rng, 1000) + 100.0,
        has_whitepaper: rng.gen_bool(0.8),
        team_doxxed: rng.gen_bool(0.6),
    }
}

/// Per-feature coin flip between a scam and a legit profile
pub fn borderline_profile<R: Rng>(rng: &mut R) -> TokenFeatures {
    let scam = scam_profile(rng);
    let legit = legit_profile(rng);
    let mut blended = legit.clone();
    for key in FeatureKey::ALL {
        if rng.gen_bool(0.5) {
            blended.take_from(&scam, key);
        }
    }
    blended
}

/// Labelled synthetic population in fixed proportions
pub fn generate_training_data<R: Rng>(rng: &mut R, total: usize) -> Vec<TrainingSample> {
    let scam_count = (total as f64 * SCAM_SHARE).floor() as usize;
    let legit_count = (total as f64 * LEGIT_SHARE).floor() as usize;
    let borderline_count = total.saturating_sub(scam_count + legit_count);

    let mut samples = Vec::with_capacity(total);
    for _ in 0..scam_count {
        samples.push(TrainingSample {
            features: scam_profile(rng),
            risk: rng.gen_range(80.0..100.0),
        });
    }
    for _ in 0..legit_count {
        samples.push(TrainingSample {
            features: legit_profile(rng),
            risk: rng.gen_range(5.0..35.0),
        });
    }
    for _ in 0..borderline_count {
        samples.push(TrainingSample {
            features: borderline_profile(rng),
            risk: rng.gen_range(35.0..80.0),
        });
    }

    debug!(
        "🧪 Training data: {} scam, {} legit, {} borderline",
        scam_count, legit_count, borderline_count
    );
    samples
}

// ============================================
// DECISION TREE
// ============================================

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        key: FeatureKey,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Single regression tree over critical features
#[derive(Debug, Clone, Default)]
pub struct DecisionTree {
    root: Option<Node>,
}

fn mean_risk(data: &[&TrainingSample]) -> f64 {
    if data.is_empty() {
        return UNTRAINED_TREE_PREDICTION;
    }
    data.iter().map(|s| s.risk).sum::<f64>() / data.len() as f64
}

impl DecisionTree {
    /// Grow a tree on the given samples
    pub fn train<R: Rng>(data: &[&TrainingSample], rng: &mut R) -> Self {
        Self {
            root: Some(Self::build(data, 0, rng)),
        }
    }

    fn build<R: Rng>(data: &[&TrainingSample], depth: usize, rng: &mut R) -> Node {
        if data.len() < TREE_MIN_SAMPLES || depth > TREE_MAX_DEPTH {
            return Node::Leaf(mean_risk(data));
        }

        let key = FeatureKey::CRITICAL[rng.gen_range(0..FeatureKey::CRITICAL.len())];
        let threshold =
            data.iter().map(|s| s.features.get(key)).sum::<f64>() / data.len() as f64;

        let (left, right): (Vec<&TrainingSample>, Vec<&TrainingSample>) = data
            .iter()
            .copied()
            .partition(|s| s.features.get(key) <= threshold);

        if left.is_empty() || right.is_empty() {
            return Node::Leaf(mean_risk(data));
        }

        Node::Split {
            key,
            threshold,
            left: Box::new(Self::build(&left, depth + 1, rng)),
            right: Box::new(Self::build(&right, depth + 1, rng)),
        }
    }

    /// Predicted risk for one feature vector
    pub fn predict(&self, features: &TokenFeatures) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return UNTRAINED_TREE_PREDICTION,
        };
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    key,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.get(*key) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Maximum root-to-leaf depth
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map(walk).unwrap_or(0)
    }
}

// ============================================
// ENSEMBLE
// ============================================

/// Aggregate ensemble output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsemblePrediction {
    pub mean: f64,
    pub variance: f64,
    pub confidence: f64,
}

/// Bootstrap ensemble of decision trees
#[derive(Debug, Clone, Default)]
pub struct TreeEnsemble {
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Train `tree_count` trees on bootstrap resamples
    pub fn train<R: Rng>(samples: &[TrainingSample], tree_count: usize, rng: &mut R) -> Self {
        let mut trees = Vec::with_capacity(tree_count);
        if !samples.is_empty() {
            for _ in 0..tree_count {
                let bootstrap: Vec<&TrainingSample> = (0..samples.len())
                    .map(|_| &samples[rng.gen_range(0..samples.len())])
                    .collect();
                trees.push(DecisionTree::train(&bootstrap, rng));
            }
        }
        Self { trees }
    }

    /// Generate synthetic data from a seed and train on it
    pub fn train_synthetic(seed: u64, sample_count: usize, tree_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = generate_training_data(&mut rng, sample_count);
        let ensemble = Self::train(&samples, tree_count, &mut rng);
        info!(
            "🌲 Tree ensemble trained: {} trees on {} samples (max depth {})",
            ensemble.len(),
            samples.len(),
            ensemble.trees.iter().map(|t| t.depth()).max().unwrap_or(0)
        );
        ensemble
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Mean prediction, spread, and variance-based confidence
    pub fn predict(&self, features: &TokenFeatures) -> EnsemblePrediction {
        if self.trees.is_empty() {
            return EnsemblePrediction {
                mean: UNTRAINED_TREE_PREDICTION,
                variance: 0.0,
                confidence: MIN_HEURISTIC_CONFIDENCE,
            };
        }

        let predictions: Vec<f64> = self.trees.iter().map(|t| t.predict(features)).collect();
        let n = predictions.len() as f64;
        let mean = predictions.iter().sum::<f64>() / n;
        let variance = predictions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let confidence =
            (1.0 - variance / CONFIDENCE_VARIANCE_DIVISOR).clamp(MIN_HEURISTIC_CONFIDENCE, 1.0);

        EnsemblePrediction {
            mean,
            variance,
            confidence,
        }
    }
}
