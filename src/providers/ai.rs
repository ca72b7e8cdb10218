//! AI Response Parsing
//!
//! The AI provider answers in free text that should contain one JSON object:
//!
//! ```text
//! { rugPullRisk, liquidityRisk, contractRisk, communityRisk, overallRisk,
//!   confidence, reasoning, recommendations: [..], riskFactors: [..],
//!   rugPullRiskLabel, ..., marketStabilityLabel }
//! ```
//!
//! The object may be wrapped in prose or code fences. The first balanced
//! `{...}` block is extracted; anything unparseable is a provider failure.

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{AiAssessment, AppError, AppResult, MetricLabels};
use crate::providers::traits::{AiContext, AiSource};

const RISK_KEYS: [&str; 4] = ["rugPullRisk", "liquidityRisk", "contractRisk", "communityRisk"];

/// Drop markdown code-fence markers
fn strip_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First balanced `{...}` block, string-literal aware
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Numeric field, 0 when missing or not a number
fn number(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn label(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Parse raw AI text into an assessment
pub fn parse_assessment(text: &str) -> AppResult<AiAssessment> {
    let cleaned = strip_fences(text);
    let block = extract_json_object(&cleaned)
        .ok_or_else(|| AppError::ai_malformed("no JSON object in AI response"))?;
    let value: Value = serde_json::from_str(block)?;
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::ai_malformed("AI response JSON is not an object"))?;

    if !RISK_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Err(AppError::ai_malformed("AI response has no risk scores"));
    }

    let assessment = AiAssessment {
        rug_pull: number(obj, "rugPullRisk"),
        liquidity: number(obj, "liquidityRisk"),
        contract: number(obj, "contractRisk"),
        community: number(obj, "communityRisk"),
        confidence: obj
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite()),
        reasoning: obj
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        recommendations: string_list(obj, "recommendations"),
        risk_factors: string_list(obj, "riskFactors"),
        labels: MetricLabels {
            rug_pull: label(obj, &["rugPullRiskLabel", "rugPullLabel"]),
            liquidity: label(obj, &["liquidityRiskLabel", "liquidityLabel"]),
            contract: label(obj, &["contractRiskLabel", "contractLabel"]),
            community: label(obj, &["communityRiskLabel", "communityLabel"]),
            contract_security: label(obj, &["contractSecurityLabel"]),
            liquidity_safety: label(obj, &["liquiditySafetyLabel"]),
            community_health: label(obj, &["communityHealthLabel"]),
            market_stability: label(obj, &["marketStabilityLabel"]),
        },
    };

    debug!(
        "🤖 AI assessment parsed: rug={} liq={} contract={} community={}",
        assessment.rug_pull, assessment.liquidity, assessment.contract, assessment.community
    );
    Ok(assessment)
}

/// AI adapter used when no provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAi;

impl AiSource for UnavailableAi {
    fn name(&self) -> &'static str {
        "ai:unavailable"
    }

    fn assess<'a>(&'a self, _context: &'a AiContext) -> BoxFuture<'a, AppResult<String>> {
        Box::pin(async { Err(AppError::ai_unavailable("no AI provider configured")) })
    }
}
