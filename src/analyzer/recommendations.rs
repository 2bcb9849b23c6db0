//! Recommendation stage
//!
//! Primary path sends net flow, top categories, and the titles of already
//! detected patterns and alerts to the generation backend, asking for 2-3
//! actionable recommendations as JSON. Failures drop to a single rule-based
//! recommendation; this stage never errors.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::aggregate::AggregateSummary;
use crate::ai::parsing::parse_recommendations;
use crate::ai::{GenClient, TextGenerator};
use crate::models::InsightCandidate;
use crate::money::format_money;

use super::digest::recommendation_digest;
use super::StageOutput;

const SYSTEM_PROMPT: &str = r#"You are a helpful financial advisor. Based on the user's spending data, provide 2-3 personalized, actionable recommendations to help them save money or improve their financial health.

For each recommendation:
1. A short title (e.g., "Set a Dining Budget", "Automate Savings")
2. A specific, actionable description (1-2 sentences)
3. An icon from: Lightbulb, PiggyBank, Target, TrendingDown, Calendar, Shield, Wallet

Respond in JSON format:
{
  "recommendations": [
    {"title": "...", "description": "...", "icon": "..."}
  ]
}

Be specific and reference actual spending patterns when possible."#;

/// Create recommendations from the summary and the earlier stage outputs
///
/// An empty summary yields no recommendations.
pub async fn generate(
    gen: Option<&GenClient>,
    summary: &AggregateSummary,
    patterns: &[InsightCandidate],
    alerts: &[InsightCandidate],
) -> StageOutput {
    if summary.is_empty() {
        return StageOutput::generated(Vec::new());
    }

    if let Some(client) = gen {
        let digest = recommendation_digest(summary, patterns, alerts);
        match client.generate(SYSTEM_PROMPT, &digest).await {
            Ok(response) => match parse_recommendations(&response) {
                Ok(recommendations) => {
                    debug!(count = recommendations.len(), "Recommendations complete");
                    return StageOutput::generated(recommendations);
                }
                Err(e) => {
                    warn!(error = %e, "Recommendation response unparsable, using fallback rule");
                }
            },
            Err(e) => {
                warn!(error = %e, "Recommendation generation failed, using fallback rule");
            }
        }
    }

    StageOutput::fallback(vec![fallback_recommendation(summary)])
}

/// The single rule-based recommendation used when generation is unavailable
fn fallback_recommendation(summary: &AggregateSummary) -> InsightCandidate {
    if summary.net_flow < Decimal::ZERO {
        InsightCandidate::new(
            "Track Your Spending",
            "Consider setting a monthly budget to bring expenses in line with income",
            "Target",
        )
    } else {
        InsightCandidate::new(
            "Build Emergency Fund",
            format!(
                "You have positive cash flow of {}. Consider saving a portion automatically",
                format_money(summary.net_flow, &summary.currency)
            ),
            "PiggyBank",
        )
    }
}
