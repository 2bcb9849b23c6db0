//! Pattern detection stage
//!
//! Primary path sends the summary digest to the generation backend and asks
//! for 2-4 spending patterns as JSON. Any backend or parse failure drops to
//! rule-based fallback patterns; this stage never errors.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::aggregate::AggregateSummary;
use crate::ai::parsing::parse_patterns;
use crate::ai::{GenClient, TextGenerator};
use crate::models::InsightCandidate;

use super::digest::summary_digest;
use super::StageOutput;

const SYSTEM_PROMPT: &str = r#"You are a financial analyst AI. Analyze the transaction data and identify 2-4 notable spending patterns.

For each pattern, provide:
1. A short, catchy title (e.g., "Weekend Dining Habit", "Morning Coffee Routine")
2. A brief description (1-2 sentences) explaining the pattern
3. An appropriate icon name from: Coffee, Utensils, ShoppingCart, Car, Home, Gamepad, Heart, GraduationCap, Zap, CreditCard, TrendingUp, ArrowRightLeft, Repeat

Respond in JSON format:
{
  "patterns": [
    {"title": "...", "description": "...", "icon": "..."}
  ]
}

Focus on actionable, interesting patterns the user might not be aware of."#;

/// Minimum dining-out transaction count before the habit pattern fires
const DINING_HABIT_MIN_COUNT: u32 = 3;

/// Detect spending patterns from the aggregate summary
///
/// An empty summary yields no patterns. With no backend configured the
/// deterministic rules run directly.
pub async fn detect(gen: Option<&GenClient>, summary: &AggregateSummary) -> StageOutput {
    if summary.is_empty() {
        return StageOutput::generated(Vec::new());
    }

    if let Some(client) = gen {
        match client.generate(SYSTEM_PROMPT, &summary_digest(summary)).await {
            Ok(response) => match parse_patterns(&response) {
                Ok(patterns) => {
                    debug!(count = patterns.len(), "Pattern detection complete");
                    return StageOutput::generated(patterns);
                }
                Err(e) => {
                    warn!(error = %e, "Pattern response unparsable, using fallback rules");
                }
            },
            Err(e) => {
                warn!(error = %e, "Pattern generation failed, using fallback rules");
            }
        }
    }

    StageOutput::fallback(fallback_patterns(summary))
}

/// Rule-based patterns used when generation is unavailable
///
/// May legitimately produce nothing; at most two patterns by construction.
fn fallback_patterns(summary: &AggregateSummary) -> Vec<InsightCandidate> {
    let mut patterns = Vec::new();

    if let Some(dining) = summary.category("food_and_dining_out") {
        if dining.count > DINING_HABIT_MIN_COUNT {
            patterns.push(InsightCandidate::new(
                "Dining Out Habit",
                format!(
                    "You've spent {} on dining out across {} transactions",
                    crate::money::format_money(dining.total, &summary.currency),
                    dining.count
                ),
                "Utensils",
            ));
        }
    }

    // Weekend spend above half the workweek spend is notable
    if summary.weekend_spend() * Decimal::TWO > summary.workweek_spend() {
        patterns.push(InsightCandidate::new(
            "Weekend Spender",
            "Your weekend spending is significant compared to weekdays",
            "Calendar",
        ));
    }

    patterns
}
