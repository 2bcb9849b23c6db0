//! Alert generation stage
//!
//! Pure rules, no generation call. Every rule is evaluated independently and
//! all applicable alerts are kept, in rule order, capped at four.

use rust_decimal::Decimal;

use crate::aggregate::AggregateSummary;
use crate::models::{InsightCandidate, Severity};
use crate::money::format_money;

use super::digest::humanize_category;

/// Maximum alerts surfaced per run
const ALERT_LIMIT: usize = 4;

/// Category share of total expenses that triggers a high-spending alert
const HIGH_SPEND_SHARE_PERCENT: u32 = 40;

/// Categories never flagged for high share: income is not spend, housing is
/// expected to dominate
const HIGH_SPEND_EXEMPT: [&str; 2] = ["income", "housing"];

/// Merchant transaction count that marks a recurring charge
const RECURRING_MIN_COUNT: u32 = 3;

/// Number of recurring merchants tolerated before the creep alert fires
const RECURRING_MERCHANT_LIMIT: usize = 5;

/// Generate alerts from the aggregate summary
///
/// Deterministic: identical summaries produce identical alerts.
pub fn generate(summary: &AggregateSummary) -> Vec<InsightCandidate> {
    if summary.is_empty() {
        return Vec::new();
    }

    let mut alerts = Vec::new();

    // Rule 1: spending more than comes in
    if summary.net_flow < Decimal::ZERO {
        alerts.push(InsightCandidate::alert(
            "Negative Cash Flow",
            format!(
                "Your expenses exceed income by {} this period",
                format_money(summary.net_flow.abs(), &summary.currency)
            ),
            "AlertTriangle",
            Severity::Warning,
        ));
    }

    // Rule 2: one category eating a disproportionate share of spend
    if summary.total_expenses > Decimal::ZERO {
        let threshold = Decimal::from(HIGH_SPEND_SHARE_PERCENT);
        for stats in &summary.category_breakdown {
            if HIGH_SPEND_EXEMPT.contains(&stats.category.as_str()) {
                continue;
            }
            let share = stats.total * Decimal::ONE_HUNDRED / summary.total_expenses;
            if share > threshold {
                let label = humanize_category(&stats.category);
                alerts.push(InsightCandidate::alert(
                    format!("High {} Spending", label),
                    format!(
                        "{} accounts for {}% of your expenses",
                        label,
                        share.round()
                    ),
                    "AlertTriangle",
                    Severity::Warning,
                ));
            }
        }
    }

    // Rule 3: many merchants charging repeatedly, likely subscription creep
    let recurring = summary
        .top_merchants
        .iter()
        .filter(|m| m.count >= RECURRING_MIN_COUNT)
        .count();
    if recurring > RECURRING_MERCHANT_LIMIT {
        alerts.push(InsightCandidate::alert(
            "Multiple Recurring Charges",
            format!(
                "You have {} merchants with 3+ transactions. Review for unwanted subscriptions.",
                recurring
            ),
            "Repeat",
            Severity::Info,
        ));
    }

    alerts.truncate(ALERT_LIMIT);
    alerts
}
