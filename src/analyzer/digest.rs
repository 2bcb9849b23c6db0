//! Compact natural-language digests of the aggregate summary
//!
//! These render the summary into the user content sent to the generation
//! backend. Kept terse on purpose: the digest bounds the size of every
//! external call.

use crate::aggregate::AggregateSummary;
use crate::models::InsightCandidate;
use crate::money::format_money;

/// Categories shown in a digest
const CATEGORY_LINE_LIMIT: usize = 8;

/// Merchants shown in a digest
const MERCHANT_LINE_LIMIT: usize = 5;

const DAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Digest for the pattern-detection prompt
pub fn summary_digest(summary: &AggregateSummary) -> String {
    format!(
        "Transaction Analysis Summary:\n\
         - Total Income: {income}\n\
         - Total Expenses: {expenses}\n\
         - Net Cash Flow: {net}\n\
         - Total Transactions: {count}\n\
         \n\
         Spending by Category:\n{categories}\n\
         \n\
         Top Merchants:\n{merchants}\n\
         \n\
         Spending by Day of Week:\n{weekdays}\n",
        income = format_money(summary.total_income, &summary.currency),
        expenses = format_money(summary.total_expenses, &summary.currency),
        net = format_money(summary.net_flow, &summary.currency),
        count = summary.transaction_count,
        categories = format_category_breakdown(summary),
        merchants = format_top_merchants(summary),
        weekdays = format_weekday_spending(summary),
    )
}

/// Digest for the recommendation prompt
///
/// Carries only the titles of already-detected patterns and alerts, not
/// their full bodies.
pub fn recommendation_digest(
    summary: &AggregateSummary,
    patterns: &[InsightCandidate],
    alerts: &[InsightCandidate],
) -> String {
    let pattern_titles: Vec<&str> = patterns.iter().map(|p| p.title.as_str()).collect();
    let alert_titles: Vec<&str> = alerts.iter().map(|a| a.title.as_str()).collect();

    format!(
        "Financial Summary:\n\
         - Net Cash Flow: {net}\n\
         - Total Expenses: {expenses}\n\
         \n\
         Top Spending Categories:\n{categories}\n\
         \n\
         Detected Patterns: {patterns:?}\n\
         Active Alerts: {alerts:?}\n",
        net = format_money(summary.net_flow, &summary.currency),
        expenses = format_money(summary.total_expenses, &summary.currency),
        categories = format_category_breakdown(summary),
        patterns = pattern_titles,
        alerts = alert_titles,
    )
}

/// Render a category label for humans: `food_and_dining_out` → `Food And Dining Out`
pub fn humanize_category(category: &str) -> String {
    category
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_category_breakdown(summary: &AggregateSummary) -> String {
    if summary.category_breakdown.is_empty() {
        return "No category data available".to_string();
    }

    let mut ranked: Vec<_> = summary.category_breakdown.iter().collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));

    ranked
        .iter()
        .take(CATEGORY_LINE_LIMIT)
        .map(|c| {
            format!(
                "- {}: {} ({} transactions)",
                humanize_category(&c.category),
                format_money(c.total, &summary.currency),
                c.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_top_merchants(summary: &AggregateSummary) -> String {
    if summary.top_merchants.is_empty() {
        return "No merchant data available".to_string();
    }

    summary
        .top_merchants
        .iter()
        .take(MERCHANT_LINE_LIMIT)
        .map(|m| {
            format!(
                "- {}: {} ({} transactions)",
                m.merchant,
                format_money(m.total, &summary.currency),
                m.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_weekday_spending(summary: &AggregateSummary) -> String {
    if summary.weekday_spending.is_empty() {
        return "No weekday data available".to_string();
    }

    DAY_ORDER
        .iter()
        .filter_map(|day| summary.weekday(day))
        .map(|w| {
            format!(
                "- {}: {} total ({}/transaction)",
                w.weekday,
                format_money(w.total, &summary.currency),
                format_money(w.average, &summary.currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::{Transaction, TransactionDirection};

    fn tx(amount: &str, category: &str, merchant: &str, date: &str) -> Transaction {
        Transaction {
            id: "t".to_string(),
            user_id: 1,
            file_id: None,
            date: Some(date.to_string()),
            description: "test".to_string(),
            merchant: Some(merchant.to_string()),
            amount: amount.to_string(),
            direction: TransactionDirection::Debit,
            category: Some(category.to_string()),
            currency: Some("MYR".to_string()),
        }
    }

    #[test]
    fn test_humanize_category() {
        assert_eq!(humanize_category("food_and_dining_out"), "Food And Dining Out");
        assert_eq!(humanize_category("groceries"), "Groceries");
    }

    #[test]
    fn test_summary_digest_contains_sections() {
        let summary = aggregate(&[
            tx("120.50", "groceries", "StoreA", "2024-01-06"),
            tx("42", "entertainment", "Cinema", "2024-01-07"),
        ]);
        let digest = summary_digest(&summary);

        assert!(digest.contains("Total Expenses: MYR 162.50"));
        assert!(digest.contains("- Groceries: MYR 120.50 (1 transactions)"));
        assert!(digest.contains("- StoreA: MYR 120.50 (1 transactions)"));
        assert!(digest.contains("- Saturday: MYR 120.50 total"));
    }

    #[test]
    fn test_empty_sections_have_placeholders() {
        let summary = aggregate(&[]);
        let digest = summary_digest(&summary);
        assert!(digest.contains("No category data available"));
        assert!(digest.contains("No merchant data available"));
        assert!(digest.contains("No weekday data available"));
    }

    #[test]
    fn test_recommendation_digest_titles_only() {
        let summary = aggregate(&[tx("10", "groceries", "StoreA", "2024-01-06")]);
        let patterns = vec![crate::models::InsightCandidate::new(
            "Weekend Spender",
            "A long body that must not appear",
            "Calendar",
        )];
        let digest = recommendation_digest(&summary, &patterns, &[]);

        assert!(digest.contains("Weekend Spender"));
        assert!(!digest.contains("A long body that must not appear"));
    }
}
