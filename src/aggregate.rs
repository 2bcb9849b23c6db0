//! Aggregation engine
//!
//! Collapses a flat list of transactions into the structured summary the
//! insight generators work from: income/expense totals, category and merchant
//! breakdowns, and a weekday spending profile. Sums use exact decimal
//! arithmetic; a single malformed amount or date never aborts the batch.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::{normalize_category, Transaction, TransactionDirection};
use crate::money::{detect_dominant_currency, parse_amount_lenient};

/// Maximum number of merchants reported in the summary
const TOP_MERCHANT_LIMIT: usize = 10;

/// Spend accumulated for one category (expenses only)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: Decimal,
    pub count: u32,
}

/// Spend accumulated for one merchant (expenses only)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantSpend {
    pub merchant: String,
    pub total: Decimal,
    pub count: u32,
}

/// Spend accumulated for one weekday (expenses only)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayStats {
    pub weekday: String,
    pub total: Decimal,
    pub count: u32,
    /// total / count
    pub average: Decimal,
}

/// Structured summary of one batch of transactions
///
/// Immutable once produced; lives only within a single pipeline run.
/// Income transactions contribute to `total_income` only, never to the
/// category/merchant/weekday breakdowns.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// total_income - total_expenses
    pub net_flow: Decimal,
    /// First-seen order, matching the order expenses appear in the input
    pub category_breakdown: Vec<CategoryStats>,
    /// Descending by total, ties in first-seen order, at most 10 entries
    pub top_merchants: Vec<MerchantSpend>,
    /// Monday through Sunday, only days with at least one dated expense
    pub weekday_spending: Vec<WeekdayStats>,
    pub transaction_count: usize,
    /// Dominant currency inferred from the input records
    pub currency: String,
}

impl AggregateSummary {
    /// Summary of zero transactions
    pub fn empty() -> Self {
        Self {
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            net_flow: Decimal::ZERO,
            category_breakdown: Vec::new(),
            top_merchants: Vec::new(),
            weekday_spending: Vec::new(),
            transaction_count: 0,
            currency: crate::money::DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    pub fn category(&self, name: &str) -> Option<&CategoryStats> {
        self.category_breakdown.iter().find(|c| c.category == name)
    }

    pub fn weekday(&self, name: &str) -> Option<&WeekdayStats> {
        self.weekday_spending.iter().find(|w| w.weekday == name)
    }

    /// Total spend on Saturday and Sunday
    pub fn weekend_spend(&self) -> Decimal {
        self.weekday_spending
            .iter()
            .filter(|w| w.weekday == "Saturday" || w.weekday == "Sunday")
            .map(|w| w.total)
            .sum()
    }

    /// Total spend Monday through Friday
    pub fn workweek_spend(&self) -> Decimal {
        self.weekday_spending
            .iter()
            .filter(|w| w.weekday != "Saturday" && w.weekday != "Sunday")
            .map(|w| w.total)
            .sum()
    }
}

/// Weekday names indexed by `Weekday::num_days_from_monday`
const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Aggregate a batch of transactions into a summary
///
/// An empty batch yields an all-zero summary, not an error.
pub fn aggregate(transactions: &[Transaction]) -> AggregateSummary {
    if transactions.is_empty() {
        return AggregateSummary::empty();
    }

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    let mut categories: Vec<CategoryStats> = Vec::new();
    let mut category_index: HashMap<&'static str, usize> = HashMap::new();

    let mut merchants: Vec<MerchantSpend> = Vec::new();
    let mut merchant_index: HashMap<String, usize> = HashMap::new();

    // Indexed by Weekday::num_days_from_monday
    let mut weekdays: [(Decimal, u32); 7] = [(Decimal::ZERO, 0); 7];

    for tx in transactions {
        let amount = parse_amount_lenient(&tx.amount);

        if tx.direction == TransactionDirection::Credit {
            total_income += amount;
            continue;
        }

        total_expenses += amount;

        let category = normalize_category(tx.category.as_deref());
        match category_index.get(category) {
            Some(&i) => {
                categories[i].total += amount;
                categories[i].count += 1;
            }
            None => {
                category_index.insert(category, categories.len());
                categories.push(CategoryStats {
                    category: category.to_string(),
                    total: amount,
                    count: 1,
                });
            }
        }

        if let Some(merchant) = tx.merchant.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            match merchant_index.get(merchant) {
                Some(&i) => {
                    merchants[i].total += amount;
                    merchants[i].count += 1;
                }
                None => {
                    merchant_index.insert(merchant.to_string(), merchants.len());
                    merchants.push(MerchantSpend {
                        merchant: merchant.to_string(),
                        total: amount,
                        count: 1,
                    });
                }
            }
        }

        // Unparsable dates are excluded from the weekday profile only
        if let Some(date) = tx
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        {
            let slot = &mut weekdays[date.weekday().num_days_from_monday() as usize];
            slot.0 += amount;
            slot.1 += 1;
        } else if tx.date.is_some() {
            debug!(id = %tx.id, "Transaction date unparsable, excluded from weekday profile");
        }
    }

    // Stable sort keeps first-seen order for equal totals
    merchants.sort_by(|a, b| b.total.cmp(&a.total));
    merchants.truncate(TOP_MERCHANT_LIMIT);

    let weekday_spending = (0..7)
        .filter_map(|i| {
            let (total, count) = weekdays[i];
            if count == 0 {
                return None;
            }
            Some(WeekdayStats {
                weekday: DAY_NAMES[i].to_string(),
                total,
                count,
                average: total / Decimal::from(count),
            })
        })
        .collect();

    AggregateSummary {
        total_income,
        total_expenses,
        net_flow: total_income - total_expenses,
        category_breakdown: categories,
        top_merchants: merchants,
        weekday_spending,
        transaction_count: transactions.len(),
        currency: detect_dominant_currency(transactions.iter().map(|t| t.currency.as_deref())),
    }
}
