//! Domain models for finsights

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction: money in or money out
///
/// Source extraction is not trusted to produce a clean label, so parsing is
/// lenient: anything that is not `credit` counts as a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Credit,
    #[default]
    Debit,
}

impl TransactionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::str::FromStr for TransactionDirection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            _ => Ok(Self::Debit),
        }
    }
}

impl std::fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction categories assigned by the upstream extraction service
pub const CATEGORIES: &[&str] = &[
    "income",
    "housing",
    "transportation",
    "food_and_dining_out",
    "entertainment",
    "healthcare",
    "education",
    "utilities",
    "groceries",
    "subscriptions_and_memberships",
    "other",
];

/// Catch-all category for missing or unrecognized labels
pub const CATEGORY_OTHER: &str = "other";

/// Normalize a category label to one of the known categories
///
/// Missing, empty, or unrecognized labels fall back to `other`.
pub fn normalize_category(raw: Option<&str>) -> &'static str {
    raw.map(str::trim)
        .and_then(|label| CATEGORIES.iter().find(|c| **c == label))
        .copied()
        .unwrap_or(CATEGORY_OTHER)
}

/// A financial transaction as delivered by the persistence adapter
///
/// Amounts and dates are kept as the raw strings produced by statement
/// extraction. The aggregation engine parses them tolerantly; one dirty field
/// must not poison the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: i64,
    pub file_id: Option<String>,
    /// ISO `YYYY-MM-DD`, when extraction managed to find one
    pub date: Option<String>,
    pub description: String,
    pub merchant: Option<String>,
    /// Non-negative magnitude as a decimal string
    pub amount: String,
    pub direction: TransactionDirection,
    pub category: Option<String>,
    pub currency: Option<String>,
}

/// Kind of generated insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Pattern,
    Alert,
    Recommendation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Alert => "alert",
            Self::Recommendation => "recommendation",
        }
    }
}

impl std::str::FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(Self::Pattern),
            "alert" => Ok(Self::Alert),
            "recommendation" => Ok(Self::Recommendation),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity level carried by alert insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an insight's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// Produced via the external text-generation service
    AiAnalysis,
    /// Produced by deterministic rules after a generation failure
    Fallback,
}

impl GenerationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiAnalysis => "ai_analysis",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient insight produced by one generator stage
///
/// Also the deserialization target for the JSON the generation backends are
/// asked to return, hence the defaulted optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCandidate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl InsightCandidate {
    /// Build a candidate without severity (patterns, recommendations)
    pub fn new(title: impl Into<String>, description: impl Into<String>, icon: &str) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: Some(icon.to_string()),
            severity: None,
        }
    }

    /// Build an alert candidate with severity
    pub fn alert(
        title: impl Into<String>,
        description: impl Into<String>,
        icon: &str,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: Some(icon.to_string()),
            severity: Some(severity),
        }
    }
}

/// A persisted insight
///
/// Insights are replaced wholesale per scope on every pipeline run and never
/// mutated afterwards. `created_at` is stamped by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub user_id: i64,
    pub file_id: Option<String>,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub severity: Option<Severity>,
    /// Free-form metadata; always carries a `source` provenance marker
    pub metadata: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_lenient_parse() {
        assert_eq!(
            TransactionDirection::from_str("credit").unwrap(),
            TransactionDirection::Credit
        );
        assert_eq!(
            TransactionDirection::from_str("CREDIT ").unwrap(),
            TransactionDirection::Credit
        );
        assert_eq!(
            TransactionDirection::from_str("debit").unwrap(),
            TransactionDirection::Debit
        );
        // Unknown labels count as spend
        assert_eq!(
            TransactionDirection::from_str("withdrawal").unwrap(),
            TransactionDirection::Debit
        );
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some("groceries")), "groceries");
        assert_eq!(normalize_category(Some("crypto")), "other");
        assert_eq!(normalize_category(Some("")), "other");
        assert_eq!(normalize_category(None), "other");
    }

    #[test]
    fn test_insight_type_round_trip() {
        for t in [
            InsightType::Pattern,
            InsightType::Alert,
            InsightType::Recommendation,
        ] {
            assert_eq!(InsightType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(InsightType::from_str("forecast").is_err());
    }

    #[test]
    fn test_severity_round_trip() {
        for s in [Severity::Info, Severity::Warning, Severity::Critical] {
            assert_eq!(Severity::from_str(s.as_str()).unwrap(), s);
        }
        assert!(Severity::from_str("fatal").is_err());
    }

    #[test]
    fn test_candidate_deserializes_without_severity() {
        let json = r#"{"title": "Coffee Habit", "description": "Daily coffee", "icon": "Coffee"}"#;
        let candidate: InsightCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.title, "Coffee Habit");
        assert_eq!(candidate.icon.as_deref(), Some("Coffee"));
        assert!(candidate.severity.is_none());
    }
}
