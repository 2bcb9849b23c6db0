//! Finsights Core Library
//!
//! Transaction analysis pipeline for a personal finance product:
//! - Exact-decimal aggregation of raw transactions (totals, category and
//!   merchant breakdowns, weekday profile)
//! - Three insight generators (patterns, alerts, recommendations) combining
//!   rule-based logic with a text-generation backend and deterministic
//!   fallbacks
//! - A five-stage orchestrator that replaces the persisted insights of a
//!   `(user, file)` scope on every run
//! - Pluggable generation backends (Ollama, OpenAI-compatible, mock)
//! - A SQLite persistence adapter behind the `AnalysisStore` contract

pub mod aggregate;
pub mod ai;
pub mod analyzer;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod store;

pub use aggregate::{aggregate, AggregateSummary, CategoryStats, MerchantSpend, WeekdayStats};
pub use ai::{GenClient, MockBackend, OllamaBackend, OpenAICompatibleBackend, TextGenerator};
pub use analyzer::TransactionAnalyzer;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{
    GenerationSource, Insight, InsightCandidate, InsightType, Severity, Transaction,
    TransactionDirection,
};
pub use store::AnalysisStore;
