//! Pipeline orchestrator
//!
//! `TransactionAnalyzer` drives the five fixed stages in order: aggregate,
//! detect patterns, generate alerts, create recommendations, save insights.
//! Transitions are unconditional; a stage producing nothing still hands off
//! to the next. Generation failures are absorbed inside their stage, so the
//! only hard failures here are invalid scopes and persistence errors.

use tracing::debug;
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::ai::GenClient;
use crate::error::{Error, Result};
use crate::models::{GenerationSource, Insight, InsightCandidate, InsightType, Severity, Transaction};
use crate::store::AnalysisStore;

use super::{alerts, patterns, recommendations, StageOutput};

/// Cap on fetched transactions per run; bounds both aggregation work and the
/// size of the generation digests
const FETCH_LIMIT: usize = 500;

/// Icons used when a generated candidate carries none
fn default_icon(insight_type: InsightType) -> &'static str {
    match insight_type {
        InsightType::Pattern => "TrendingUp",
        InsightType::Alert => "AlertTriangle",
        InsightType::Recommendation => "Lightbulb",
    }
}

/// The transaction analysis pipeline
///
/// Constructed with its persistence adapter and an optional generation
/// client; with no client every run uses the rule-based fallbacks. One
/// analyzer may serve concurrent runs: per-run state lives on the stack.
pub struct TransactionAnalyzer<S> {
    store: S,
    gen: Option<GenClient>,
}

impl<S: AnalysisStore> TransactionAnalyzer<S> {
    pub fn new(store: S, gen: Option<GenClient>) -> Self {
        Self { store, gen }
    }

    /// Access the underlying store (for composition by callers)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the full analysis pipeline for one scope
    ///
    /// When `transactions` is not supplied, up to 500 of the scope's most
    /// recent transactions are fetched from the store. Prior insights in the
    /// scope are replaced wholesale; the inserted set is returned.
    pub async fn analyze(
        &self,
        user_id: i64,
        file_id: Option<&str>,
        transactions: Option<Vec<Transaction>>,
    ) -> Result<Vec<Insight>> {
        validate_scope(user_id, file_id)?;

        let transactions = match transactions {
            Some(batch) => batch,
            None => self
                .store
                .fetch_transactions(user_id, file_id, FETCH_LIMIT, true)?,
        };

        // Stage 1: aggregate
        let summary = aggregate(&transactions);
        debug!(
            user_id,
            transaction_count = summary.transaction_count,
            "Aggregation complete"
        );

        // Stage 2: detect patterns
        let pattern_output = patterns::detect(self.gen.as_ref(), &summary).await;

        // Stage 3: generate alerts (pure rules)
        let alert_candidates = alerts::generate(&summary);

        // Stage 4: create recommendations (reads pattern/alert titles)
        let recommendation_output = recommendations::generate(
            self.gen.as_ref(),
            &summary,
            &pattern_output.candidates,
            &alert_candidates,
        )
        .await;

        // Stage 5: save insights (replace semantics per scope)
        let insights = self.save_insights(
            user_id,
            file_id,
            &pattern_output,
            &alert_candidates,
            &recommendation_output,
        )?;

        debug!(user_id, insight_count = insights.len(), "Analysis complete");
        Ok(insights)
    }

    fn save_insights(
        &self,
        user_id: i64,
        file_id: Option<&str>,
        pattern_output: &StageOutput,
        alert_candidates: &[InsightCandidate],
        recommendation_output: &StageOutput,
    ) -> Result<Vec<Insight>> {
        let mut insights = Vec::new();

        for candidate in &pattern_output.candidates {
            insights.push(to_insight(
                user_id,
                file_id,
                InsightType::Pattern,
                candidate,
                pattern_output.source,
            ));
        }
        for candidate in alert_candidates {
            insights.push(to_insight(
                user_id,
                file_id,
                InsightType::Alert,
                candidate,
                GenerationSource::AiAnalysis,
            ));
        }
        for candidate in &recommendation_output.candidates {
            insights.push(to_insight(
                user_id,
                file_id,
                InsightType::Recommendation,
                candidate,
                recommendation_output.source,
            ));
        }

        // Replace, not upsert: scoped deletion happens even when the new
        // batch is empty
        if file_id.is_some() {
            let removed = self.store.delete_insights(user_id, file_id)?;
            debug!(user_id, removed, "Cleared prior insights in scope");
        }

        if !insights.is_empty() {
            self.store.insert_insights(&insights)?;
        }

        Ok(insights)
    }
}

/// Convert a stage candidate into a persistable insight
fn to_insight(
    user_id: i64,
    file_id: Option<&str>,
    insight_type: InsightType,
    candidate: &InsightCandidate,
    source: GenerationSource,
) -> Insight {
    let severity = match insight_type {
        InsightType::Alert => Some(candidate.severity.unwrap_or(Severity::Info)),
        _ => candidate.severity,
    };

    Insight {
        id: Uuid::new_v4().to_string(),
        user_id,
        file_id: file_id.map(str::to_string),
        insight_type,
        title: candidate.title.clone(),
        description: candidate.description.clone(),
        icon: candidate
            .icon
            .clone()
            .unwrap_or_else(|| default_icon(insight_type).to_string()),
        severity,
        metadata: serde_json::json!({ "source": source.as_str() }),
        created_at: None,
    }
}

/// Reject malformed scopes before any stage executes
fn validate_scope(user_id: i64, file_id: Option<&str>) -> Result<()> {
    if user_id <= 0 {
        return Err(Error::InvalidData(format!(
            "user_id must be positive, got {}",
            user_id
        )));
    }
    if let Some(id) = file_id {
        if id.trim().is_empty() {
            return Err(Error::InvalidData("file_id must not be empty".into()));
        }
    }
    Ok(())
}
