//! Transaction analysis pipeline
//!
//! Five fixed stages run in sequence: aggregate, detect patterns, generate
//! alerts, create recommendations, save insights. Pattern detection and
//! recommendation creation call the text-generation backend and degrade to
//! deterministic rules on any failure; alerts are rule-based throughout.

pub mod alerts;
pub mod digest;
pub mod patterns;
pub mod pipeline;
pub mod recommendations;

pub use pipeline::TransactionAnalyzer;

use crate::models::{GenerationSource, InsightCandidate};

/// Candidates produced by one generator stage, tagged with their provenance
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub candidates: Vec<InsightCandidate>,
    pub source: GenerationSource,
}

impl StageOutput {
    pub fn generated(candidates: Vec<InsightCandidate>) -> Self {
        Self {
            candidates,
            source: GenerationSource::AiAnalysis,
        }
    }

    pub fn fallback(candidates: Vec<InsightCandidate>) -> Self {
        Self {
            candidates,
            source: GenerationSource::Fallback,
        }
    }
}
