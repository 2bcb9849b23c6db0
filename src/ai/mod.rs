//! Pluggable text-generation backend abstraction
//!
//! The insight pipeline talks to a text-generation service through one narrow
//! contract: a system instruction plus user content in, free text out. Any
//! backend failure is a soft failure — generator stages fall back to
//! deterministic rules and the pipeline keeps going.
//!
//! # Architecture
//!
//! - `TextGenerator` trait: the single `generate` operation plus health/identity
//! - `GenClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`,
//!   `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEN_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for text-generation backends
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one generation round-trip: system instruction + user content → text
    async fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete generation client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum GenClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (chat completions API)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl GenClient {
    /// Create a generation client from environment variables
    ///
    /// Checks `GEN_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set; the
    /// pipeline then runs on rule-based fallbacks alone.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("GEN_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(GenClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(GenClient::OpenAICompatible)
            }
            "mock" => Some(GenClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown GEN_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(GenClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        GenClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        GenClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl TextGenerator for GenClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        match self {
            GenClient::Ollama(b) => b.generate(system, user).await,
            GenClient::OpenAICompatible(b) => b.generate(system, user).await,
            GenClient::Mock(b) => b.generate(system, user).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            GenClient::Ollama(b) => b.health_check().await,
            GenClient::OpenAICompatible(b) => b.health_check().await,
            GenClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            GenClient::Ollama(b) => b.model(),
            GenClient::OpenAICompatible(b) => b.model(),
            GenClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            GenClient::Ollama(b) => b.host(),
            GenClient::OpenAICompatible(b) => b.host(),
            GenClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_client_mock_identity() {
        let client = GenClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = GenClient::mock();
        assert!(client.health_check().await);
    }
}
