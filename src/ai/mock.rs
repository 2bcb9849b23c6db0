//! Mock backend for testing
//!
//! Returns scripted responses (or scripted failures) so tests can exercise
//! both the parsed-response path and the rule-based fallback path without a
//! running generation server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::TextGenerator;

/// Mock generation backend
///
/// With no scripted responses, `generate` returns an empty JSON object so
/// callers exercise their parse-failure handling. Queue responses with
/// `push_response`, or construct a failing backend to simulate an outage.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// When true, every generate call errors
    fail: bool,
    /// FIFO of scripted responses
    responses: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            fail: false,
            responses: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a backend whose every generation call fails
    pub fn failing() -> Self {
        Self {
            healthy: false,
            fail: true,
            responses: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a backend that replies with a fixed body once, then repeats it
    pub fn with_response(body: &str) -> Self {
        let backend = Self::new();
        backend.push_response(body);
        backend
    }

    /// Queue a scripted response (consumed in FIFO order; the last queued
    /// response is repeated once the queue empties)
    pub fn push_response(&self, body: &str) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push(body.to_string());
        }
    }
}

#[async_trait]
impl TextGenerator for MockBackend {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
        if self.fail {
            return Err(Error::InvalidData("Mock backend configured to fail".into()));
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| Error::InvalidData("Mock response lock poisoned".into()))?;

        Ok(match responses.len() {
            0 => "{}".to_string(),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_fifo() {
        let mock = MockBackend::new();
        mock.push_response("first");
        mock.push_response("second");

        assert_eq!(mock.generate("s", "u").await.unwrap(), "first");
        assert_eq!(mock.generate("s", "u").await.unwrap(), "second");
        // Last response repeats
        assert_eq!(mock.generate("s", "u").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let mock = MockBackend::failing();
        assert!(mock.generate("s", "u").await.is_err());
        assert!(!mock.health_check().await);
    }

    #[tokio::test]
    async fn test_default_response_is_empty_object() {
        let mock = MockBackend::new();
        assert_eq!(mock.generate("s", "u").await.unwrap(), "{}");
    }
}
