//! JSON extraction from generation responses
//!
//! Generation backends often wrap their JSON payload in a markdown code fence
//! or pad it with prose. Both LLM-backed stages (patterns, recommendations)
//! go through the same extraction grammar: optional fence markers
//! (language-tagged or bare), then the first balanced JSON object.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::InsightCandidate;

/// Payload shape requested from the pattern-detection prompt
#[derive(Debug, Deserialize)]
struct PatternResponse {
    #[serde(default)]
    patterns: Vec<InsightCandidate>,
}

/// Payload shape requested from the recommendation prompt
#[derive(Debug, Deserialize)]
struct RecommendationResponse {
    #[serde(default)]
    recommendations: Vec<InsightCandidate>,
}

/// Extract the JSON object embedded in a generation response
///
/// Strips one leading/trailing markdown fence if present (```json or bare
/// ```), then locates the first balanced `{...}` object. Returns a typed
/// error when no object can be found; callers treat that as a soft failure.
pub fn extract_json_payload(response: &str) -> Result<&str> {
    let body = strip_fence(response.trim());

    if let Some(start) = body.find('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, c) in body[start..].char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&body[start..=start + i]);
                    }
                }
                _ => {}
            }
        }
    }

    Err(Error::InvalidData(format!(
        "No JSON found in generation response | Raw: {}",
        truncate(response)
    )))
}

/// Parse the pattern list out of a generation response
pub fn parse_patterns(response: &str) -> Result<Vec<InsightCandidate>> {
    let json_str = extract_json_payload(response)?;
    let parsed: PatternResponse = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid pattern JSON: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })?;
    Ok(parsed.patterns)
}

/// Parse the recommendation list out of a generation response
pub fn parse_recommendations(response: &str) -> Result<Vec<InsightCandidate>> {
    let json_str = extract_json_payload(response)?;
    let parsed: RecommendationResponse = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid recommendation JSON: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })?;
    Ok(parsed.recommendations)
}

/// Strip one surrounding markdown fence, language-tagged or bare
fn strip_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    // Drop the language tag (or nothing) up to the first newline
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or(rest)
}

/// Truncate long responses for error messages
fn truncate(s: &str) -> String {
    if s.len() > 200 {
        let mut end = 200;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
