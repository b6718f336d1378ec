//! Extraction classifier: transcript text in, validated candidates out.
//!
//! The model is asked for a JSON array but routinely wraps it in prose, so
//! parsing scans for the first syntactically complete array literal in the
//! response. A response with no usable array is a soft failure: it yields
//! an empty candidate list with a diagnostic, never an error.

use std::sync::Arc;

use crate::llm::CompletionClient;

use super::prompts::TASK_EXTRACTION_PROMPT;
use super::types::RawCandidateTask;

/// Extracts candidate tasks from transcript text via the completion model.
pub struct TaskExtractor {
    llm: Arc<dyn CompletionClient>,
}

impl TaskExtractor {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Run one extraction. Transport failures propagate; a malformed model
    /// response degrades to an empty list.
    pub async fn extract(&self, transcript: &str) -> anyhow::Result<Vec<RawCandidateTask>> {
        let user = format!("Here is the meeting transcript:\n\n{}", transcript);
        let response = self.llm.complete(TASK_EXTRACTION_PROMPT, &user).await?;
        Ok(parse_candidates(&response))
    }
}

/// Pull validated candidates out of a free-form model response.
/// Elements that fail validation are dropped individually.
pub(crate) fn parse_candidates(response: &str) -> Vec<RawCandidateTask> {
    let Some(array) = first_complete_array(response) else {
        tracing::warn!("model response contained no JSON array, treating as no tasks");
        return Vec::new();
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(array) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("failed to parse task extraction response: {}", e);
            return Vec::new();
        }
    };

    let total = values.len();
    let candidates: Vec<RawCandidateTask> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .filter(|c: &RawCandidateTask| c.confidence.is_finite())
        .collect();

    if candidates.len() < total {
        tracing::warn!(
            dropped = total - candidates.len(),
            "dropped malformed task objects from model response"
        );
    }

    candidates
}

/// Find the first syntactically complete JSON array literal in `text`.
/// Tracks string boundaries and escapes so brackets inside string values
/// do not confuse the depth count.
fn first_complete_array(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' if !in_string => depth += 1,
            b']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ARRAY: &str = r#"[
        {
            "title": "Send the report",
            "assigneeName": "John",
            "dueDate": "Friday",
            "description": "Quarterly report for stakeholders",
            "confidence": 0.95
        }
    ]"#;

    #[test]
    fn parses_bare_array() {
        let candidates = parse_candidates(VALID_ARRAY);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Send the report");
        assert_eq!(candidates[0].assignee_name, "John");
        assert_eq!(candidates[0].due_date.as_deref(), Some("Friday"));
        assert!(candidates[0].assignee_email.is_none());
    }

    #[test]
    fn parses_array_wrapped_in_prose() {
        let response = format!(
            "Sure! Here are the tasks I found:\n\n{}\n\nLet me know if you need anything else.",
            VALID_ARRAY
        );
        let candidates = parse_candidates(&response);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn brackets_inside_strings_do_not_break_scanning() {
        let response = r#"Result: [{"title": "Fix [urgent] bug", "assigneeName": "Ana", "description": "see ticket ]123[", "confidence": 0.9}] done"#;
        let candidates = parse_candidates(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Fix [urgent] bug");
    }

    #[test]
    fn non_json_yields_empty() {
        assert!(parse_candidates("I could not find any tasks.").is_empty());
    }

    #[test]
    fn truncated_json_yields_empty() {
        let truncated = r#"[{"title": "Send the report", "assigneeName": "Jo"#;
        assert!(parse_candidates(truncated).is_empty());
    }

    #[test]
    fn empty_array_yields_empty() {
        assert!(parse_candidates("[]").is_empty());
    }

    #[test]
    fn invalid_elements_are_dropped_not_fatal() {
        let response = r#"[
            {"title": "Good", "assigneeName": "John", "description": "ok", "confidence": 0.9},
            {"title": "No assignee", "description": "bad", "confidence": 0.9},
            {"title": "Bad confidence", "assigneeName": "Ann", "description": "bad", "confidence": "high"},
            "not even an object"
        ]"#;
        let candidates = parse_candidates(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Good");
    }

    #[test]
    fn finds_first_array_not_last() {
        let response = r#"[{"title": "A", "assigneeName": "X", "description": "d", "confidence": 0.5}] trailing [1, 2]"#;
        let candidates = parse_candidates(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "A");
    }
}
