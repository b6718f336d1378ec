//! Data model for the extraction-and-assignment pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::Identity;

/// A candidate task as emitted by the extraction model, before identity
/// resolution. Field names match the JSON the model is instructed to emit.
///
/// `confidence` is the model's certainty that this is a genuine actionable
/// commitment; it is never mutated after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidateTask {
    pub title: String,
    pub assignee_name: String,
    #[serde(default)]
    pub assignee_email: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub description: String,
    pub confidence: f64,
}

/// Which meeting a task came from. Attached to every task derived from a
/// given transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingContext {
    pub meeting_id: String,
    pub meeting_subject: String,
}

/// A candidate task with its meeting context and, once matched with high
/// confidence, the assignee's resolved email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTask {
    pub title: String,
    pub assignee_name: String,
    pub assignee_email: Option<String>,
    pub due_date: Option<String>,
    pub description: String,
    pub confidence: f64,
    pub meeting_context: MeetingContext,
}

impl ExtractedTask {
    /// Attach meeting context to a raw candidate.
    pub fn from_candidate(candidate: RawCandidateTask, meeting_context: MeetingContext) -> Self {
        Self {
            title: candidate.title,
            assignee_name: candidate.assignee_name,
            assignee_email: candidate.assignee_email,
            due_date: candidate.due_date,
            description: candidate.description,
            confidence: candidate.confidence,
            meeting_context,
        }
    }
}

/// The identity matcher's verdict for one assignee name.
///
/// Confidence is tiered (1.0 / 0.85 / 0.7 / 0.5 / 0), not a continuous
/// probability. A missing user implies confidence 0.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub user: Option<Identity>,
    pub confidence: f64,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            user: None,
            confidence: 0.0,
        }
    }
}

/// A directory identity proposed for a review task, with the matcher's
/// confidence in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAssignee {
    pub user: Identity,
    pub confidence: f64,
}

/// Lifecycle of a review task. The pipeline only ever creates `Pending`;
/// later transitions belong to the (separate) inbound reply handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Edited,
}

/// A task deferred to a human reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTask {
    pub id: Uuid,
    #[serde(flatten)]
    pub task: ExtractedTask,
    pub suggested_assignees: Vec<SuggestedAssignee>,
    pub status: ReviewStatus,
}

impl ReviewTask {
    /// Queue a task for review with a fresh id.
    pub fn pending(task: ExtractedTask, suggested_assignees: Vec<SuggestedAssignee>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            suggested_assignees,
            status: ReviewStatus::Pending,
        }
    }
}

/// Outcome of one pipeline run. `created + queued` always equals the number
/// of candidates the extractor produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub created: usize,
    pub queued: usize,
}
