//! The task-extraction-and-assignment pipeline.
//!
//! One invocation per transcript notification, one-shot (no internal
//! retries; redelivery is the webhook's concern): fetch the transcript and
//! roster, extract candidate tasks, match and route each candidate
//! sequentially, file the auto-create set, and send a single batched review
//! message for everything else. Every raw candidate ends up either created
//! or queued; a failed filing demotes the candidate to review rather than
//! dropping it.

pub mod extract;
pub mod filer;
pub mod matcher;
pub mod notify;
pub mod prompts;
pub mod router;
mod types;

pub use types::{
    ExtractedTask, MatchResult, MeetingContext, ProcessOutcome, RawCandidateTask, ReviewStatus,
    ReviewTask, SuggestedAssignee,
};

use std::sync::Arc;

use crate::config::AppConfig;
use crate::graph::{ChatMessenger, DirectorySearch, Meeting, MeetingSource, TaskTracker};
use crate::llm::CompletionClient;

use self::extract::TaskExtractor;
use self::filer::TaskFiler;
use self::notify::ReviewNotifier;
use self::router::{route, Route};

/// Orchestrates one transcript-processing run. Constructed once at startup
/// with its collaborators injected; shared across webhook deliveries.
pub struct Pipeline {
    extractor: TaskExtractor,
    meetings: Arc<dyn MeetingSource>,
    directory: Arc<dyn DirectorySearch>,
    filer: TaskFiler,
    notifier: ReviewNotifier,
    /// Recipient of the batched review message.
    reviewer_id: String,
    confidence_threshold: f64,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        meetings: Arc<dyn MeetingSource>,
        directory: Arc<dyn DirectorySearch>,
        tracker: Arc<dyn TaskTracker>,
        messenger: Arc<dyn ChatMessenger>,
        config: &AppConfig,
        reviewer_id: String,
    ) -> Self {
        Self {
            extractor: TaskExtractor::new(llm),
            meetings,
            directory: Arc::clone(&directory),
            filer: TaskFiler::new(
                directory,
                tracker,
                Arc::clone(&messenger),
                config.oversight_person.clone(),
            ),
            notifier: ReviewNotifier::new(messenger),
            reviewer_id,
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Process one transcript end to end.
    ///
    /// Transcript and roster fetch failures abort the run. Candidates are
    /// processed sequentially in extraction order; the returned counts
    /// always partition the extracted candidates.
    pub async fn process_transcript(
        &self,
        meeting_id: &str,
        transcript_id: &str,
        meeting: &Meeting,
    ) -> anyhow::Result<ProcessOutcome> {
        let transcript = self
            .meetings
            .fetch_transcript(meeting_id, transcript_id)
            .await?;
        let participants = self.meetings.fetch_participants(meeting_id).await?;

        let candidates = self.extractor.extract(&transcript.content).await?;
        if candidates.is_empty() {
            tracing::info!("no tasks found in transcript");
            return Ok(ProcessOutcome::default());
        }
        tracing::info!(count = candidates.len(), "found potential tasks");

        let mut auto_create: Vec<ExtractedTask> = Vec::new();
        let mut needs_review: Vec<ReviewTask> = Vec::new();

        for candidate in candidates {
            let matched =
                matcher::match_assignee(&candidate.assignee_name, &participants, &*self.directory)
                    .await?;

            let mut task = ExtractedTask::from_candidate(
                candidate,
                MeetingContext {
                    meeting_id: meeting_id.to_string(),
                    meeting_subject: meeting.subject.clone(),
                },
            );

            match route(task.confidence, &matched, self.confidence_threshold) {
                Route::Auto => {
                    // Safe: Auto implies the matcher resolved a user.
                    if let Some(user) = &matched.user {
                        task.assignee_email = Some(user.email.clone());
                    }
                    auto_create.push(task);
                }
                Route::Review => {
                    let suggestions = matched
                        .user
                        .map(|user| {
                            vec![SuggestedAssignee {
                                user,
                                confidence: matched.confidence,
                            }]
                        })
                        .unwrap_or_default();
                    needs_review.push(ReviewTask::pending(task, suggestions));
                }
            }
        }

        let mut created = 0;
        for task in auto_create {
            match self.filer.file(&task, meeting).await {
                Ok(record) => {
                    created += 1;
                    tracing::debug!(task_id = %record.id, title = %task.title, "task created");
                }
                Err(e) => {
                    tracing::warn!(
                        title = %task.title,
                        "failed to create task, queuing for review: {}",
                        e
                    );
                    needs_review.push(ReviewTask::pending(task, Vec::new()));
                }
            }
        }

        if !needs_review.is_empty() {
            self.notifier
                .notify_review(&self.reviewer_id, &meeting.subject, &needs_review)
                .await?;
        }

        Ok(ProcessOutcome {
            created,
            queued: needs_review.len(),
        })
    }
}
