//! Task filer: creates a Planner task for an auto-routed candidate.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::{ChatMessenger, DirectorySearch, Meeting, TaskTracker, TrackedTask};

use super::types::ExtractedTask;

/// Errors surfaced while filing a task. The orchestrator catches these and
/// demotes the candidate to review.
#[derive(Debug, Error)]
pub enum FilingError {
    /// The resolved assignee could not be located in the directory at
    /// filing time.
    #[error("could not find user: {0}")]
    AssigneeNotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Files tasks in the tracking system and notifies the oversight identity.
pub struct TaskFiler {
    directory: Arc<dyn DirectorySearch>,
    tracker: Arc<dyn TaskTracker>,
    messenger: Arc<dyn ChatMessenger>,
    oversight_person: String,
}

impl TaskFiler {
    pub fn new(
        directory: Arc<dyn DirectorySearch>,
        tracker: Arc<dyn TaskTracker>,
        messenger: Arc<dyn ChatMessenger>,
        oversight_person: String,
    ) -> Self {
        Self {
            directory,
            tracker,
            messenger,
            oversight_person,
        }
    }

    /// Create the task in the assignee's personal plan.
    ///
    /// The assignee is re-resolved by email-or-name; this is a second,
    /// independent lookup from the matcher's, since Planner needs the
    /// canonical directory record. Assignees on the created task are the
    /// owner first, then the meeting organizer and the oversight identity
    /// when distinct.
    pub async fn file(
        &self,
        task: &ExtractedTask,
        meeting: &Meeting,
    ) -> Result<TrackedTask, FilingError> {
        let query = task
            .assignee_email
            .as_deref()
            .unwrap_or(&task.assignee_name);
        let results = self.directory.search(query).await?;
        let assignee = results
            .into_iter()
            .next()
            .ok_or_else(|| FilingError::AssigneeNotFound(task.assignee_name.clone()))?;

        let plan = self
            .tracker
            .personal_plan(&assignee.id, &assignee.display_name)
            .await?;

        let mut assignee_ids = vec![assignee.id.clone()];
        if !meeting.organizer.id.is_empty() && !assignee_ids.contains(&meeting.organizer.id) {
            assignee_ids.push(meeting.organizer.id.clone());
        }

        let oversight = self.directory.search(&self.oversight_person).await?;
        if let Some(person) = oversight.first() {
            if !assignee_ids.contains(&person.id) {
                assignee_ids.push(person.id.clone());
            }
        }

        let description = format!("{}\n\nFrom meeting: {}", task.description, meeting.subject);
        let record = self
            .tracker
            .create_task(
                &plan.id,
                &task.title,
                &assignee_ids,
                task.due_date.as_deref(),
                Some(&description),
            )
            .await?;

        // Best effort: a failed notification never unwinds the creation.
        if let Some(person) = oversight.first() {
            let message = creation_notice(&meeting.subject, &task.title, &task.assignee_name);
            if let Err(e) = self.messenger.send_text(&person.id, &message).await {
                tracing::warn!("failed to notify oversight of created task: {}", e);
            }
        }

        Ok(record)
    }
}

fn creation_notice(meeting_subject: &str, title: &str, assignee_name: &str) -> String {
    format!(
        "✅ Task created from \"{}\": \"{}\" assigned to {}",
        meeting_subject, title, assignee_name
    )
}
