//! Review notifier: one batched message per processed transcript.
//!
//! Batching is mandatory; a run never sends one message per task.

use std::sync::Arc;

use crate::graph::ChatMessenger;

use super::types::ReviewTask;

/// Sends the batched review message.
pub struct ReviewNotifier {
    messenger: Arc<dyn ChatMessenger>,
}

impl ReviewNotifier {
    pub fn new(messenger: Arc<dyn ChatMessenger>) -> Self {
        Self { messenger }
    }

    /// Send one HTML message covering every review task, in input order.
    /// Returns the sent message id. `tasks` must be non-empty.
    pub async fn notify_review(
        &self,
        recipient_id: &str,
        meeting_subject: &str,
        tasks: &[ReviewTask],
    ) -> anyhow::Result<String> {
        debug_assert!(!tasks.is_empty());
        let body = format_review_message(meeting_subject, tasks);
        self.messenger.send_html(recipient_id, &body).await
    }
}

/// Render the review batch as Teams HTML.
pub(crate) fn format_review_message(meeting_subject: &str, tasks: &[ReviewTask]) -> String {
    let date = chrono::Utc::now().format("%b %-d");

    let mut html = format!(
        "<b>📋 Meeting Task Review ({} - {})</b><br><br>",
        escape_html(meeting_subject),
        date
    );
    html.push_str("<b>Uncertain tasks found:</b><br><br>");

    for (index, review) in tasks.iter().enumerate() {
        html.push_str(&format!(
            "<b>{}. \"{}\"</b><br>",
            index + 1,
            escape_html(&review.task.title)
        ));

        match review.suggested_assignees.first() {
            Some(top) => html.push_str(&format!(
                "-> Suggested assignee: {} ({}% match)<br>",
                escape_html(&top.user.display_name),
                (top.confidence * 100.0).round() as u32
            )),
            None => html.push_str("-> Assignee unclear<br>"),
        }

        match review.task.due_date.as_deref() {
            Some(due) => html.push_str(&format!("-> Due: {}<br>", escape_html(due))),
            None => html.push_str("-> Due: Not mentioned<br>"),
        }

        html.push_str("<br>");
    }

    html.push_str(
        "<i>Reply with task numbers to approve (e.g., \"approve 1, 3\") or \"skip all\"</i>",
    );

    html
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Identity;
    use crate::pipeline::types::{ExtractedTask, MeetingContext, SuggestedAssignee};

    fn review_task(title: &str, due: Option<&str>, suggestion: Option<(&str, f64)>) -> ReviewTask {
        let task = ExtractedTask {
            title: title.to_string(),
            assignee_name: "someone".to_string(),
            assignee_email: None,
            due_date: due.map(str::to_string),
            description: "context".to_string(),
            confidence: 0.5,
            meeting_context: MeetingContext {
                meeting_id: "m1".to_string(),
                meeting_subject: "Weekly Sync".to_string(),
            },
        };
        let suggestions = suggestion
            .map(|(name, confidence)| {
                vec![SuggestedAssignee {
                    user: Identity {
                        id: "u1".to_string(),
                        display_name: name.to_string(),
                        email: "u1@example.com".to_string(),
                    },
                    confidence,
                }]
            })
            .unwrap_or_default();
        ReviewTask::pending(task, suggestions)
    }

    #[test]
    fn tasks_are_numbered_in_input_order() {
        let tasks = vec![
            review_task("First", None, None),
            review_task("Second", None, None),
            review_task("Third", None, None),
        ];
        let html = format_review_message("Weekly Sync", &tasks);

        let first = html.find("1. \"First\"").unwrap();
        let second = html.find("2. \"Second\"").unwrap();
        let third = html.find("3. \"Third\"").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn suggestion_renders_rounded_percentage() {
        let tasks = vec![review_task("Task", None, Some(("Jane Doe", 0.846)))];
        let html = format_review_message("Weekly Sync", &tasks);
        assert!(html.contains("Suggested assignee: Jane Doe (85% match)"));
    }

    #[test]
    fn missing_suggestion_and_due_date_have_markers() {
        let tasks = vec![review_task("Task", None, None)];
        let html = format_review_message("Weekly Sync", &tasks);
        assert!(html.contains("Assignee unclear"));
        assert!(html.contains("Due: Not mentioned"));
    }

    #[test]
    fn due_date_is_rendered_when_present() {
        let tasks = vec![review_task("Task", Some("next Friday"), None)];
        let html = format_review_message("Weekly Sync", &tasks);
        assert!(html.contains("Due: next Friday"));
    }

    #[test]
    fn reply_instructions_are_appended() {
        let tasks = vec![review_task("Task", None, None)];
        let html = format_review_message("Weekly Sync", &tasks);
        assert!(html.ends_with("<i>Reply with task numbers to approve (e.g., \"approve 1, 3\") or \"skip all\"</i>"));
    }

    #[test]
    fn interpolated_text_is_escaped() {
        let tasks = vec![review_task("Ship <v2> & \"launch\"", None, None)];
        let html = format_review_message("Q&A <session>", &tasks);
        assert!(html.contains("Q&amp;A &lt;session&gt;"));
        assert!(html.contains("Ship &lt;v2&gt; &amp; &quot;launch&quot;"));
    }

    #[test]
    fn escape_html_covers_all_specials() {
        assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }
}
