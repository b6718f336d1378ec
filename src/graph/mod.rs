//! Microsoft Graph client glue.
//!
//! The pipeline talks to Graph through four narrow service traits so tests
//! can substitute in-memory fakes. [`GraphClient`] implements all of them
//! over a shared authenticated `reqwest` client.

mod chat;
mod directory;
mod meetings;
mod planner;
mod types;

pub use types::{Identity, Meeting, Participant, Plan, Subscription, TrackedTask, Transcript};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::auth::TokenProvider;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Errors from the Graph transport layer.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected graph response shape: {0}")]
    Shape(String),
}

/// Fetches transcripts, meeting details, and rosters.
#[async_trait]
pub trait MeetingSource: Send + Sync {
    async fn fetch_transcript(
        &self,
        meeting_id: &str,
        transcript_id: &str,
    ) -> anyhow::Result<Transcript>;

    async fn fetch_meeting(&self, meeting_id: &str) -> anyhow::Result<Meeting>;

    /// Roster for a meeting: organizer first, then attendees.
    async fn fetch_participants(&self, meeting_id: &str) -> anyhow::Result<Vec<Participant>>;
}

/// Searches the directory for users, best match first.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Identity>>;
}

/// Looks up plans and creates tasks in the tracking system.
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// A user's personal plan. Plan creation is unsupported; fails when the
    /// user has no plan at all.
    async fn personal_plan(&self, user_id: &str, display_name: &str) -> anyhow::Result<Plan>;

    async fn create_task(
        &self,
        plan_id: &str,
        title: &str,
        assignee_ids: &[String],
        due_date: Option<&str>,
        description: Option<&str>,
    ) -> anyhow::Result<TrackedTask>;
}

/// Sends 1:1 chat messages.
#[async_trait]
pub trait ChatMessenger: Send + Sync {
    /// Send an HTML-formatted message; returns the message id.
    async fn send_html(&self, recipient_id: &str, html: &str) -> anyhow::Result<String>;

    /// Send a plain-text message.
    async fn send_text(&self, recipient_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Authenticated Graph HTTP client.
pub struct GraphClient {
    http: reqwest::Client,
    auth: Arc<TokenProvider>,
    /// The signed-in user's directory id, needed when creating 1:1 chats.
    self_user_id: String,
}

impl GraphClient {
    pub fn new(auth: Arc<TokenProvider>, self_user_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            self_user_id,
        }
    }

    pub(crate) fn self_user_id(&self) -> &str {
        &self.self_user_id
    }

    async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GraphError::Status {
                status: status.as_u16(),
                body,
            }
            .into())
        }
    }

    pub(crate) async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// GET a resource body as raw text (transcript content).
    pub(crate) async fn get_text(&self, path: &str) -> anyhow::Result<String> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.text().await?)
    }

    pub(crate) async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// PATCH guarded by an etag If-Match header. Some Graph PATCH endpoints
    /// return 204 with no body, so the result is discarded.
    pub(crate) async fn patch_with_etag(
        &self,
        path: &str,
        etag: &str,
        body: &Value,
    ) -> anyhow::Result<()> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .patch(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .header("If-Match", etag)
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn patch(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .patch(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .delete(format!("{}{}", GRAPH_BASE, path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
