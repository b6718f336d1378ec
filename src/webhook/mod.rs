//! Webhook transport: receives Graph change notifications for new
//! transcripts and hands them to the pipeline.

pub mod subscription;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::graph::MeetingSource;
use crate::pipeline::Pipeline;

/// Shared application state.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub meetings: Arc<dyn MeetingSource>,
    /// Expected clientState on inbound notifications.
    pub webhook_secret: String,
}

/// One change notification in a Graph envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub change_type: String,
    pub resource: String,
    #[serde(default)]
    pub client_state: String,
}

#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    #[serde(default)]
    value: Vec<Notification>,
}

/// Build the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Graph first sends a validation probe carrying a `validationToken` query
/// parameter that must be echoed back as plain text. Real notifications are
/// acknowledged with 202 immediately and processed in the background.
async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    if let Some(token) = params.get("validationToken") {
        tracing::info!("webhook validation request received");
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            token.clone(),
        )
            .into_response();
    }

    let envelope: NotificationEnvelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("could not parse notification envelope: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    tokio::spawn(async move {
        for notification in envelope.value {
            if notification.client_state != state.webhook_secret {
                tracing::warn!("invalid client state in notification, skipping");
                continue;
            }
            if let Err(e) = handle_notification(&state, &notification).await {
                tracing::error!(resource = %notification.resource, "error processing transcript: {:#}", e);
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}

async fn handle_notification(state: &AppState, notification: &Notification) -> anyhow::Result<()> {
    let Some((meeting_id, transcript_id)) = parse_transcript_resource(&notification.resource)
    else {
        tracing::error!(
            resource = %notification.resource,
            "could not parse meeting/transcript ids from resource"
        );
        return Ok(());
    };

    let meeting = state.meetings.fetch_meeting(&meeting_id).await?;
    tracing::info!(subject = %meeting.subject, "processing transcript for meeting");

    let outcome = state
        .pipeline
        .process_transcript(&meeting_id, &transcript_id, &meeting)
        .await?;

    tracing::info!(
        created = outcome.created,
        queued = outcome.queued,
        "transcript processed"
    );
    Ok(())
}

/// Extract meeting and transcript ids from a notification resource path of
/// the form `.../onlineMeetings/{meetingId}/transcripts/{transcriptId}`.
fn parse_transcript_resource(resource: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = resource.split('/').collect();
    let meeting_id = parts
        .iter()
        .position(|&p| p == "onlineMeetings")
        .and_then(|i| parts.get(i + 1))?;
    let transcript_id = parts
        .iter()
        .position(|&p| p == "transcripts")
        .and_then(|i| parts.get(i + 1))?;

    if meeting_id.is_empty() || transcript_id.is_empty() {
        return None;
    }
    Some((meeting_id.to_string(), transcript_id.to_string()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_resource() {
        let resource = "communications/onlineMeetings/meet-123/transcripts/tr-456";
        assert_eq!(
            parse_transcript_resource(resource),
            Some(("meet-123".to_string(), "tr-456".to_string()))
        );
    }

    #[test]
    fn parses_resource_with_leading_slash() {
        let resource = "/communications/onlineMeetings/m1/transcripts/t1";
        assert_eq!(
            parse_transcript_resource(resource),
            Some(("m1".to_string(), "t1".to_string()))
        );
    }

    #[test]
    fn rejects_resource_without_transcript_segment() {
        assert!(parse_transcript_resource("/communications/onlineMeetings/m1").is_none());
    }

    #[test]
    fn rejects_unrelated_resource() {
        assert!(parse_transcript_resource("/users/u1/messages/m2").is_none());
    }

    #[test]
    fn rejects_trailing_segment_names_without_ids() {
        assert!(parse_transcript_resource("/onlineMeetings/m1/transcripts").is_none());
    }

    #[test]
    fn envelope_with_missing_optional_fields_parses() {
        let body = r#"{"value": [{"resource": "/onlineMeetings/m1/transcripts/t1"}]}"#;
        let envelope: NotificationEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.value.len(), 1);
        assert_eq!(envelope.value[0].client_state, "");
    }
}
