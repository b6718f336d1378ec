//! Binary entry point: wire configuration, auth, Graph, the model client,
//! and the pipeline together, then serve the webhook.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use transcript_agent::auth::{tokens::DEFAULT_TOKEN_PATH, TokenProvider};
use transcript_agent::config::{require_env, AppConfig};
use transcript_agent::graph::{
    ChatMessenger, DirectorySearch, GraphClient, MeetingSource, TaskTracker,
};
use transcript_agent::llm::AnthropicClient;
use transcript_agent::pipeline::Pipeline;
use transcript_agent::webhook::{self, subscription, AppState};

const DEFAULT_WEBHOOK_SECRET: &str = "transcript-webhook-secret";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("=== Teams Transcript Tasks Agent ===");

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
    let config = Arc::new(AppConfig::load(&config_path)?);
    tracing::info!("configuration loaded from {}", config_path);

    let client_id = require_env("AZURE_CLIENT_ID")?;
    let tenant_id = require_env("AZURE_TENANT_ID")?;
    let anthropic_key = require_env("ANTHROPIC_API_KEY")?;
    let my_user_id = require_env("MY_USER_ID")?;
    let webhook_secret =
        std::env::var("WEBHOOK_SECRET").unwrap_or_else(|_| DEFAULT_WEBHOOK_SECRET.to_string());

    let auth = Arc::new(TokenProvider::new(
        client_id,
        tenant_id,
        PathBuf::from(DEFAULT_TOKEN_PATH),
    ));

    // Fail fast if Graph credentials are unusable.
    auth.access_token().await?;
    tracing::info!("Microsoft authentication successful");

    let graph = Arc::new(GraphClient::new(Arc::clone(&auth), my_user_id.clone()));
    let llm = Arc::new(AnthropicClient::new(anthropic_key));

    let pipeline = Arc::new(Pipeline::new(
        llm,
        Arc::clone(&graph) as Arc<dyn MeetingSource>,
        Arc::clone(&graph) as Arc<dyn DirectorySearch>,
        Arc::clone(&graph) as Arc<dyn TaskTracker>,
        Arc::clone(&graph) as Arc<dyn ChatMessenger>,
        &config,
        my_user_id,
    ));

    let state = Arc::new(AppState {
        pipeline,
        meetings: Arc::clone(&graph) as Arc<dyn MeetingSource>,
        webhook_secret: webhook_secret.clone(),
    });
    let app = webhook::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("server listening on port {}", port);

    // The webhook needs a publicly reachable URL before Graph will deliver
    // notifications. When one is provided, manage the subscription in the
    // background; Graph probes the URL during creation, so the server must
    // already be accepting by then. Without a PUBLIC_URL the operator is
    // expected to manage the subscription out of band.
    if let Ok(public_url) = std::env::var("PUBLIC_URL") {
        let graph = Arc::clone(&graph);
        let webhook_secret = webhook_secret.clone();
        tokio::spawn(async move {
            match subscription::ensure_transcript_subscription(&graph, &public_url, &webhook_secret)
                .await
            {
                Ok(()) => tracing::info!("webhook subscription active"),
                Err(e) => tracing::error!("failed to set up webhook subscription: {:#}", e),
            }
        });
    } else {
        tracing::warn!("PUBLIC_URL not set, skipping subscription management");
    }

    tracing::info!("=== Ready to process transcripts ===");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
