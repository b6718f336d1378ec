//! # Transcript Agent
//!
//! Turns Microsoft Teams meeting transcripts into Planner tasks.
//!
//! A Graph change notification announces a new transcript; the pipeline
//! fetches it, asks a language model for candidate action items, matches
//! each item's stated owner against the meeting roster and the directory,
//! and then either files the task in the owner's personal plan or queues
//! it into a single batched review message for a human to confirm.
//!
//! ## Task Flow
//! 1. Receive transcript notification via webhook
//! 2. Extract candidate tasks from the transcript text
//! 3. Match assignees and route each candidate (auto-create vs. review)
//! 4. File auto-create tasks in Planner, demoting failures to review
//! 5. Send one batched review message for everything uncertain
//!
//! ## Modules
//! - `pipeline`: extraction, matching, routing, filing, review notification
//! - `graph`: Microsoft Graph client glue (meetings, directory, Planner, chat)
//! - `llm`: completion client abstraction with an Anthropic implementation
//! - `webhook`: axum routes and Graph subscription management
//! - `auth`: cached OAuth token refresh
//! - `config`: file-backed application configuration

pub mod auth;
pub mod config;
pub mod graph;
pub mod llm;
pub mod pipeline;
pub mod webhook;

pub use config::AppConfig;
pub use pipeline::{Pipeline, ProcessOutcome};
