//! Identity matcher: resolves a free-text assignee name to a directory
//! identity with a tiered confidence score.
//!
//! Precedence is strict, first hit wins:
//! 1. exact display-name match among participants (1.0)
//! 2. display-name prefix match among participants (0.85)
//! 3. directory search fallback, first result (0.7 when the result's
//!    display name contains the query, else 0.5)
//! 4. nothing anywhere (no user, 0.0)
//!
//! No fuzzy matching and no nickname expansion. Directory errors propagate;
//! the caller decides whether that aborts the run.

use crate::graph::{DirectorySearch, Participant};

use super::types::MatchResult;

/// Exact participant match.
pub const CONFIDENCE_EXACT: f64 = 1.0;
/// Prefix participant match (first name against full display name).
pub const CONFIDENCE_PREFIX: f64 = 0.85;
/// Directory result whose display name contains the query.
pub const CONFIDENCE_DIRECTORY_CONTAINS: f64 = 0.7;
/// Directory result with no textual overlap guarantee.
pub const CONFIDENCE_DIRECTORY_WEAK: f64 = 0.5;

/// Resolve `name` against the meeting roster, falling back to a directory
/// search.
pub async fn match_assignee(
    name: &str,
    participants: &[Participant],
    directory: &dyn DirectorySearch,
) -> anyhow::Result<MatchResult> {
    let needle = name.to_lowercase();

    if let Some(exact) = participants
        .iter()
        .find(|p| p.display_name.to_lowercase() == needle)
    {
        return Ok(MatchResult {
            user: Some(exact.to_identity()),
            confidence: CONFIDENCE_EXACT,
        });
    }

    if let Some(prefix) = participants
        .iter()
        .find(|p| p.display_name.to_lowercase().starts_with(&needle))
    {
        return Ok(MatchResult {
            user: Some(prefix.to_identity()),
            confidence: CONFIDENCE_PREFIX,
        });
    }

    let results = directory.search(name).await?;
    if let Some(best) = results.into_iter().next() {
        let confidence = if best.display_name.to_lowercase().contains(&needle) {
            CONFIDENCE_DIRECTORY_CONTAINS
        } else {
            CONFIDENCE_DIRECTORY_WEAK
        };
        return Ok(MatchResult {
            user: Some(best),
            confidence,
        });
    }

    Ok(MatchResult::none())
}
