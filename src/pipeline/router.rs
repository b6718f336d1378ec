//! Decision router: auto-create or defer to review.
//!
//! A pure conjunctive gate over two independently-sourced confidences. The
//! model's confidence in the task and the matcher's confidence in the
//! assignee must each clear their own bar; a highly confident task with an
//! ambiguous owner is deferred, and vice versa. Do not replace this with a
//! blended score without flagging the behavior change.

use super::types::MatchResult;

/// Minimum identity-match confidence for auto-creation. Fixed, independent
/// of the configurable extraction threshold.
pub const MATCH_CONFIDENCE_BAR: f64 = 0.8;

/// Where a candidate task goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// File the task without human confirmation.
    Auto,
    /// Queue the task for the human reviewer.
    Review,
}

/// Route one candidate. Auto requires all three: a resolved user, task
/// confidence at or above the configured threshold, and match confidence at
/// or above the fixed bar.
pub fn route(task_confidence: f64, match_result: &MatchResult, threshold: f64) -> Route {
    if match_result.user.is_some()
        && task_confidence >= threshold
        && match_result.confidence >= MATCH_CONFIDENCE_BAR
    {
        Route::Auto
    } else {
        Route::Review
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Identity;

    const THRESHOLD: f64 = 0.8;

    fn matched(confidence: f64) -> MatchResult {
        MatchResult {
            user: Some(Identity {
                id: "u1".to_string(),
                display_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
            }),
            confidence,
        }
    }

    #[test]
    fn all_conditions_met_routes_auto() {
        assert_eq!(route(0.95, &matched(0.85), THRESHOLD), Route::Auto);
    }

    #[test]
    fn absent_user_routes_review() {
        // Same confidences as the Auto case, only the user flips.
        let mut result = matched(0.85);
        result.user = None;
        assert_eq!(route(0.95, &result, THRESHOLD), Route::Review);
    }

    #[test]
    fn low_task_confidence_routes_review() {
        assert_eq!(route(0.5, &matched(0.85), THRESHOLD), Route::Review);
    }

    #[test]
    fn low_match_confidence_routes_review() {
        assert_eq!(route(0.95, &matched(0.7), THRESHOLD), Route::Review);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(route(0.8, &matched(0.8), THRESHOLD), Route::Auto);
    }

    #[test]
    fn match_bar_is_independent_of_configured_threshold() {
        // Even with a permissive extraction threshold, the 0.8 match bar holds.
        assert_eq!(route(0.95, &matched(0.7), 0.5), Route::Review);
        assert_eq!(route(0.6, &matched(0.85), 0.5), Route::Auto);
    }
}
