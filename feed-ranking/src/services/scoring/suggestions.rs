//! Suggestions-mode scoring.
//!
//! Cold-start ranking for content from outside the viewer's graph: group
//! match, capped engagement, and a freshness bonus. Unlike the other modes,
//! the final list keeps score order: suggestions are a best-match list, not
//! a reverse-chronological feed.

use chrono::{DateTime, Utc};

use super::{hours_since, push_factor, FactorKind, ScoredCandidate};
use crate::models::ContentItem;

/// Suggestion weight table. Exact contract values.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionWeights {
    /// Flat bonus when item and viewer share a group tag
    pub group_match: f64,
    /// Engagement score ceiling
    pub engagement_cap: f64,
    pub engagement_comment: f64,
    /// Age below which the freshness bonus applies
    pub freshness_hours: f64,
    pub freshness_bonus: f64,
}

pub const SUGGESTION_WEIGHTS: SuggestionWeights = SuggestionWeights {
    group_match: 50.0,
    engagement_cap: 100.0,
    engagement_comment: 2.0,
    freshness_hours: 48.0,
    freshness_bonus: 30.0,
};

/// Viewer-side inputs to suggestion scoring.
#[derive(Debug, Clone, Default)]
pub struct SuggestionContext {
    pub group_tag: Option<String>,
}

pub fn score(item: &ContentItem, ctx: &SuggestionContext, now: DateTime<Utc>) -> ScoredCandidate {
    score_with_weights(item, ctx, now, &SUGGESTION_WEIGHTS)
}

pub fn score_with_weights(
    item: &ContentItem,
    ctx: &SuggestionContext,
    now: DateTime<Utc>,
    weights: &SuggestionWeights,
) -> ScoredCandidate {
    let mut factors = Vec::new();

    let both_tagged = matches!(
        (item.group_tag.as_deref(), ctx.group_tag.as_deref()),
        (Some(a), Some(b)) if a == b
    );
    if both_tagged {
        push_factor(&mut factors, FactorKind::GroupMatch, weights.group_match);
    }

    let engagement =
        f64::from(item.like_count) + f64::from(item.comment_count) * weights.engagement_comment;
    push_factor(
        &mut factors,
        FactorKind::Engagement,
        engagement.min(weights.engagement_cap),
    );

    if hours_since(item.created_at, now) < weights.freshness_hours {
        push_factor(&mut factors, FactorKind::Freshness, weights.freshness_bonus);
    }

    let score = factors.iter().map(|f| f.points).sum();
    ScoredCandidate {
        item_id: item.id,
        score,
        factors,
    }
}
