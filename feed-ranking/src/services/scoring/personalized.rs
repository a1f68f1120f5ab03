//! Personalized-mode scoring.
//!
//! Additive terms over (item, viewer context): recency decay, capped
//! engagement, social proximity, group match, prior engagement, tag and
//! media-type affinity, and an active-hours boost. The prior-engagement term
//! deliberately resurfaces already-liked content.

use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};
use uuid::Uuid;

use super::{hours_since, push_factor, FactorKind, ScoredCandidate};
use crate::models::{ContentItem, PreferenceProfile};

/// Personalized weight table. Exact contract values.
#[derive(Debug, Clone, Copy)]
pub struct PersonalizedWeights {
    /// Multiplier applied to the linear recency score
    pub recency_weight: f64,
    /// Starting value of the recency score at age zero
    pub recency_base: f64,
    /// Recency score lost per hour of age
    pub recency_decay_per_hour: f64,
    /// Multiplier applied to the capped engagement score
    pub engagement_weight: f64,
    /// Engagement score ceiling before weighting
    pub engagement_cap: f64,
    pub engagement_like: f64,
    pub engagement_comment: f64,
    pub engagement_share: f64,
    /// Flat bonus when the author is the viewer or an accepted connection
    pub social_proximity: f64,
    /// Flat bonus when item and viewer share a group tag
    pub group_match: f64,
    /// Flat bonus when the viewer already liked the item
    pub prior_engagement: f64,
    /// Bonus per tag shared with the viewer's preferred tags, unbounded
    pub tag_affinity_per_tag: f64,
    /// Flat bonus when the media type is among the viewer's preferred types
    pub media_affinity: f64,
    /// Flat bonus for items created during waking hours
    pub active_hours: f64,
    /// Inclusive hour-of-day range counting as active
    pub active_hours_start: u32,
    pub active_hours_end: u32,
}

pub const PERSONALIZED_WEIGHTS: PersonalizedWeights = PersonalizedWeights {
    recency_weight: 0.3,
    recency_base: 100.0,
    recency_decay_per_hour: 2.0,
    engagement_weight: 0.25,
    engagement_cap: 200.0,
    engagement_like: 2.0,
    engagement_comment: 3.0,
    engagement_share: 5.0,
    social_proximity: 50.0,
    group_match: 30.0,
    prior_engagement: 100.0,
    tag_affinity_per_tag: 20.0,
    media_affinity: 25.0,
    active_hours: 10.0,
    active_hours_start: 8,
    active_hours_end: 22,
};

/// Viewer-side inputs to personalized scoring. Built once per request from
/// the social graph, interaction log, and inferred preferences.
#[derive(Debug, Clone)]
pub struct PersonalizedContext {
    pub user_id: Uuid,
    pub connections: HashSet<Uuid>,
    /// Content ids the viewer already interacted with
    pub liked: HashSet<Uuid>,
    pub group_tag: Option<String>,
    pub preferences: PreferenceProfile,
}

pub fn score(item: &ContentItem, ctx: &PersonalizedContext, now: DateTime<Utc>) -> ScoredCandidate {
    score_with_weights(item, ctx, now, &PERSONALIZED_WEIGHTS)
}

pub fn score_with_weights(
    item: &ContentItem,
    ctx: &PersonalizedContext,
    now: DateTime<Utc>,
    weights: &PersonalizedWeights,
) -> ScoredCandidate {
    let mut factors = Vec::new();

    let hours = hours_since(item.created_at, now);
    let recency = (weights.recency_base - hours * weights.recency_decay_per_hour).max(0.0);
    push_factor(
        &mut factors,
        FactorKind::Recency,
        recency * weights.recency_weight,
    );

    let engagement = f64::from(item.like_count) * weights.engagement_like
        + f64::from(item.comment_count) * weights.engagement_comment
        + f64::from(item.share_count) * weights.engagement_share;
    push_factor(
        &mut factors,
        FactorKind::Engagement,
        engagement.min(weights.engagement_cap) * weights.engagement_weight,
    );

    if item.author_id == ctx.user_id || ctx.connections.contains(&item.author_id) {
        push_factor(
            &mut factors,
            FactorKind::SocialProximity,
            weights.social_proximity,
        );
    }

    if group_matches(item.group_tag.as_deref(), ctx.group_tag.as_deref()) {
        push_factor(&mut factors, FactorKind::GroupMatch, weights.group_match);
    }

    if ctx.liked.contains(&item.id) {
        push_factor(
            &mut factors,
            FactorKind::PriorEngagement,
            weights.prior_engagement,
        );
    }

    let tag_overlap = item
        .tags
        .iter()
        .filter(|tag| ctx.preferences.preferred_tags.iter().any(|p| p == *tag))
        .count();
    push_factor(
        &mut factors,
        FactorKind::TagAffinity,
        tag_overlap as f64 * weights.tag_affinity_per_tag,
    );

    if ctx
        .preferences
        .preferred_media_types
        .contains(&item.media_type)
    {
        push_factor(
            &mut factors,
            FactorKind::MediaAffinity,
            weights.media_affinity,
        );
    }

    let hour = item.created_at.hour();
    if (weights.active_hours_start..=weights.active_hours_end).contains(&hour) {
        push_factor(&mut factors, FactorKind::ActiveHours, weights.active_hours);
    }

    let score = factors.iter().map(|f| f.points).sum();
    ScoredCandidate {
        item_id: item.id,
        score,
        factors,
    }
}

/// Group match requires both sides to carry a tag; an untagged item never
/// matches an untagged viewer.
fn group_matches(item_group: Option<&str>, viewer_group: Option<&str>) -> bool {
    matches!((item_group, viewer_group), (Some(a), Some(b)) if a == b)
}
