//! Trending-mode scoring.
//!
//! Detects fast-rising content: engagement velocity (per-hour accrual)
//! dominates, with absolute engagement, a recency tier bonus, and the
//! view-normalized engagement rate on top. All divisors are floored at one
//! so zero-view or zero-age items score finitely.

use chrono::{DateTime, Utc};

use super::{hours_since, push_factor, FactorKind, ScoredCandidate};
use crate::models::ContentItem;

/// Trending weight table. Exact contract values.
#[derive(Debug, Clone, Copy)]
pub struct TrendingWeights {
    /// Multiplier applied to per-hour engagement velocity
    pub velocity_weight: f64,
    /// Comment multiplier inside the velocity numerator
    pub velocity_comment: f64,
    /// Multiplier applied to total engagement, uncapped
    pub engagement_weight: f64,
    pub engagement_comment: f64,
    pub engagement_share: f64,
    /// Age below which the fresh tier bonus applies
    pub tier_fresh_hours: f64,
    pub tier_fresh_bonus: f64,
    /// Age below which the recent tier bonus applies
    pub tier_recent_hours: f64,
    pub tier_recent_bonus: f64,
    /// Multiplier applied to the view-normalized engagement rate
    pub rate_weight: f64,
}

pub const TRENDING_WEIGHTS: TrendingWeights = TrendingWeights {
    velocity_weight: 50.0,
    velocity_comment: 2.0,
    engagement_weight: 2.0,
    engagement_comment: 3.0,
    engagement_share: 5.0,
    tier_fresh_hours: 6.0,
    tier_fresh_bonus: 100.0,
    tier_recent_hours: 24.0,
    tier_recent_bonus: 50.0,
    rate_weight: 200.0,
};

pub fn score(item: &ContentItem, now: DateTime<Utc>) -> ScoredCandidate {
    score_with_weights(item, now, &TRENDING_WEIGHTS)
}

pub fn score_with_weights(
    item: &ContentItem,
    now: DateTime<Utc>,
    weights: &TrendingWeights,
) -> ScoredCandidate {
    let mut factors = Vec::new();

    let hours = hours_since(item.created_at, now);
    let likes = f64::from(item.like_count);
    let comments = f64::from(item.comment_count);
    let shares = f64::from(item.share_count);

    let velocity = (likes + comments * weights.velocity_comment) / hours.max(1.0);
    push_factor(
        &mut factors,
        FactorKind::Velocity,
        velocity * weights.velocity_weight,
    );

    let total_engagement =
        likes + comments * weights.engagement_comment + shares * weights.engagement_share;
    push_factor(
        &mut factors,
        FactorKind::Engagement,
        total_engagement * weights.engagement_weight,
    );

    let tier = if hours < weights.tier_fresh_hours {
        weights.tier_fresh_bonus
    } else if hours < weights.tier_recent_hours {
        weights.tier_recent_bonus
    } else {
        0.0
    };
    push_factor(&mut factors, FactorKind::RecencyTier, tier);

    let rate = total_engagement / f64::from(item.view_count).max(1.0);
    push_factor(
        &mut factors,
        FactorKind::EngagementRate,
        rate * weights.rate_weight,
    );

    let score = factors.iter().map(|f| f.points).sum();
    ScoredCandidate {
        item_id: item.id,
        score,
        factors,
    }
}
