//! Scoring engine: three deterministic, pure scorers over the candidate pool.
//!
//! Each additive term is materialized as a [`ScoreFactor`] so individual
//! contributions can be asserted in isolation and double as the
//! human-readable reasons attached to a scored candidate. Weights are named
//! constants per mode; they are behavioral contracts, not tuning knobs.

pub mod personalized;
pub mod suggestions;
pub mod trending;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::ContentItem;

pub use personalized::{PersonalizedContext, PersonalizedWeights, PERSONALIZED_WEIGHTS};
pub use suggestions::{SuggestionContext, SuggestionWeights, SUGGESTION_WEIGHTS};
pub use trending::{TrendingWeights, TRENDING_WEIGHTS};

/// Which term contributed to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Recency,
    Engagement,
    SocialProximity,
    GroupMatch,
    PriorEngagement,
    TagAffinity,
    MediaAffinity,
    ActiveHours,
    Velocity,
    RecencyTier,
    EngagementRate,
    Freshness,
}

impl FactorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::Recency => "recency",
            FactorKind::Engagement => "engagement",
            FactorKind::SocialProximity => "social_proximity",
            FactorKind::GroupMatch => "group_match",
            FactorKind::PriorEngagement => "prior_engagement",
            FactorKind::TagAffinity => "tag_affinity",
            FactorKind::MediaAffinity => "media_affinity",
            FactorKind::ActiveHours => "active_hours",
            FactorKind::Velocity => "velocity",
            FactorKind::RecencyTier => "recency_tier",
            FactorKind::EngagementRate => "engagement_rate",
            FactorKind::Freshness => "freshness",
        }
    }
}

/// One additive score term. Zero-point terms are omitted from candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreFactor {
    pub kind: FactorKind,
    pub points: f64,
}

/// Transient scoring output; exists only within one ranking call.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item_id: Uuid,
    pub score: f64,
    pub factors: Vec<ScoreFactor>,
}

impl ScoredCandidate {
    /// Reason tags explaining the score. Informational only; never used for
    /// tie-breaking.
    pub fn reasons(&self) -> Vec<String> {
        self.factors
            .iter()
            .map(|f| f.kind.as_str().to_string())
            .collect()
    }

    pub fn factor(&self, kind: FactorKind) -> Option<f64> {
        self.factors
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.points)
    }
}

pub(crate) fn push_factor(factors: &mut Vec<ScoreFactor>, kind: FactorKind, points: f64) {
    if points > 0.0 {
        factors.push(ScoreFactor { kind, points });
    }
}

/// Age of an item in fractional hours, clamped at zero for clock skew.
pub(crate) fn hours_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_seconds().max(0) as f64 / 3600.0
}

/// Score a pool and order it for selection: score desc, then created_at desc,
/// then id asc. The explicit tie-break keeps equal-scored pools deterministic
/// across runs.
pub fn rank<F>(pool: &[ContentItem], score_fn: F) -> Vec<ScoredCandidate>
where
    F: Fn(&ContentItem) -> ScoredCandidate,
{
    let mut scored: Vec<(ScoredCandidate, DateTime<Utc>)> = pool
        .iter()
        .map(|item| (score_fn(item), item.created_at))
        .collect();

    scored.sort_by(|a, b| {
        b.0.score
            .partial_cmp(&a.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.item_id.cmp(&b.0.item_id))
    });

    scored.into_iter().map(|(candidate, _)| candidate).collect()
}
