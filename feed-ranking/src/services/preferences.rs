//! Preference inference: a lightweight per-user profile derived from the
//! interaction history.
//!
//! Pure function of interaction + content lookups; nothing is cached or
//! persisted here, so two concurrent calls for different users never
//! interfere.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{MediaType, PreferenceProfile, TargetType};
use crate::stores::{ContentStore, InteractionLog};

/// Profile width limits.
pub const MAX_PREFERRED_TAGS: usize = 10;
pub const MAX_PREFERRED_MEDIA_TYPES: usize = 3;

pub struct PreferenceEngine {
    content: Arc<dyn ContentStore>,
    interactions: Arc<dyn InteractionLog>,
}

impl PreferenceEngine {
    pub fn new(content: Arc<dyn ContentStore>, interactions: Arc<dyn InteractionLog>) -> Self {
        Self {
            content,
            interactions,
        }
    }

    /// Derive the viewer's preferred tags and media types from their content
    /// interactions. A user with no history (or whose referenced items no
    /// longer resolve) gets the neutral profile.
    ///
    /// An item referenced by several interactions is tallied once per
    /// interaction. Ties break by ascending tag string, and by the media-type
    /// declaration order, so the profile is stable across runs.
    pub async fn infer(&self, user_id: Uuid) -> Result<PreferenceProfile> {
        let history = self
            .interactions
            .list_interactions(user_id, TargetType::Content)
            .await?;

        if history.is_empty() {
            return Ok(PreferenceProfile::neutral());
        }

        let ids: Vec<Uuid> = history
            .iter()
            .map(|i| i.target_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let items = self.content.find_by_ids(&ids).await?;
        if items.is_empty() {
            return Ok(PreferenceProfile::neutral());
        }

        let by_id: HashMap<Uuid, _> = items.iter().map(|item| (item.id, item)).collect();

        let mut tag_counts: HashMap<&str, u32> = HashMap::new();
        let mut media_counts: HashMap<MediaType, u32> = HashMap::new();
        for interaction in &history {
            if let Some(item) = by_id.get(&interaction.target_id) {
                for tag in &item.tags {
                    *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
                }
                *media_counts.entry(item.media_type).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<(&str, u32)> = tag_counts.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let preferred_tags = tags
            .into_iter()
            .take(MAX_PREFERRED_TAGS)
            .map(|(tag, _)| tag.to_string())
            .collect();

        let mut media: Vec<(MediaType, u32)> = media_counts.into_iter().collect();
        media.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let preferred_media_types = media
            .into_iter()
            .take(MAX_PREFERRED_MEDIA_TYPES)
            .map(|(media_type, _)| media_type)
            .collect();

        let profile = PreferenceProfile {
            preferred_tags,
            preferred_media_types,
        };

        debug!(
            %user_id,
            interactions = history.len(),
            tags = profile.preferred_tags.len(),
            media_types = profile.preferred_media_types.len(),
            "Inferred preference profile"
        );

        Ok(profile)
    }
}
