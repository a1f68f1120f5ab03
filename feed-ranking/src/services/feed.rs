//! Ranking orchestrator: one stateless pipeline per request.
//!
//! validate -> cache lookup -> concurrent store fetches -> score -> sort ->
//! select top N -> re-hydrate -> presentation order -> cache fill. A failed
//! step surfaces its error; only the cache degrades silently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{FeedCache, FeedCacheKey};
use crate::config::RankingConfig;
use crate::error::{RankingError, Result};
use crate::models::{ContentItem, RankingMode, RankingRequest, RankingResult, TimeWindow};
use crate::services::preferences::PreferenceEngine;
use crate::services::retrieval::{CandidateRetriever, PersonalizedPool};
use crate::services::scoring::{self, personalized, suggestions, trending, ScoredCandidate};
use crate::stores::{ContentStore, InteractionLog, SocialGraphStore};

/// Final ordering of a returned page.
///
/// Personalized and trending feeds re-sort the selected items by recency
/// (the score only decides which items make the cut); suggestions keep score
/// order. The asymmetry is contractual.
enum Presentation {
    RecencyDesc,
    ScoreOrder,
}

pub struct FeedRanker {
    content: Arc<dyn ContentStore>,
    retriever: CandidateRetriever,
    preferences: PreferenceEngine,
    cache: Option<Arc<dyn FeedCache>>,
}

impl FeedRanker {
    pub fn new(
        content: Arc<dyn ContentStore>,
        graph: Arc<dyn SocialGraphStore>,
        interactions: Arc<dyn InteractionLog>,
        config: RankingConfig,
    ) -> Self {
        let retriever = CandidateRetriever::new(
            content.clone(),
            graph,
            interactions.clone(),
            config.retrieval,
        );
        let preferences = PreferenceEngine::new(content.clone(), interactions);
        Self {
            content,
            retriever,
            preferences,
            cache: None,
        }
    }

    /// Attach an optional read-through page cache. Ranking stays correct
    /// without one; cache failures degrade to a live computation.
    pub fn with_cache(mut self, cache: Arc<dyn FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Personalized relevance feed: social-graph candidates re-ranked by the
    /// viewer's preferences, presented newest first.
    pub async fn get_personalized_feed(
        &self,
        user_id: Uuid,
        page: u32,
        page_size: u32,
        group_tag: Option<&str>,
    ) -> Result<RankingResult> {
        let request = RankingRequest {
            user_id,
            mode: RankingMode::Personalized,
            page,
            page_size,
            group_tag: group_tag.map(String::from),
            time_window: None,
        };
        request.validate()?;

        let key = FeedCacheKey::from_request(&request);
        if let Some(hit) = self.cache_lookup(&key).await {
            return Ok(hit);
        }

        let now = Utc::now();
        let (pool, preferences, liked) = tokio::try_join!(
            self.retriever.personalized_pool(&request),
            self.preferences.infer(user_id),
            self.retriever.liked_content(user_id),
        )?;
        let PersonalizedPool {
            candidates,
            connections,
        } = pool;

        let ctx = personalized::PersonalizedContext {
            user_id,
            connections,
            liked,
            group_tag: request.group_tag.clone(),
            preferences,
        };
        let ranked = scoring::rank(&candidates, |item| personalized::score(item, &ctx, now));
        let has_more = candidates.len() > page_size as usize;

        let winners = &ranked[..ranked.len().min(page_size as usize)];
        let items = self.rehydrate(winners, Presentation::RecencyDesc).await?;

        info!(
            %user_id,
            mode = "personalized",
            pool = candidates.len(),
            returned = items.len(),
            "Feed ranked"
        );

        let result = RankingResult { items, has_more };
        self.cache_fill(&key, &result).await;
        Ok(result)
    }

    /// Time-windowed trending feed: fast-rising public/group content,
    /// presented newest first.
    pub async fn get_trending_feed(
        &self,
        user_id: Uuid,
        page: u32,
        page_size: u32,
        time_window: TimeWindow,
    ) -> Result<RankingResult> {
        let request = RankingRequest {
            user_id,
            mode: RankingMode::Trending,
            page,
            page_size,
            group_tag: None,
            time_window: Some(time_window),
        };
        request.validate()?;

        let key = FeedCacheKey::from_request(&request);
        if let Some(hit) = self.cache_lookup(&key).await {
            return Ok(hit);
        }

        let now = Utc::now();
        let candidates = self.retriever.trending_pool(&request, time_window, now).await?;

        let ranked = scoring::rank(&candidates, |item| trending::score(item, now));
        let has_more = candidates.len() > page_size as usize;

        let winners = &ranked[..ranked.len().min(page_size as usize)];
        let items = self.rehydrate(winners, Presentation::RecencyDesc).await?;

        info!(
            %user_id,
            mode = "trending",
            window = time_window.as_str(),
            pool = candidates.len(),
            returned = items.len(),
            "Feed ranked"
        );

        let result = RankingResult { items, has_more };
        self.cache_fill(&key, &result).await;
        Ok(result)
    }

    /// Cold-start suggestions: best-match content from outside the viewer's
    /// graph, returned in score order.
    pub async fn get_suggestions(
        &self,
        user_id: Uuid,
        limit: u32,
        group_tag: Option<&str>,
    ) -> Result<Vec<ContentItem>> {
        let request = RankingRequest {
            user_id,
            mode: RankingMode::Suggestions,
            page: 1,
            page_size: limit,
            group_tag: group_tag.map(String::from),
            time_window: None,
        };
        request.validate()?;

        let key = FeedCacheKey::from_request(&request);
        if let Some(hit) = self.cache_lookup(&key).await {
            return Ok(hit.items);
        }

        let now = Utc::now();
        let candidates = self
            .retriever
            .suggestion_pool(user_id, group_tag, limit)
            .await?;

        let ctx = suggestions::SuggestionContext {
            group_tag: group_tag.map(String::from),
        };
        let ranked = scoring::rank(&candidates, |item| suggestions::score(item, &ctx, now));

        let winners = &ranked[..ranked.len().min(limit as usize)];
        let items = self.rehydrate(winners, Presentation::ScoreOrder).await?;

        info!(
            %user_id,
            mode = "suggestions",
            pool = candidates.len(),
            returned = items.len(),
            "Suggestions ranked"
        );

        let result = RankingResult {
            items: items.clone(),
            has_more: false,
        };
        self.cache_fill(&key, &result).await;
        Ok(items)
    }

    /// Re-fetch the winning ids as full records and apply the presentation
    /// order. Ids that no longer resolve are dropped from the page.
    async fn rehydrate(
        &self,
        winners: &[ScoredCandidate],
        order: Presentation,
    ) -> Result<Vec<ContentItem>> {
        if winners.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = winners.iter().map(|c| c.item_id).collect();
        let mut items = self
            .content
            .find_by_ids(&ids)
            .await
            .map_err(RankingError::from)?;

        if items.len() < ids.len() {
            warn!(
                requested = ids.len(),
                resolved = items.len(),
                "Some ranked items did not re-hydrate"
            );
        }

        match order {
            Presentation::RecencyDesc => {
                items.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then_with(|| a.id.cmp(&b.id))
                });
            }
            Presentation::ScoreOrder => {
                let position: HashMap<Uuid, usize> =
                    ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
                items.sort_by_key(|item| position.get(&item.id).copied().unwrap_or(usize::MAX));
            }
        }

        Ok(items)
    }

    async fn cache_lookup(&self, key: &FeedCacheKey) -> Option<RankingResult> {
        let cache = self.cache.as_ref()?;
        match cache.get_page(key).await {
            Ok(Some(page)) => {
                debug!(key = %key.redis_key(), "Feed cache hit");
                Some(page)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Feed cache read failed: {e}");
                None
            }
        }
    }

    async fn cache_fill(&self, key: &FeedCacheKey, page: &RankingResult) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_page(key, page).await {
                warn!("Feed cache write failed: {e}");
            }
        }
    }
}
