//! Candidate retrieval: builds the per-mode content query and over-fetches
//! the pool the scorer re-ranks.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::models::{ContentItem, RankingRequest, TargetType, TimeWindow, Visibility};
use crate::stores::{ContentQuery, ContentSort, ContentStore, InteractionLog, SocialGraphStore};

/// Personalized candidate pool plus the connection set it was built from,
/// so the scorer reuses the same social-graph snapshot.
#[derive(Debug)]
pub struct PersonalizedPool {
    pub candidates: Vec<ContentItem>,
    pub connections: HashSet<Uuid>,
}

pub struct CandidateRetriever {
    content: Arc<dyn ContentStore>,
    graph: Arc<dyn SocialGraphStore>,
    interactions: Arc<dyn InteractionLog>,
    config: RetrievalConfig,
}

impl CandidateRetriever {
    pub fn new(
        content: Arc<dyn ContentStore>,
        graph: Arc<dyn SocialGraphStore>,
        interactions: Arc<dyn InteractionLog>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            content,
            graph,
            interactions,
            config,
        }
    }

    /// Items authored by the viewer or an accepted connection, visible to the
    /// viewer, newest first at the source.
    pub async fn personalized_pool(&self, request: &RankingRequest) -> Result<PersonalizedPool> {
        let connections = self
            .graph
            .list_accepted_connections(request.user_id)
            .await?;

        let mut authors = connections.clone();
        authors.insert(request.user_id);

        let mut visibility = vec![Visibility::Public, Visibility::Connections];
        if request.group_tag.is_some() {
            visibility.push(Visibility::Group);
        }

        let query = ContentQuery {
            authors: Some(authors),
            visibility,
            group_tag: request.group_tag.clone(),
            sort: ContentSort::CreatedAtDesc,
            offset: request.offset(),
            limit: request.page_size as usize * self.config.personalized_overfetch as usize,
            ..Default::default()
        };

        let candidates = self.content.find_visible(&query).await?;
        debug!(
            user_id = %request.user_id,
            pool = candidates.len(),
            connections = connections.len(),
            "Personalized candidates fetched"
        );

        Ok(PersonalizedPool {
            candidates,
            connections,
        })
    }

    /// Public and group items created inside the window, newest first at the
    /// source. No social-graph filter.
    pub async fn trending_pool(
        &self,
        request: &RankingRequest,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>> {
        let query = ContentQuery {
            visibility: vec![Visibility::Public, Visibility::Group],
            created_after: Some(now - window.duration()),
            sort: ContentSort::CreatedAtDesc,
            offset: request.offset(),
            limit: request.page_size as usize * self.config.trending_overfetch as usize,
            ..Default::default()
        };

        let candidates = self.content.find_visible(&query).await?;
        debug!(
            window = window.as_str(),
            pool = candidates.len(),
            "Trending candidates fetched"
        );

        Ok(candidates)
    }

    /// Items from outside the viewer's graph that the viewer has not already
    /// liked, biased toward plausible successes by the source's engagement
    /// sort.
    pub async fn suggestion_pool(
        &self,
        user_id: Uuid,
        group_tag: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ContentItem>> {
        let (connections, liked) = tokio::try_join!(
            async {
                self.graph
                    .list_accepted_connections(user_id)
                    .await
                    .map_err(crate::error::RankingError::from)
            },
            self.liked_content(user_id),
        )?;

        let mut exclude_authors = connections;
        exclude_authors.insert(user_id);

        let query = ContentQuery {
            exclude_authors,
            exclude_ids: liked,
            visibility: vec![Visibility::Public, Visibility::Group],
            group_tag: group_tag.map(String::from),
            sort: ContentSort::EngagementDesc,
            limit: limit as usize * self.config.suggestions_overfetch as usize,
            ..Default::default()
        };

        let candidates = self.content.find_visible(&query).await?;
        debug!(
            %user_id,
            pool = candidates.len(),
            "Suggestion candidates fetched"
        );

        Ok(candidates)
    }

    /// Content ids the user already interacted with.
    pub async fn liked_content(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let history = self
            .interactions
            .list_interactions(user_id, TargetType::Content)
            .await?;
        Ok(history.into_iter().map(|i| i.target_id).collect())
    }
}
