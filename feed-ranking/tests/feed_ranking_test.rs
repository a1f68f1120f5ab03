//! Integration tests: full ranking pipeline over in-memory stores.
//!
//! Coverage:
//! - Determinism for a fixed store snapshot
//! - Selection by score vs presentation by recency (personalized/trending)
//! - Pagination boundary for has_more
//! - Trending time-window exclusion
//! - Suggestions exclusions and score-order presentation
//! - Preference neutrality for users without history
//! - Read-through cache behavior and invalid-request short-circuit

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use feed_ranking::cache::{CacheError, FeedCache, FeedCacheKey};
use feed_ranking::error::RetrievalError;
use feed_ranking::models::{
    ContentItem, Interaction, MediaType, RankingResult, TargetType, TimeWindow, Visibility,
};
use feed_ranking::stores::{
    ContentQuery, ContentSort, ContentStore, InteractionLog, SocialGraphStore,
};
use feed_ranking::{FeedRanker, RankingConfig, RankingError};

struct InMemoryContentStore {
    items: Vec<ContentItem>,
    find_visible_calls: AtomicUsize,
}

impl InMemoryContentStore {
    fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            find_visible_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn find_visible(
        &self,
        query: &ContentQuery,
    ) -> Result<Vec<ContentItem>, RetrievalError> {
        self.find_visible_calls.fetch_add(1, Ordering::SeqCst);
        let mut matched: Vec<ContentItem> = self
            .items
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        match query.sort {
            ContentSort::CreatedAtDesc => {
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            ContentSort::EngagementDesc => {
                matched.sort_by(|a, b| {
                    b.like_count
                        .cmp(&a.like_count)
                        .then_with(|| b.comment_count.cmp(&a.comment_count))
                        .then_with(|| b.created_at.cmp(&a.created_at))
                });
            }
        }
        Ok(matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>, RetrievalError> {
        Ok(self
            .items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }
}

struct InMemoryGraph {
    accepted: HashMap<Uuid, HashSet<Uuid>>,
}

#[async_trait]
impl SocialGraphStore for InMemoryGraph {
    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<HashSet<Uuid>, RetrievalError> {
        Ok(self.accepted.get(&user_id).cloned().unwrap_or_default())
    }
}

struct InMemoryInteractions {
    log: Vec<Interaction>,
}

#[async_trait]
impl InteractionLog for InMemoryInteractions {
    async fn list_interactions(
        &self,
        user_id: Uuid,
        target_type: TargetType,
    ) -> Result<Vec<Interaction>, RetrievalError> {
        Ok(self
            .log
            .iter()
            .filter(|i| i.user_id == user_id && i.target_type == target_type)
            .cloned()
            .collect())
    }

    async fn has_interaction(
        &self,
        user_id: Uuid,
        target_id: Uuid,
        target_type: TargetType,
    ) -> Result<bool, RetrievalError> {
        Ok(self.log.iter().any(|i| {
            i.user_id == user_id && i.target_id == target_id && i.target_type == target_type
        }))
    }
}

#[derive(Default)]
struct InMemoryFeedCache {
    pages: Mutex<HashMap<String, RankingResult>>,
}

#[async_trait]
impl FeedCache for InMemoryFeedCache {
    async fn get_page(&self, key: &FeedCacheKey) -> Result<Option<RankingResult>, CacheError> {
        Ok(self.pages.lock().unwrap().get(&key.redis_key()).cloned())
    }

    async fn put_page(&self, key: &FeedCacheKey, page: &RankingResult) -> Result<(), CacheError> {
        self.pages
            .lock()
            .unwrap()
            .insert(key.redis_key(), page.clone());
        Ok(())
    }
}

fn post(author_id: Uuid, hours_ago: i64) -> ContentItem {
    ContentItem {
        id: Uuid::new_v4(),
        author_id,
        created_at: Utc::now() - Duration::hours(hours_ago),
        visibility: Visibility::Public,
        group_tag: None,
        media_type: MediaType::Image,
        tags: vec![],
        like_count: 0,
        comment_count: 0,
        share_count: 0,
        view_count: 0,
    }
}

fn like(user_id: Uuid, target_id: Uuid) -> Interaction {
    Interaction {
        user_id,
        target_id,
        target_type: TargetType::Content,
        created_at: Utc::now(),
    }
}

struct Fixture {
    ranker: FeedRanker,
    content: Arc<InMemoryContentStore>,
}

fn fixture(
    items: Vec<ContentItem>,
    accepted: HashMap<Uuid, HashSet<Uuid>>,
    log: Vec<Interaction>,
) -> Fixture {
    let content = Arc::new(InMemoryContentStore::new(items));
    let ranker = FeedRanker::new(
        content.clone(),
        Arc::new(InMemoryGraph { accepted }),
        Arc::new(InMemoryInteractions { log }),
        RankingConfig::default(),
    );
    Fixture { ranker, content }
}

fn connections(user_id: Uuid, others: &[Uuid]) -> HashMap<Uuid, HashSet<Uuid>> {
    let mut map = HashMap::new();
    map.insert(user_id, others.iter().copied().collect());
    map
}

#[tokio::test]
async fn personalized_feed_is_deterministic_for_fixed_snapshot() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let mut items = Vec::new();
    for hours_ago in [1, 3, 7, 12, 26, 40] {
        let mut item = post(friend, hours_ago);
        item.like_count = hours_ago as u32 * 3;
        item.comment_count = hours_ago as u32;
        items.push(item);
    }

    let fx = fixture(items, connections(user, &[friend]), vec![]);

    let first = fx
        .ranker
        .get_personalized_feed(user, 1, 4, None)
        .await
        .unwrap();
    let second = fx
        .ranker
        .get_personalized_feed(user, 1, 4, None)
        .await
        .unwrap();

    let first_ids: Vec<Uuid> = first.items.iter().map(|i| i.id).collect();
    let second_ids: Vec<Uuid> = second.items.iter().map(|i| i.id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(first.has_more, second.has_more);
}

#[tokio::test]
async fn personalized_presentation_is_newest_first() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    // identical counters; only age differs
    let fresh = post(friend, 1);
    let mid = post(friend, 5);
    let old = post(friend, 30);
    let expected = vec![fresh.id, mid.id, old.id];

    let fx = fixture(
        vec![old, fresh.clone(), mid.clone()],
        connections(user, &[friend]),
        vec![],
    );

    let result = fx
        .ranker
        .get_personalized_feed(user, 1, 3, None)
        .await
        .unwrap();

    let ids: Vec<Uuid> = result.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, expected);
    assert!(!result.has_more);
}

#[tokio::test]
async fn personalized_score_selects_the_cut_not_the_order() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    // Old but heavily engaged beats fresh-and-quiet on score, so it makes
    // the one-item page even though it is older.
    let mut viral = post(friend, 30);
    viral.like_count = 500;
    viral.share_count = 100;
    let quiet = post(friend, 1);

    let fx = fixture(
        vec![viral.clone(), quiet],
        connections(user, &[friend]),
        vec![],
    );

    let result = fx
        .ranker
        .get_personalized_feed(user, 1, 1, None)
        .await
        .unwrap();

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].id, viral.id);
    assert!(result.has_more);
}

#[tokio::test]
async fn has_more_is_false_when_pool_equals_page_size() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let items = vec![post(friend, 1), post(friend, 2)];
    let fx = fixture(items.clone(), connections(user, &[friend]), vec![]);

    let result = fx
        .ranker
        .get_personalized_feed(user, 1, 2, None)
        .await
        .unwrap();
    assert_eq!(result.items.len(), 2);
    assert!(!result.has_more);

    let mut more = items;
    more.push(post(friend, 3));
    let fx = fixture(more, connections(user, &[friend]), vec![]);

    let result = fx
        .ranker
        .get_personalized_feed(user, 1, 2, None)
        .await
        .unwrap();
    assert_eq!(result.items.len(), 2);
    assert!(result.has_more);
}

#[tokio::test]
async fn trending_excludes_items_outside_the_window() {
    let user = Uuid::new_v4();
    let author = Uuid::new_v4();

    let mut stale = post(author, 25);
    stale.like_count = 10_000;
    stale.view_count = 10_000;
    let mut fresh = post(author, 2);
    fresh.like_count = 3;

    let fx = fixture(vec![stale.clone(), fresh.clone()], HashMap::new(), vec![]);

    let result = fx
        .ranker
        .get_trending_feed(user, 1, 10, TimeWindow::Day)
        .await
        .unwrap();

    let ids: Vec<Uuid> = result.items.iter().map(|i| i.id).collect();
    assert!(ids.contains(&fresh.id));
    assert!(!ids.contains(&stale.id), "25h-old item must be outside the 24h window");
}

#[tokio::test]
async fn suggestions_exclude_liked_items_and_graph_authors() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let mut already_liked = post(stranger, 2);
    already_liked.like_count = 900;
    let from_friend = post(friend, 2);
    let own = post(user, 2);
    let fresh_find = post(stranger, 3);

    let fx = fixture(
        vec![
            already_liked.clone(),
            from_friend.clone(),
            own.clone(),
            fresh_find.clone(),
        ],
        connections(user, &[friend]),
        vec![like(user, already_liked.id)],
    );

    let items = fx.ranker.get_suggestions(user, 10, None).await.unwrap();
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    assert_eq!(ids, vec![fresh_find.id]);
}

#[tokio::test]
async fn suggestions_keep_score_order() {
    let user = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    // group match (+50) + freshness beats engagement-capped recency order
    let mut group_pick = post(stranger, 40);
    group_pick.group_tag = Some("engineering".into());
    group_pick.visibility = Visibility::Group;
    let mut popular = post(stranger, 1);
    popular.like_count = 20;

    let fx = fixture(
        vec![popular.clone(), group_pick.clone()],
        HashMap::new(),
        vec![],
    );

    let items = fx
        .ranker
        .get_suggestions(user, 2, Some("engineering"))
        .await
        .unwrap();
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    // 50 + 30 = 80 for the group item vs 20 + 30 = 50; score order, not recency
    assert_eq!(ids, vec![group_pick.id, popular.id]);
}

#[tokio::test]
async fn user_without_history_still_gets_a_ranked_feed() {
    let user = Uuid::new_v4();

    let mine = vec![post(user, 2), post(user, 8)];
    let expected: Vec<Uuid> = mine.iter().map(|i| i.id).collect();

    let fx = fixture(mine, HashMap::new(), vec![]);

    let result = fx
        .ranker
        .get_personalized_feed(user, 1, 5, None)
        .await
        .unwrap();
    let ids: Vec<Uuid> = result.items.iter().map(|i| i.id).collect();

    assert_eq!(ids, expected);
    assert!(!result.has_more);
}

#[tokio::test]
async fn cache_serves_second_read_without_store_calls() {
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let fx = fixture(
        vec![post(friend, 1), post(friend, 4)],
        connections(user, &[friend]),
        vec![],
    );
    let content = fx.content.clone();
    let ranker = fx.ranker.with_cache(Arc::new(InMemoryFeedCache::default()));

    let first = ranker
        .get_personalized_feed(user, 1, 2, None)
        .await
        .unwrap();
    let calls_after_first = content.find_visible_calls.load(Ordering::SeqCst);

    let second = ranker
        .get_personalized_feed(user, 1, 2, None)
        .await
        .unwrap();
    let calls_after_second = content.find_visible_calls.load(Ordering::SeqCst);

    assert_eq!(first, second);
    assert_eq!(calls_after_first, 1);
    assert_eq!(calls_after_second, 1, "second page must come from the cache");
}

#[tokio::test]
async fn invalid_requests_never_reach_the_stores() {
    let user = Uuid::new_v4();
    let fx = fixture(vec![post(user, 1)], HashMap::new(), vec![]);

    let err = fx
        .ranker
        .get_personalized_feed(user, 0, 20, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RankingError::InvalidRequest(_)));

    let err = fx
        .ranker
        .get_trending_feed(user, 1, 0, TimeWindow::Month)
        .await
        .unwrap_err();
    assert!(matches!(err, RankingError::InvalidRequest(_)));

    assert_eq!(fx.content.find_visible_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn trending_presentation_is_newest_first() {
    let user = Uuid::new_v4();
    let author = Uuid::new_v4();

    let mut hot_but_older = post(author, 10);
    hot_but_older.like_count = 300;
    hot_but_older.comment_count = 80;
    hot_but_older.view_count = 400;
    let mut warm_and_fresh = post(author, 1);
    warm_and_fresh.like_count = 40;
    warm_and_fresh.view_count = 100;

    let fx = fixture(
        vec![hot_but_older.clone(), warm_and_fresh.clone()],
        HashMap::new(),
        vec![],
    );

    let result = fx
        .ranker
        .get_trending_feed(user, 1, 2, TimeWindow::Day)
        .await
        .unwrap();
    let ids: Vec<Uuid> = result.items.iter().map(|i| i.id).collect();

    // both make the cut; the page itself is reverse-chronological
    assert_eq!(ids, vec![warm_and_fresh.id, hot_but_older.id]);
}
