use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RankingError;

/// Who may see a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Connections,
    Group,
    Private,
}

/// Media kind of a content item.
///
/// Declaration order doubles as the deterministic tie-break order when
/// preference tallies are equal, and as the neutral preference default
/// (image, video, carousel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Carousel,
    Text,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Carousel => "carousel",
            MediaType::Text => "text",
        }
    }
}

/// A content item as seen by the ranking engine. Never mutated here; the
/// engine only reads counters and metadata.
///
/// Counters and tags default to zero/empty on deserialization so a record
/// with absent fields scores as zero rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    /// Group/faculty tag, when the item belongs to one
    pub group_tag: Option<String>,
    pub media_type: MediaType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub share_count: u32,
    #[serde(default)]
    pub view_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

/// A follow/connection edge. Only `Accepted` edges count as social proximity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Content,
    Comment,
}

/// A historical like/comment action. Read-only signal for ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub target_type: TargetType,
    pub created_at: DateTime<Utc>,
}

/// Derived per-user preference summary. Ephemeral: recomputed on every
/// personalized ranking call, never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Up to 10 tags by descending historical frequency
    pub preferred_tags: Vec<String>,
    /// Up to 3 media types by descending historical frequency
    pub preferred_media_types: Vec<MediaType>,
}

impl PreferenceProfile {
    /// Profile for a user with no interaction history: no favored tags and
    /// no media-type exclusion.
    pub fn neutral() -> Self {
        Self {
            preferred_tags: Vec::new(),
            preferred_media_types: vec![MediaType::Image, MediaType::Video, MediaType::Carousel],
        }
    }
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    Personalized,
    Trending,
    Suggestions,
}

impl RankingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::Personalized => "personalized",
            RankingMode::Trending => "trending",
            RankingMode::Suggestions => "suggestions",
        }
    }
}

/// Trending lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "24h",
            TimeWindow::Week => "7d",
            TimeWindow::Month => "30d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Day => Duration::hours(24),
            TimeWindow::Week => Duration::days(7),
            TimeWindow::Month => Duration::days(30),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(TimeWindow::Day),
            "7d" => Ok(TimeWindow::Week),
            "30d" => Ok(TimeWindow::Month),
            other => Err(RankingError::invalid_request(format!(
                "unrecognized time window: {other}"
            ))),
        }
    }
}

/// A single ranking call.
#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub user_id: Uuid,
    pub mode: RankingMode,
    pub page: u32,
    pub page_size: u32,
    pub group_tag: Option<String>,
    pub time_window: Option<TimeWindow>,
}

impl RankingRequest {
    /// Rejects malformed requests before any I/O is attempted.
    pub fn validate(&self) -> Result<(), RankingError> {
        if self.page < 1 {
            return Err(RankingError::invalid_request("page must be >= 1"));
        }
        if self.page_size < 1 {
            return Err(RankingError::invalid_request("page size must be >= 1"));
        }
        Ok(())
    }

    /// Source offset for this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

/// Ordered page of content plus a flag telling the caller whether another
/// page is worth requesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub items: Vec<ContentItem>,
    pub has_more: bool,
}
