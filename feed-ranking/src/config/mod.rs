use std::env;

use serde::Deserialize;

/// Engine configuration.
///
/// Scoring weights are behavioral contracts and deliberately not
/// configurable; only pool sizing and the optional cache live here.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
}

/// Per-mode overfetch factors: the candidate pool handed to the scorer is
/// `page_size * factor` so re-ranking has material to work with.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub personalized_overfetch: u32,
    pub trending_overfetch: u32,
    pub suggestions_overfetch: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub url: String,
    pub ttl_seconds: u64,
    pub enabled: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            personalized_overfetch: 3,
            trending_overfetch: 3,
            suggestions_overfetch: 2,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            ttl_seconds: 60,
            enabled: false,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl RankingConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            retrieval: RetrievalConfig {
                personalized_overfetch: env::var("RANKING_PERSONALIZED_OVERFETCH")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .expect("RANKING_PERSONALIZED_OVERFETCH must be a valid u32"),
                trending_overfetch: env::var("RANKING_TRENDING_OVERFETCH")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .expect("RANKING_TRENDING_OVERFETCH must be a valid u32"),
                suggestions_overfetch: env::var("RANKING_SUGGESTIONS_OVERFETCH")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .expect("RANKING_SUGGESTIONS_OVERFETCH must be a valid u32"),
            },
            cache: CacheConfig {
                url: env::var("FEED_CACHE_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                ttl_seconds: env::var("FEED_CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("FEED_CACHE_TTL_SECONDS must be a valid u64"),
                enabled: env::var("FEED_CACHE_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .expect("FEED_CACHE_ENABLED must be true or false"),
            },
        }
    }
}
