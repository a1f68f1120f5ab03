pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod stores;

pub use config::RankingConfig;
pub use error::{RankingError, Result, RetrievalError};
pub use models::{
    ContentItem, MediaType, PreferenceProfile, RankingMode, RankingRequest, RankingResult,
    TimeWindow, Visibility,
};
pub use services::{CandidateRetriever, FeedRanker, PreferenceEngine};
