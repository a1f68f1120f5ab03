pub mod feed;
pub mod preferences;
pub mod retrieval;
pub mod scoring;

pub use feed::FeedRanker;
pub use preferences::PreferenceEngine;
pub use retrieval::{CandidateRetriever, PersonalizedPool};
