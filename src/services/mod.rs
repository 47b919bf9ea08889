//! Recommendation filters and the hybrid entry point.
//!
//! Each filter is an independent signal source over the same read-only
//! records; [`recommender::Recommender`] combines them and enforces the
//! engine-wide guarantee that every call returns a list, never an error.

pub mod collaborative;
pub mod content_based;
pub mod knowledge_graph;
pub mod recommender;

pub use recommender::Recommender;

use crate::{error::AppResult, models::Course, store::LearningStore};

/// Weak, always-available default: the first `count` catalog courses in
/// stored order. Returned whenever a filter lacks signal or fails.
pub(crate) async fn fallback_recommendations(
    store: &dyn LearningStore,
    count: usize,
) -> AppResult<Vec<Course>> {
    let mut courses = store.courses().await?;
    courses.truncate(count);
    Ok(courses)
}
