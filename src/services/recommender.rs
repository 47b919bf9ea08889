//! Hybrid recommendation entry point.
//!
//! [`Recommender`] is the engine facade: it owns the store handle, the
//! tuning config, and a knowledge graph built at construction. Every
//! public method is total — filter errors are caught here, logged, and
//! converted to the fallback list, so callers always receive a list.

use std::sync::Arc;
use std::time::Instant;

use crate::{
    config::RecommenderConfig,
    error::AppResult,
    graph::{GraphCache, KnowledgeGraph},
    models::{Course, CourseId, StudentId},
    store::LearningStore,
};

use super::{collaborative, content_based, fallback_recommendations, knowledge_graph};

/// Course recommendation engine
///
/// Cheap to create and intended to be short-lived (one per request).
/// Concurrent instances share no mutable state; each works on an
/// independently fetched snapshot of the records.
pub struct Recommender {
    store: Arc<dyn LearningStore>,
    config: RecommenderConfig,
    graph: Arc<KnowledgeGraph>,
}

impl Recommender {
    /// Creates an engine, building a fresh knowledge graph from the
    /// current catalog.
    pub async fn new(store: Arc<dyn LearningStore>, config: RecommenderConfig) -> AppResult<Self> {
        let courses = store.courses().await?;
        let graph = Arc::new(KnowledgeGraph::build(&courses));
        Ok(Self {
            store,
            config,
            graph,
        })
    }

    /// Creates an engine that shares a revision-keyed graph cache,
    /// skipping the rebuild while the catalog is unchanged.
    pub async fn with_cache(
        store: Arc<dyn LearningStore>,
        config: RecommenderConfig,
        cache: &GraphCache,
    ) -> AppResult<Self> {
        let graph = cache.graph_for(store.as_ref()).await?;
        Ok(Self {
            store,
            config,
            graph,
        })
    }

    /// Hybrid recommendations: collaborative results first, then
    /// content-based, deduplicated by course id preserving first-seen
    /// order, truncated to `limit`.
    ///
    /// The knowledge-graph signal is deliberately not folded in here;
    /// callers wanting it use [`Recommender::knowledge_graph`] directly.
    pub async fn recommend(&self, student_id: StudentId, limit: usize) -> Vec<Course> {
        let start = Instant::now();

        let collab = self.collaborative(student_id, limit).await;
        let content = self.content_based(student_id, limit).await;
        let merged = merge_dedup(collab.into_iter().chain(content), limit);

        tracing::info!(
            student = %student_id,
            count = merged.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Hybrid recommendations complete"
        );

        merged
    }

    /// Peer-similarity signal; thresholds come from the config
    pub async fn collaborative(&self, student_id: StudentId, limit: usize) -> Vec<Course> {
        let result =
            collaborative::recommendations(self.store.as_ref(), &self.config, student_id, limit)
                .await;
        self.guard(result, "collaborative").await
    }

    /// Tag-affinity signal
    pub async fn content_based(&self, student_id: StudentId, limit: usize) -> Vec<Course> {
        let result =
            content_based::recommendations(self.store.as_ref(), &self.config, student_id, limit)
                .await;
        self.guard(result, "content_based").await
    }

    /// Skill-graph signal, exposed as an independent fourth source
    pub async fn knowledge_graph(&self, student_id: StudentId, limit: usize) -> Vec<Course> {
        let result = knowledge_graph::recommendations(
            self.store.as_ref(),
            &self.graph,
            &self.config,
            student_id,
            limit,
        )
        .await;
        self.guard(result, "knowledge_graph").await
    }

    /// Converts a filter failure into the fallback list. If even the
    /// fallback read fails the result is an empty list, never an error.
    async fn guard(&self, result: AppResult<Vec<Course>>, filter: &str) -> Vec<Course> {
        match result {
            Ok(courses) => courses,
            Err(e) => {
                tracing::warn!(filter, error = %e, "Filter failed, using fallback");
                match fallback_recommendations(self.store.as_ref(), self.config.fallback_count)
                    .await
                {
                    Ok(courses) => courses,
                    Err(e) => {
                        tracing::error!(filter, error = %e, "Fallback fetch failed");
                        Vec::new()
                    }
                }
            }
        }
    }
}

/// Deduplicates by course id, keeping the first occurrence, and truncates
/// to `limit`.
fn merge_dedup(courses: impl Iterator<Item = Course>, limit: usize) -> Vec<Course> {
    let mut seen: std::collections::HashSet<CourseId> = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for course in courses {
        if seen.insert(course.id) {
            merged.push(course);
            if merged.len() == limit {
                break;
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::MockLearningStore;

    fn catalog(n: usize) -> Vec<Course> {
        (0..n)
            .map(|i| Course::new(&format!("Course {i}"), "desc", "python"))
            .collect()
    }

    #[test]
    fn test_merge_dedup_keeps_first_occurrence() {
        let courses = catalog(3);
        let duplicated = vec![
            courses[0].clone(),
            courses[1].clone(),
            courses[0].clone(),
            courses[2].clone(),
        ];

        let merged = merge_dedup(duplicated.into_iter(), 10);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, courses[0].id);
        assert_eq!(merged[1].id, courses[1].id);
        assert_eq!(merged[2].id, courses[2].id);
    }

    #[test]
    fn test_merge_dedup_truncates_to_limit() {
        let merged = merge_dedup(catalog(5).into_iter(), 2);
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_error_becomes_fallback() {
        let courses = catalog(7);
        let mut store = MockLearningStore::new();

        // Same catalog serves the graph build and the fallback read
        let for_store = courses.clone();
        store
            .expect_courses()
            .returning(move || Ok(for_store.clone()));
        store
            .expect_quiz_performances()
            .returning(|| Err(AppError::Store("connection reset".to_string())));

        let engine = Recommender::new(Arc::new(store), RecommenderConfig::default())
            .await
            .unwrap();

        let recs = engine.collaborative(StudentId::new(), 10).await;
        // Fallback: first 5 catalog courses in stored order
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].id, courses[0].id);
        assert_eq!(recs[4].id, courses[4].id);
    }

    #[tokio::test]
    async fn test_total_failure_yields_empty_list_not_error() {
        let mut store = MockLearningStore::new();
        store
            .expect_courses()
            .times(1)
            .returning(|| Ok(Vec::new()));
        store
            .expect_quiz_performances()
            .returning(|| Err(AppError::Store("down".to_string())));
        store
            .expect_courses()
            .returning(|| Err(AppError::Store("still down".to_string())));

        let engine = Recommender::new(Arc::new(store), RecommenderConfig::default())
            .await
            .unwrap();

        let recs = engine.collaborative(StudentId::new(), 5).await;
        assert!(recs.is_empty());
    }
}
