use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{AssessmentResult, Course, CourseId, Engagement, QuizPerformance, StudentId},
};

use super::LearningStore;

/// In-memory learning store
///
/// Backs the demo binary and the integration tests. Writers exist only so
/// callers can seed data; the engine itself only reads.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    courses: Vec<Course>,
    course_index: HashMap<CourseId, usize>,
    performances: Vec<QuizPerformance>,
    engagements: Vec<Engagement>,
    assessments: Vec<AssessmentResult>,
    catalog_revision: u64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }

    pub async fn add_course(&self, course: Course) {
        let mut inner = self.inner.write().await;
        let slot = inner.courses.len();
        inner.course_index.insert(course.id, slot);
        inner.courses.push(course);
        inner.catalog_revision += 1;
    }

    pub async fn add_performance(&self, performance: QuizPerformance) {
        self.inner.write().await.performances.push(performance);
    }

    pub async fn add_engagement(&self, engagement: Engagement) {
        self.inner.write().await.engagements.push(engagement);
    }

    pub async fn add_assessment(&self, assessment: AssessmentResult) {
        self.inner.write().await.assessments.push(assessment);
    }
}

#[async_trait::async_trait]
impl LearningStore for InMemoryStore {
    async fn courses(&self) -> AppResult<Vec<Course>> {
        Ok(self.inner.read().await.courses.clone())
    }

    async fn courses_by_ids(&self, ids: Vec<CourseId>) -> AppResult<Vec<Course>> {
        let inner = self.inner.read().await;
        Ok(ids
            .into_iter()
            .filter_map(|id| inner.course_index.get(&id).map(|&i| inner.courses[i].clone()))
            .collect())
    }

    async fn quiz_performances(&self) -> AppResult<Vec<QuizPerformance>> {
        Ok(self.inner.read().await.performances.clone())
    }

    async fn quiz_performances_for(
        &self,
        student_id: StudentId,
    ) -> AppResult<Vec<QuizPerformance>> {
        let inner = self.inner.read().await;
        Ok(inner
            .performances
            .iter()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn engagements(&self) -> AppResult<Vec<Engagement>> {
        Ok(self.inner.read().await.engagements.clone())
    }

    async fn assessment_for(&self, student_id: StudentId) -> AppResult<Option<AssessmentResult>> {
        let inner = self.inner.read().await;
        Ok(inner
            .assessments
            .iter()
            .find(|a| a.student_id == student_id)
            .cloned())
    }

    async fn catalog_revision(&self) -> AppResult<u64> {
        Ok(self.inner.read().await.catalog_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_courses_by_ids_preserves_order_and_skips_unknown() {
        let store = InMemoryStore::new();
        let c1 = Course::new("Rust", "Systems", "rust");
        let c2 = Course::new("Web", "Frontend", "web");
        store.add_course(c1.clone()).await;
        store.add_course(c2.clone()).await;

        let resolved = store
            .courses_by_ids(vec![c2.id, CourseId::new(), c1.id])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, c2.id);
        assert_eq!(resolved[1].id, c1.id);
    }

    #[tokio::test]
    async fn test_catalog_revision_bumps_on_course_add() {
        let store = InMemoryStore::new();
        assert_eq!(store.catalog_revision().await.unwrap(), 0);

        store.add_course(Course::new("Rust", "Systems", "rust")).await;
        assert_eq!(store.catalog_revision().await.unwrap(), 1);

        // Non-catalog writes leave the revision untouched
        store
            .add_performance(QuizPerformance {
                student_id: StudentId::new(),
                course_id: CourseId::new(),
                score: 80,
                time_spent_seconds: 120,
                recorded_at: Utc::now(),
            })
            .await;
        assert_eq!(store.catalog_revision().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_assessment_for_returns_first_found() {
        let store = InMemoryStore::new();
        let student = StudentId::new();

        let first = AssessmentResult {
            student_id: student,
            total_score: 70,
            skill_scores: Default::default(),
            recommended_courses: vec![],
            learning_level: Default::default(),
            recorded_at: Utc::now(),
        };
        let mut second = first.clone();
        second.total_score = 90;

        store.add_assessment(first.clone()).await;
        store.add_assessment(second).await;

        let found = store.assessment_for(student).await.unwrap().unwrap();
        assert_eq!(found.total_score, 70);
    }
}
