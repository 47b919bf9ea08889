//! Read-only access to the learning records the engine consumes.
//!
//! The engine owns none of this data; it is a pure read path over records
//! supplied by the surrounding system (catalog, quiz history, engagement
//! logs, assessment results). Implementations must be safe to share across
//! concurrent engine instances.

use crate::{
    error::AppResult,
    models::{AssessmentResult, Course, CourseId, Engagement, QuizPerformance, StudentId},
};

pub mod memory;

pub use memory::InMemoryStore;

/// Trait for learning-record stores
///
/// All methods are reads; the engine never writes. `catalog_revision` is a
/// monotonically increasing token bumped on any course mutation, used to
/// invalidate cached knowledge graphs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LearningStore: Send + Sync {
    /// All courses in the catalog, in stored order
    async fn courses(&self) -> AppResult<Vec<Course>>;

    /// Resolves course ids to records, preserving the order of `ids`.
    /// Unknown ids are skipped.
    async fn courses_by_ids(&self, ids: Vec<CourseId>) -> AppResult<Vec<Course>>;

    /// All quiz-performance records across all students
    async fn quiz_performances(&self) -> AppResult<Vec<QuizPerformance>>;

    /// Quiz-performance records for one student
    async fn quiz_performances_for(&self, student_id: StudentId)
        -> AppResult<Vec<QuizPerformance>>;

    /// All engagement records across all students
    async fn engagements(&self) -> AppResult<Vec<Engagement>>;

    /// The first assessment result recorded for a student, if any
    async fn assessment_for(&self, student_id: StudentId) -> AppResult<Option<AssessmentResult>>;

    /// Catalog revision token; changes whenever courses are added or edited
    async fn catalog_revision(&self) -> AppResult<u64>;
}
