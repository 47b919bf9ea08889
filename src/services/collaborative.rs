//! Collaborative filtering over peer similarity.
//!
//! Builds a student×course score matrix from quiz history, finds the
//! requesting student's nearest peers by cosine similarity, and surfaces
//! the courses those peers scored well on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    config::RecommenderConfig,
    error::AppResult,
    models::{CompletionStatus, Course, CourseId, Engagement, QuizPerformance, StudentId},
    store::LearningStore,
};

use super::fallback_recommendations;

/// Dense student×course score matrix
///
/// A cell holds the mean of the student's raw quiz scores on that course
/// (repeated attempts are averaged), plus `engagement_weight` times the
/// engagement factor for the pair. With the default weight of zero the
/// matrix is raw scores only. Missing entries are 0.
pub struct ScoreMatrix {
    students: Vec<StudentId>,
    courses: Vec<CourseId>,
    student_index: HashMap<StudentId, usize>,
    rows: Vec<Vec<f64>>,
}

impl ScoreMatrix {
    pub fn build(
        performances: &[QuizPerformance],
        engagements: &[Engagement],
        engagement_weight: f64,
    ) -> Self {
        // Sorted id sets give every build the same row/column order.
        let students: Vec<StudentId> = performances
            .iter()
            .map(|p| p.student_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let courses: Vec<CourseId> = performances
            .iter()
            .map(|p| p.course_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let student_index: HashMap<StudentId, usize> =
            students.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let course_index: HashMap<CourseId, usize> =
            courses.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        // Average repeated attempts per (student, course)
        let mut sums: BTreeMap<(StudentId, CourseId), (f64, u32)> = BTreeMap::new();
        for perf in performances {
            let entry = sums.entry((perf.student_id, perf.course_id)).or_insert((0.0, 0));
            entry.0 += f64::from(perf.score);
            entry.1 += 1;
        }

        let mut rows = vec![vec![0.0; courses.len()]; students.len()];
        for ((student, course), (total, count)) in &sums {
            let mut cell = total / f64::from(*count);
            if engagement_weight != 0.0 {
                cell += engagement_weight * engagement_factor(engagements, *student, *course);
            }
            rows[student_index[student]][course_index[course]] = cell;
        }

        Self {
            students,
            courses,
            student_index,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn row(&self, student: StudentId) -> Option<&[f64]> {
        self.student_index
            .get(&student)
            .map(|&i| self.rows[i].as_slice())
    }

    pub fn students(&self) -> &[StudentId] {
        &self.students
    }

    /// Course ids with a cell above `threshold` in the given student's row
    pub fn courses_above(&self, student: StudentId, threshold: f64) -> Vec<CourseId> {
        match self.row(student) {
            Some(row) => self
                .courses
                .iter()
                .zip(row)
                .filter(|(_, &score)| score > threshold)
                .map(|(&course, _)| course)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Engagement factor for a student-course pair: engagement hours times
/// the fraction of the pair's engagement rows marked completed. Zero
/// when the pair has no engagement rows.
pub fn engagement_factor(
    engagements: &[Engagement],
    student: StudentId,
    course: CourseId,
) -> f64 {
    let rows: Vec<&Engagement> = engagements
        .iter()
        .filter(|e| e.student_id == student && e.course_id == course)
        .collect();
    if rows.is_empty() {
        return 0.0;
    }

    let total_seconds: u64 = rows.iter().map(|e| u64::from(e.time_spent_seconds)).sum();
    let completed = rows
        .iter()
        .filter(|e| e.completion_status == CompletionStatus::Completed)
        .count();
    let completion_rate = completed as f64 / rows.len() as f64;

    (total_seconds as f64 / 3600.0) * completion_rate
}

/// Cosine similarity between two equal-length score vectors.
/// Zero vectors have similarity 0 with everything.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Recommends courses favored by the student's most similar peers.
///
/// Returns the fallback list when no quiz history exists anywhere or the
/// requesting student has none. Internal errors propagate; the engine
/// boundary converts them to the fallback.
pub async fn recommendations(
    store: &dyn LearningStore,
    config: &RecommenderConfig,
    student_id: StudentId,
    limit: usize,
) -> AppResult<Vec<Course>> {
    let performances = store.quiz_performances().await?;
    if performances.is_empty() {
        tracing::debug!(student = %student_id, "No quiz history anywhere, using fallback");
        return fallback_recommendations(store, config.fallback_count).await;
    }

    let engagements = store.engagements().await?;
    let matrix = ScoreMatrix::build(&performances, &engagements, config.engagement_weight);

    let Some(student_row) = matrix.row(student_id) else {
        tracing::debug!(student = %student_id, "Student absent from score matrix, using fallback");
        return fallback_recommendations(store, config.fallback_count).await;
    };
    let student_row = student_row.to_vec();

    // Rank peers by similarity, most similar first; ties break on id so
    // repeated runs select the same peers.
    let mut peers: Vec<(StudentId, f64)> = matrix
        .students()
        .iter()
        .filter(|&&other| other != student_id)
        .map(|&other| {
            let similarity = cosine_similarity(&student_row, matrix.row(other).unwrap_or(&[]));
            (other, similarity)
        })
        .collect();
    peers.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut candidates: BTreeSet<CourseId> = BTreeSet::new();
    for (peer, similarity) in peers.into_iter().take(config.peer_count) {
        if similarity > config.min_peer_similarity {
            candidates.extend(matrix.courses_above(peer, config.peer_score_threshold));
        }
    }

    // Any attempted course is excluded, regardless of score
    let attempted: BTreeSet<CourseId> = performances
        .iter()
        .filter(|p| p.student_id == student_id)
        .map(|p| p.course_id)
        .collect();

    let selected: Vec<CourseId> = candidates
        .into_iter()
        .filter(|c| !attempted.contains(c))
        .take(limit)
        .collect();

    tracing::debug!(
        student = %student_id,
        candidates = selected.len(),
        "Collaborative filtering complete"
    );

    store.courses_by_ids(selected).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn perf(student: StudentId, course: CourseId, score: u32) -> QuizPerformance {
        QuizPerformance {
            student_id: student,
            course_id: course,
            score,
            time_spent_seconds: 300,
            recorded_at: Utc::now(),
        }
    }

    fn engagement(
        student: StudentId,
        course: CourseId,
        seconds: u32,
        status: CompletionStatus,
    ) -> Engagement {
        Engagement {
            student_id: student,
            course_id: course,
            time_spent_seconds: seconds,
            completion_status: status,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let a = vec![80.0, 0.0, 95.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_matrix_averages_repeated_attempts() {
        let student = StudentId::new();
        let course = CourseId::new();
        let performances = vec![perf(student, course, 60), perf(student, course, 80)];

        let matrix = ScoreMatrix::build(&performances, &[], 0.0);
        assert_eq!(matrix.row(student).unwrap(), &[70.0]);
    }

    #[test]
    fn test_matrix_missing_entries_are_zero() {
        let s1 = StudentId::new();
        let s2 = StudentId::new();
        let c1 = CourseId::new();
        let c2 = CourseId::new();
        let performances = vec![perf(s1, c1, 90), perf(s2, c2, 75)];

        let matrix = ScoreMatrix::build(&performances, &[], 0.0);
        let row = matrix.row(s1).unwrap();
        assert_eq!(row.len(), 2);
        assert!(row.contains(&90.0));
        assert!(row.contains(&0.0));
    }

    #[test]
    fn test_engagement_factor_no_rows_is_zero() {
        assert_eq!(
            engagement_factor(&[], StudentId::new(), CourseId::new()),
            0.0
        );
    }

    #[test]
    fn test_engagement_factor_hours_times_completion_rate() {
        let student = StudentId::new();
        let course = CourseId::new();
        let engagements = vec![
            engagement(student, course, 3600, CompletionStatus::Completed),
            engagement(student, course, 3600, CompletionStatus::InProgress),
        ];

        // 2 hours total, half the rows completed
        assert!((engagement_factor(&engagements, student, course) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_engagement_weight_folds_into_matrix() {
        let student = StudentId::new();
        let course = CourseId::new();
        let performances = vec![perf(student, course, 50)];
        let engagements = vec![engagement(student, course, 7200, CompletionStatus::Completed)];

        let raw = ScoreMatrix::build(&performances, &engagements, 0.0);
        assert_eq!(raw.row(student).unwrap(), &[50.0]);

        let weighted = ScoreMatrix::build(&performances, &engagements, 10.0);
        // 50 + 10 * (2 hours * 1.0 completion)
        assert_eq!(weighted.row(student).unwrap(), &[70.0]);
    }

    #[test]
    fn test_courses_above_threshold() {
        let student = StudentId::new();
        let c1 = CourseId::new();
        let c2 = CourseId::new();
        let performances = vec![perf(student, c1, 90), perf(student, c2, 55)];

        let matrix = ScoreMatrix::build(&performances, &[], 0.0);
        let above = matrix.courses_above(student, 70.0);
        assert_eq!(above, vec![c1]);
    }
}
