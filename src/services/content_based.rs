//! Content-based filtering over tag affinity.
//!
//! Accumulates a per-student tag preference profile from score-weighted
//! quiz history, then ranks catalog courses by how strongly their tags
//! overlap the profile.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    config::RecommenderConfig,
    error::AppResult,
    models::{Course, CourseId, LearningLevel, QuizPerformance, SkillId, StudentId},
    store::LearningStore,
};

use super::fallback_recommendations;

/// A student's learned tag preferences
///
/// Each quiz attempt on a course adds `score/100` to every tag the course
/// declares, so repeated strong attempts compound. `learning_level` comes
/// from the student's assessment when one exists; it is carried as profile
/// metadata and not applied as a scoring filter.
#[derive(Debug, Clone)]
pub struct PreferenceProfile {
    pub preferred_tags: BTreeMap<SkillId, f64>,
    pub learning_level: LearningLevel,
}

impl PreferenceProfile {
    pub fn build(
        performances: &[QuizPerformance],
        courses: &[Course],
        learning_level: LearningLevel,
    ) -> Self {
        let tags_by_course: HashMap<CourseId, Vec<SkillId>> = courses
            .iter()
            .map(|c| (c.id, c.skill_tags()))
            .collect();

        let mut preferred_tags: BTreeMap<SkillId, f64> = BTreeMap::new();
        for perf in performances {
            if let Some(tags) = tags_by_course.get(&perf.course_id) {
                for tag in tags {
                    *preferred_tags.entry(tag.clone()).or_insert(0.0) +=
                        f64::from(perf.score) / 100.0;
                }
            }
        }

        Self {
            preferred_tags,
            learning_level,
        }
    }

    /// Content score for a course: sum of the profile weights of its tags.
    /// Courses sharing no tags with the profile score 0.
    pub fn score(&self, course: &Course) -> f64 {
        course
            .skill_tags()
            .iter()
            .filter_map(|tag| self.preferred_tags.get(tag))
            .sum()
    }
}

/// Recommends catalog courses whose tags match the student's preference
/// profile, strongest match first.
pub async fn recommendations(
    store: &dyn LearningStore,
    config: &RecommenderConfig,
    student_id: StudentId,
    limit: usize,
) -> AppResult<Vec<Course>> {
    let performances = store.quiz_performances_for(student_id).await?;
    if performances.is_empty() {
        tracing::debug!(student = %student_id, "No quiz history, using fallback");
        return fallback_recommendations(store, config.fallback_count).await;
    }

    let courses = store.courses().await?;
    let learning_level = store
        .assessment_for(student_id)
        .await?
        .map(|a| a.learning_level)
        .unwrap_or_default();

    let profile = PreferenceProfile::build(&performances, &courses, learning_level);

    let attempted: BTreeSet<CourseId> = performances.iter().map(|p| p.course_id).collect();

    let mut scored: Vec<(Course, f64)> = courses
        .into_iter()
        .filter(|c| !attempted.contains(&c.id))
        .map(|c| {
            let score = profile.score(&c);
            (c, score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // Highest content score first; ties break on course id for stable output
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    tracing::debug!(
        student = %student_id,
        tags = profile.preferred_tags.len(),
        candidates = scored.len(),
        "Content-based filtering complete"
    );

    Ok(scored
        .into_iter()
        .take(limit)
        .map(|(course, _)| course)
        .collect())
}
