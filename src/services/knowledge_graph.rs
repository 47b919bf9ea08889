//! Skill-graph filtering over assessment results.
//!
//! Takes the skills a student's assessment marks as strong, expands each
//! to its related-skill neighborhood in the knowledge graph, and surfaces
//! every course adjacent to those skills.

use std::collections::BTreeSet;

use crate::{
    config::RecommenderConfig,
    error::AppResult,
    graph::KnowledgeGraph,
    models::{Course, CourseId, SkillId, StudentId},
    store::LearningStore,
};

use super::fallback_recommendations;

/// Recommends courses reachable from the student's strong skills.
///
/// Requires an assessment result; without one (or without any strong
/// skill) the fallback list is returned.
pub async fn recommendations(
    store: &dyn LearningStore,
    graph: &KnowledgeGraph,
    config: &RecommenderConfig,
    student_id: StudentId,
    limit: usize,
) -> AppResult<Vec<Course>> {
    let Some(assessment) = store.assessment_for(student_id).await? else {
        tracing::debug!(student = %student_id, "No assessment result, using fallback");
        return fallback_recommendations(store, config.fallback_count).await;
    };

    let strong_skills: Vec<&SkillId> = assessment
        .skill_scores
        .iter()
        .filter(|(_, &score)| score > config.strong_skill_threshold)
        .map(|(skill, _)| skill)
        .collect();

    if strong_skills.is_empty() {
        tracing::debug!(student = %student_id, "No strong skills, using fallback");
        return fallback_recommendations(store, config.fallback_count).await;
    }

    let mut related_skills: BTreeSet<SkillId> = BTreeSet::new();
    for skill in &strong_skills {
        related_skills.extend(graph.related_skills(skill));
    }

    let mut candidates: BTreeSet<CourseId> = BTreeSet::new();
    for skill in &related_skills {
        candidates.extend(graph.courses_for_skill(skill));
    }

    let attempted: BTreeSet<CourseId> = store
        .quiz_performances_for(student_id)
        .await?
        .iter()
        .map(|p| p.course_id)
        .collect();

    let selected: Vec<CourseId> = candidates
        .into_iter()
        .filter(|c| !attempted.contains(c))
        .take(limit)
        .collect();

    tracing::debug!(
        student = %student_id,
        strong_skills = strong_skills.len(),
        related_skills = related_skills.len(),
        candidates = selected.len(),
        "Knowledge-graph filtering complete"
    );

    store.courses_by_ids(selected).await
}
