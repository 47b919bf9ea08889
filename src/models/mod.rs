use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};
use uuid::Uuid;

/// Identifier for a course in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub Uuid);

impl CourseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a student; the key for all per-student aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub Uuid);

impl StudentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized skill label derived from course tags or assessment keys
///
/// Skill names arrive as free text ("Python", " web  ", "WEB"). Normalizing
/// through a single constructor keeps tag strings and assessment keys in the
/// same namespace, so lookups against the knowledge graph cannot miss on
/// casing or stray whitespace. Empty labels are rejected rather than becoming
/// dead nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(String);

impl SkillId {
    /// Normalizes a raw label; returns None for labels that are empty
    /// after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog course; read-only input to the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    /// Comma-separated skill/topic labels, e.g. "python, web"
    pub tags: String,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(title: &str, description: &str, tags: &str) -> Self {
        Self {
            id: CourseId::new(),
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Parses the tag string into normalized skills, dropping empties and
    /// deduplicating while preserving first occurrence.
    pub fn skill_tags(&self) -> Vec<SkillId> {
        let mut seen = Vec::new();
        for raw in self.tags.split(',') {
            if let Some(skill) = SkillId::parse(raw) {
                if !seen.contains(&skill) {
                    seen.push(skill);
                }
            }
        }
        seen
    }
}

/// One quiz attempt by a student, already resolved to its course
///
/// Append-only: a student may have many records per course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizPerformance {
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Raw quiz score, 0-100
    pub score: u32,
    pub time_spent_seconds: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    InProgress,
    NotStarted,
}

/// A student's interaction with a lesson, resolved to its course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Engagement {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub time_spent_seconds: u32,
    pub completion_status: CompletionStatus,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Outcome of a student's initial assessment; at most one is consulted
/// per student (the first found)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentResult {
    pub student_id: StudentId,
    pub total_score: u32,
    /// Per-skill score breakdown, keyed by normalized skill
    pub skill_scores: BTreeMap<SkillId, u32>,
    pub recommended_courses: Vec<CourseId>,
    pub learning_level: LearningLevel,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_id_normalizes_case_and_whitespace() {
        assert_eq!(SkillId::parse("  Python ").unwrap().as_str(), "python");
        assert_eq!(SkillId::parse("WEB").unwrap().as_str(), "web");
    }

    #[test]
    fn test_skill_id_rejects_empty() {
        assert!(SkillId::parse("").is_none());
        assert!(SkillId::parse("   ").is_none());
    }

    #[test]
    fn test_skill_tags_parsing() {
        let course = Course::new("Web Dev", "Intro to web", "Python,  Web , python");
        let tags = course.skill_tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].as_str(), "python");
        assert_eq!(tags[1].as_str(), "web");
    }

    #[test]
    fn test_skill_tags_empty_string() {
        let course = Course::new("Untagged", "No tags", "");
        assert!(course.skill_tags().is_empty());
    }

    #[test]
    fn test_completion_status_serde() {
        let json = serde_json::to_string(&CompletionStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);

        let status: CompletionStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(status, CompletionStatus::Completed);
    }

    #[test]
    fn test_learning_level_defaults_to_beginner() {
        assert_eq!(LearningLevel::default(), LearningLevel::Beginner);
    }
}
