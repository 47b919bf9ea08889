use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use courserec::{
    models::{
        AssessmentResult, CompletionStatus, Course, Engagement, QuizPerformance, SkillId,
        StudentId,
    },
    store::InMemoryStore,
    Recommender, RecommenderConfig,
};

/// Seeds a small catalog with two students and prints recommendations
/// for each signal source.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RecommenderConfig::from_env()?;
    let store = InMemoryStore::new();

    let python = Course::new("Python Basics", "Core language skills", "python");
    let web = Course::new("Web Development", "Sites with Python", "python, web");
    let sql = Course::new("Databases", "Relational modeling", "sql");
    let ml = Course::new("Machine Learning", "Models in Python", "python, ml");
    for course in [&python, &web, &sql, &ml] {
        store.add_course(course.clone()).await;
    }

    let alice = StudentId::new();
    let bob = StudentId::new();

    // Alice and Bob both did well on Python Basics; Bob also aced Web Development
    for (student, course, score) in [
        (alice, python.id, 92),
        (bob, python.id, 88),
        (bob, web.id, 95),
    ] {
        store
            .add_performance(QuizPerformance {
                student_id: student,
                course_id: course,
                score,
                time_spent_seconds: 600,
                recorded_at: Utc::now(),
            })
            .await;
    }

    store
        .add_engagement(Engagement {
            student_id: alice,
            course_id: python.id,
            time_spent_seconds: 5400,
            completion_status: CompletionStatus::Completed,
            recorded_at: Utc::now(),
        })
        .await;

    store
        .add_assessment(AssessmentResult {
            student_id: alice,
            total_score: 78,
            skill_scores: [(SkillId::parse("python").unwrap(), 75)].into_iter().collect(),
            recommended_courses: vec![],
            learning_level: Default::default(),
            recorded_at: Utc::now(),
        })
        .await;

    let engine = Recommender::new(Arc::new(store), config).await?;

    for (label, courses) in [
        ("hybrid", engine.recommend(alice, 5).await),
        ("collaborative", engine.collaborative(alice, 5).await),
        ("content-based", engine.content_based(alice, 5).await),
        ("knowledge-graph", engine.knowledge_graph(alice, 5).await),
    ] {
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        println!("{label}: {titles:?}");
    }

    Ok(())
}
