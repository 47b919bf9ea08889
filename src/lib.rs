//! Course recommendation engine.
//!
//! Combines three independent signal sources into ranked course lists for
//! a student:
//!
//! - **Collaborative filtering**: cosine similarity between students over a
//!   quiz-score matrix, surfacing courses favored by close peers
//! - **Content-based filtering**: a score-weighted tag preference profile
//!   matched against the catalog
//! - **Knowledge-graph filtering**: traversal of a course/skill graph from
//!   the skills a student's assessment marks as strong
//!
//! The engine is a pure read path over collaborator-supplied records; it
//! owns no data and performs no writes. Every public entry point is total:
//! when a signal is missing or a filter fails internally, a weak fallback
//! list (the first few catalog courses) is returned instead of an error.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod services;
pub mod store;

pub use config::RecommenderConfig;
pub use error::{AppError, AppResult};
pub use graph::{GraphCache, KnowledgeGraph};
pub use services::Recommender;
