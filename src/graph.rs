//! Knowledge graph of course-skill associations.
//!
//! Built fresh from the course catalog: one `course` node per catalog entry,
//! one `skill` node per distinct normalized tag. Edges are maintained in
//! *both* directions (course→skill and skill→course, weight 1.0 each), so a
//! plain outgoing-neighbor query works from either node kind. A one-way
//! model would leave skill nodes with no outgoing edges and make skill→course
//! lookups silently empty.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::{Course, CourseId, SkillId},
    store::LearningStore,
};

/// Node payload: either a catalog course or a skill label
#[derive(Debug, Clone)]
pub enum GraphNode {
    Course {
        id: CourseId,
        title: String,
        tags: Vec<SkillId>,
    },
    Skill(SkillId),
}

/// In-memory course/skill graph backed by petgraph, with hash indexes
/// for O(1) node lookup by id.
pub struct KnowledgeGraph {
    graph: DiGraph<GraphNode, f64>,
    course_nodes: HashMap<CourseId, NodeIndex>,
    skill_nodes: HashMap<SkillId, NodeIndex>,
}

impl KnowledgeGraph {
    /// Builds the graph from the current course catalog.
    ///
    /// Tags are parsed and deduplicated per course, so a repeated
    /// (course, tag) pair never produces a duplicate edge.
    pub fn build(courses: &[Course]) -> Self {
        let mut graph = DiGraph::new();
        let mut course_nodes = HashMap::new();
        let mut skill_nodes: HashMap<SkillId, NodeIndex> = HashMap::new();

        for course in courses {
            let tags = course.skill_tags();
            let course_node = graph.add_node(GraphNode::Course {
                id: course.id,
                title: course.title.clone(),
                tags: tags.clone(),
            });
            course_nodes.insert(course.id, course_node);

            for tag in tags {
                let skill_node = *skill_nodes
                    .entry(tag.clone())
                    .or_insert_with(|| graph.add_node(GraphNode::Skill(tag.clone())));
                graph.add_edge(course_node, skill_node, 1.0);
                graph.add_edge(skill_node, course_node, 1.0);
            }
        }

        tracing::debug!(
            courses = course_nodes.len(),
            skills = skill_nodes.len(),
            edges = graph.edge_count(),
            "Knowledge graph built"
        );

        Self {
            graph,
            course_nodes,
            skill_nodes,
        }
    }

    pub fn course_count(&self) -> usize {
        self.course_nodes.len()
    }

    pub fn skill_count(&self) -> usize {
        self.skill_nodes.len()
    }

    pub fn contains_skill(&self, skill: &SkillId) -> bool {
        self.skill_nodes.contains_key(skill)
    }

    /// True if the given course declares the given skill as a tag
    pub fn has_edge(&self, course_id: CourseId, skill: &SkillId) -> bool {
        match (self.course_nodes.get(&course_id), self.skill_nodes.get(skill)) {
            (Some(&c), Some(&s)) => self.graph.find_edge(c, s).is_some(),
            _ => false,
        }
    }

    /// Courses that declare the given skill as a tag
    pub fn courses_for_skill(&self, skill: &SkillId) -> BTreeSet<CourseId> {
        let mut courses = BTreeSet::new();
        if let Some(&node) = self.skill_nodes.get(skill) {
            for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let GraphNode::Course { id, .. } = &self.graph[neighbor] {
                    courses.insert(*id);
                }
            }
        }
        courses
    }

    /// Skills declared by the given course
    pub fn skills_for_course(&self, course_id: CourseId) -> BTreeSet<SkillId> {
        let mut skills = BTreeSet::new();
        if let Some(&node) = self.course_nodes.get(&course_id) {
            for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let GraphNode::Skill(skill) = &self.graph[neighbor] {
                    skills.insert(skill.clone());
                }
            }
        }
        skills
    }

    /// The skill itself plus every skill co-occurring with it on some
    /// course: the two-hop skill→course→skill neighborhood.
    pub fn related_skills(&self, skill: &SkillId) -> BTreeSet<SkillId> {
        let mut related = BTreeSet::new();
        if !self.contains_skill(skill) {
            return related;
        }
        related.insert(skill.clone());
        for course_id in self.courses_for_skill(skill) {
            related.extend(self.skills_for_course(course_id));
        }
        related
    }
}

/// Shared graph cache keyed by the store's catalog revision.
///
/// The graph is cheap enough to rebuild per engine instance, but callers
/// that create one engine per request can share a cache to skip rebuilds
/// while the catalog is unchanged.
#[derive(Default)]
pub struct GraphCache {
    cached: Mutex<Option<(u64, Arc<KnowledgeGraph>)>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached graph if the catalog revision is unchanged,
    /// otherwise rebuilds from the current catalog.
    pub async fn graph_for(&self, store: &dyn LearningStore) -> AppResult<Arc<KnowledgeGraph>> {
        let revision = store.catalog_revision().await?;

        let mut cached = self.cached.lock().await;
        if let Some((cached_revision, graph)) = cached.as_ref() {
            if *cached_revision == revision {
                return Ok(Arc::clone(graph));
            }
        }

        tracing::debug!(revision, "Rebuilding knowledge graph");
        let courses = store.courses().await?;
        let graph = Arc::new(KnowledgeGraph::build(&courses));
        *cached = Some((revision, Arc::clone(&graph)));
        Ok(graph)
    }
}
