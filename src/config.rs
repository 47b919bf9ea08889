use serde::Deserialize;

/// Engine tuning parameters loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct RecommenderConfig {
    /// Number of most-similar peers consulted by collaborative filtering
    #[serde(default = "default_peer_count")]
    pub peer_count: usize,

    /// Minimum cosine similarity for a peer to count
    #[serde(default = "default_min_peer_similarity")]
    pub min_peer_similarity: f64,

    /// Matrix score above which a peer's course becomes a candidate
    #[serde(default = "default_peer_score_threshold")]
    pub peer_score_threshold: f64,

    /// Assessment score above which a skill counts as strong
    #[serde(default = "default_strong_skill_threshold")]
    pub strong_skill_threshold: u32,

    /// Weight applied to the engagement factor when building the score
    /// matrix. Zero keeps the matrix on raw quiz scores only.
    #[serde(default = "default_engagement_weight")]
    pub engagement_weight: f64,

    /// Number of catalog courses returned when a filter has no signal
    #[serde(default = "default_fallback_count")]
    pub fallback_count: usize,
}

fn default_peer_count() -> usize {
    5
}

fn default_min_peer_similarity() -> f64 {
    0.1
}

fn default_peer_score_threshold() -> f64 {
    70.0
}

fn default_strong_skill_threshold() -> u32 {
    60
}

fn default_engagement_weight() -> f64 {
    0.0
}

fn default_fallback_count() -> usize {
    5
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            peer_count: default_peer_count(),
            min_peer_similarity: default_min_peer_similarity(),
            peer_score_threshold: default_peer_score_threshold(),
            strong_skill_threshold: default_strong_skill_threshold(),
            engagement_weight: default_engagement_weight(),
            fallback_count: default_fallback_count(),
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<RecommenderConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
