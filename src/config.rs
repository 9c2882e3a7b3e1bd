use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Movie catalog CSV (Title, Director, Cast, poster_path, genres, overview)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Precomputed similarity matrix, a JSON array of equally sized rows
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Image host prefix joined with each movie's relative poster path
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Page size for search, popular and genre listings when the caller omits one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_autocomplete_limit")]
    pub autocomplete_limit: usize,

    /// Upper bound applied to any caller-supplied limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_catalog_path() -> String {
    "movies_with_posters.csv".to_string()
}

fn default_similarity_path() -> String {
    "cosine_similarity_matrix.json".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_limit() -> usize {
    20
}

fn default_autocomplete_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            similarity_path: default_similarity_path(),
            poster_base_url: default_poster_base_url(),
            default_limit: default_limit(),
            autocomplete_limit: default_autocomplete_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves a caller-supplied limit against the configured default and ceiling
    pub fn clamp_limit(&self, requested: Option<usize>, fallback: usize) -> usize {
        requested.unwrap_or(fallback).min(self.max_limit)
    }
}
