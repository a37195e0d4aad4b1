use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub recommend: RecommendSettings,
    pub eval: EvalSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub catalog_path: String,
    pub index_dir: String,
    pub table_name: String,
    pub ground_truth_path: String,
    pub labeled_rows_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            catalog_path: "data/catalog/assessments_structured.json".to_string(),
            index_dir: "data/indexes/lancedb".to_string(),
            table_name: "assessment_chunks".to_string(),
            ground_truth_path: "data/evaluation/ground_truth.json".to_string(),
            labeled_rows_path: "data/raw/labeled_queries.csv".to_string(),
        }
    }
}

/// How a selected chunk is weighted when its assessment is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitWeight {
    /// Cosine similarity between the query and the chunk.
    #[default]
    Similarity,
    /// Every hit counts 1.0, so the score is the number of supporting chunks.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Final number of chunks kept after diversification.
    pub k: usize,
    /// Size of the nearest-neighbour pool diversification draws from.
    pub fetch_k: usize,
    /// 1.0 = pure relevance, 0.0 = pure diversity.
    pub lambda: f32,
    pub hit_weight: HitWeight,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { k: 15, fetch_k: 40, lambda: 0.6, hit_weight: HitWeight::Similarity } }
}

impl RetrievalSettings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("retrieval.k must be at least 1".into()));
        }
        if self.fetch_k < self.k {
            return Err(Error::InvalidConfig(format!(
                "retrieval.fetch_k ({}) must be >= retrieval.k ({})",
                self.fetch_k, self.k
            )));
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(Error::InvalidConfig(format!("retrieval.lambda ({}) must lie in [0, 1]", self.lambda)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    pub default_top_k: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self { Self { default_top_k: 5 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalSettings {
    /// Ranking depth for MRR, independent of the recall@k depths.
    pub mrr_depth: usize,
}

impl Default for EvalSettings {
    fn default() -> Self { Self { mrr_depth: 10 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { model_dir: None, max_len: 256, use_fake: false, fake_dim: 1024 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_words: usize,
    pub overlap_percent: f32,
}

impl Default for ChunkingSettings {
    fn default() -> Self { Self { max_words: 300, overlap_percent: 0.2 } }
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        self.retrieval.validate()?;
        if self.recommend.default_top_k == 0 {
            return Err(Error::InvalidConfig("recommend.default_top_k must be at least 1".into()));
        }
        if self.eval.mrr_depth == 0 {
            return Err(Error::InvalidConfig("eval.mrr_depth must be at least 1".into()));
        }
        if self.chunking.max_words == 0 || !(0.0..1.0).contains(&self.chunking.overlap_percent) {
            return Err(Error::InvalidConfig(
                "chunking.max_words must be >= 1 and chunking.overlap_percent in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Merge defaults, `config.toml`, `config.<env>.toml` under `base` and
    /// `APP_*` environment variables (`__` separates nested keys).
    pub fn load_from(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }
}

/// Expand `~` and `$VAR` in a configured data path. Unknown variables are
/// left as written.
pub fn expand_path<S: AsRef<str>>(path: S) -> PathBuf {
    let raw = path.as_ref();
    let with_vars = shellexpand::env(raw).unwrap_or(std::borrow::Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(&with_vars).as_ref())
}
