//! Configuration module

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::error::CurationError;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub convergence: ConvergenceConfig,
}

/// Similarity thresholds. Strictly ordered:
/// `auto_dedup >= high_bucket >= medium_bucket >= low_bucket`.
/// A configuration violating the ordering is rejected at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Edges below this never enter the graph
    #[serde(default = "default_edge_keep")]
    pub edge_keep: f64,

    /// At or above: merge without human/LLM involvement
    #[serde(default = "default_auto_dedup")]
    pub auto_dedup: f64,

    /// At or above: human review / LLM adjudication
    #[serde(default = "default_high_bucket")]
    pub high_bucket: f64,

    /// At or above: queued with lower priority
    #[serde(default = "default_medium_bucket")]
    pub medium_bucket: f64,

    /// At or above: borderline, preview-only
    #[serde(default = "default_low_bucket")]
    pub low_bucket: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            edge_keep: default_edge_keep(),
            auto_dedup: default_auto_dedup(),
            high_bucket: default_high_bucket(),
            medium_bucket: default_medium_bucket(),
            low_bucket: default_low_bucket(),
        }
    }
}

fn default_edge_keep() -> f64 {
    0.72
}

fn default_auto_dedup() -> f64 {
    0.98
}

fn default_high_bucket() -> f64 {
    0.92
}

fn default_medium_bucket() -> f64 {
    0.75
}

fn default_low_bucket() -> f64 {
    0.55
}

/// Similarity graph construction settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Nearest neighbors requested per item
    #[serde(default = "default_top_k")]
    pub top_k_neighbors: usize,

    /// Weight of the embedding score in the blend
    #[serde(default = "default_embed_weight")]
    pub embed_weight: f64,

    /// Weight of the rerank score in the blend
    #[serde(default = "default_rerank_weight")]
    pub rerank_weight: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            top_k_neighbors: default_top_k(),
            embed_weight: default_embed_weight(),
            rerank_weight: default_rerank_weight(),
        }
    }
}

fn default_top_k() -> usize {
    50
}

fn default_embed_weight() -> f64 {
    0.7
}

fn default_rerank_weight() -> f64 {
    0.3
}

/// Overnight loop settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Hard cap on rounds; termination is guaranteed by this regardless
    /// of improvement behavior
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Halt when a round's reduction ratio drops below this
    #[serde(default = "default_min_improvement")]
    pub min_improvement_rate: f64,

    /// Adjudications below this confidence go to the manual-review queue
    #[serde(default = "default_min_confidence")]
    pub min_adjudicator_confidence: f64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_improvement_rate: default_min_improvement(),
            min_adjudicator_confidence: default_min_confidence(),
        }
    }
}

fn default_max_iterations() -> u32 {
    10
}

fn default_min_improvement() -> f64 {
    0.05
}

fn default_min_confidence() -> f64 {
    0.6
}

impl Config {
    /// Load config from default locations and validate it
    pub fn load() -> Result<Self> {
        let config = if let Some(local) = Self::find_local_config() {
            Self::load_from(&local)?
        } else if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            Self::load_from(&global)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file (no validation)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject non-monotonic threshold orderings and bad blend weights.
    /// Fatal at startup - thresholds are never silently clamped.
    pub fn validate(&self) -> Result<(), CurationError> {
        let t = &self.thresholds;
        if !(t.auto_dedup >= t.high_bucket
            && t.high_bucket >= t.medium_bucket
            && t.medium_bucket >= t.low_bucket)
        {
            return Err(CurationError::Configuration(format!(
                "thresholds must satisfy auto_dedup >= high >= medium >= low, got {} / {} / {} / {}",
                t.auto_dedup, t.high_bucket, t.medium_bucket, t.low_bucket
            )));
        }
        for (name, v) in [
            ("edge_keep", t.edge_keep),
            ("auto_dedup", t.auto_dedup),
            ("high_bucket", t.high_bucket),
            ("medium_bucket", t.medium_bucket),
            ("low_bucket", t.low_bucket),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CurationError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )));
            }
        }

        let g = &self.graph;
        if g.top_k_neighbors == 0 {
            return Err(CurationError::Configuration(
                "top_k_neighbors must be at least 1".into(),
            ));
        }
        if g.embed_weight < 0.0 || g.rerank_weight < 0.0 {
            return Err(CurationError::Configuration(
                "blend weights must be non-negative".into(),
            ));
        }

        let c = &self.convergence;
        if c.max_iterations == 0 {
            return Err(CurationError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Find local .kura/config.toml walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(".kura").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Find local .kura/data.db walking up directories
    pub fn find_local_db() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let db_path = current.join(".kura").join("data.db");
            if db_path.exists() {
                return Some(db_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Get global config path (~/.kura/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".kura").join("config.toml"))
    }

    /// Get global database path (~/.kura/data.db)
    pub fn global_db_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".kura").join("data.db"))
    }

    /// Get database path with priority:
    /// 1. KURA_DATABASE env var
    /// 2. Local .kura/data.db (walking up from CWD)
    /// 3. Global ~/.kura/data.db
    pub fn data_dir(&self) -> PathBuf {
        // 1. Environment variable
        if let Ok(env_path) = std::env::var("KURA_DATABASE") {
            return PathBuf::from(env_path);
        }

        // 2. Local .kura/data.db (search up from current directory)
        if let Some(local_db) = Self::find_local_db() {
            return local_db;
        }

        // 3. Local .kura/ directory exists (even without data.db yet)
        if let Some(local_config) = Self::find_local_config() {
            return local_config.parent().unwrap().join("data.db");
        }

        // 4. Global ~/.kura/data.db
        if let Some(global) = Self::global_db_path() {
            return global;
        }

        // 5. Fallback to current directory
        PathBuf::from(".kura").join("data.db")
    }
}

/// Helper to get directories crate functionality
mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE").ok().map(PathBuf::from)
        }
        #[cfg(not(windows))]
        {
            std::env::var("HOME").ok().map(PathBuf::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.auto_dedup, 0.98);
        assert_eq!(config.graph.top_k_neighbors, 50);
        assert_eq!(config.convergence.max_iterations, 10);
    }

    #[test]
    fn test_non_monotonic_thresholds_rejected() {
        let mut config = Config::default();
        config.thresholds.auto_dedup = 0.90;
        config.thresholds.high_bucket = 0.92;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CurationError::Configuration(_)));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = Config::default();
        config.thresholds.auto_dedup = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut config = Config::default();
        config.convergence.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.thresholds.high_bucket, config.thresholds.high_bucket);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("[thresholds]\nauto_dedup = 0.99\n").unwrap();
        assert_eq!(parsed.thresholds.auto_dedup, 0.99);
        assert_eq!(parsed.thresholds.high_bucket, 0.92);
        assert!(parsed.validate().is_ok());
    }
}
