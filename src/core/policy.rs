//! Decision policy engine
//!
//! Routes every candidate pair or community to exactly one resolution
//! path based on the configured, strictly ordered thresholds. The
//! ordering itself is validated at startup by `Config::validate`; by
//! the time a score reaches `route` the tiers are known to be monotonic.

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// Similarity tier a candidate falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::High => write!(f, "high"),
            Bucket::Medium => write!(f, "medium"),
            Bucket::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Bucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Bucket::High),
            "medium" => Ok(Bucket::Medium),
            "low" => Ok(Bucket::Low),
            _ => anyhow::bail!("Unknown bucket: {} (expected high/medium/low)", s),
        }
    }
}

/// Resolution path for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Merge without human or LLM involvement
    AutoMerge,
    /// Interactive review, or LLM adjudication in automated mode
    HighReview,
    /// Same, queued with lower priority
    MediumReview,
    /// Borderline: preview-only unless explicitly requested
    BorderlinePreview,
    /// Below every tier
    Ignore,
}

impl Route {
    /// The review bucket this route maps to, if any
    pub fn bucket(&self) -> Option<Bucket> {
        match self {
            Route::HighReview => Some(Bucket::High),
            Route::MediumReview => Some(Bucket::Medium),
            Route::BorderlinePreview => Some(Bucket::Low),
            Route::AutoMerge | Route::Ignore => None,
        }
    }
}

/// Route a blended score through the threshold tiers
pub fn route(score: f64, thresholds: &Thresholds) -> Route {
    if score >= thresholds.auto_dedup {
        Route::AutoMerge
    } else if score >= thresholds.high_bucket {
        Route::HighReview
    } else if score >= thresholds.medium_bucket {
        Route::MediumReview
    } else if score >= thresholds.low_bucket {
        Route::BorderlinePreview
    } else {
        Route::Ignore
    }
}
