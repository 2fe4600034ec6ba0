//! Configuration types for metatax

use crate::system::default_config_path;
use crate::types::TaxonomicRank;
use crate::MetataxError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of accessions bound into a single taxonomy query
pub const MAX_LOOKUP_BATCH: usize = 999;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub annotate: AnnotateConfig,
    #[serde(default)]
    pub lineage: LineageConfig,
    #[serde(default)]
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotateConfig {
    /// Hits kept per query after sorting (0 = keep all)
    #[serde(default)]
    pub nbest: usize,
    /// Minimum query coverage for a hit to be considered
    #[serde(default)]
    pub min_coverage: f64,
    /// Truncate lineages according to `identity_tiers`
    #[serde(default)]
    pub tiered_identity: bool,
    /// File name used when no explicit output path is given
    #[serde(default = "default_output_name")]
    pub output_name: String,
    #[serde(default = "default_identity_tiers")]
    pub identity_tiers: Vec<IdentityTier>,
}

/// Lineage depth retained for hits at or above an identity threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IdentityTier {
    pub min_identity: f64,
    /// Number of leading ranks kept; absent means the whole lineage
    #[serde(default)]
    pub keep_ranks: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Render lineages as the eight standard ranks
    #[serde(default)]
    pub standard_ranks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitConfig {
    #[serde(default = "default_line_width")]
    pub line_width: usize,
}

fn default_output_name() -> String { "ncbi_taxonomic_annotation.txt".to_string() }
fn default_batch_size() -> usize { MAX_LOOKUP_BATCH }
fn default_line_width() -> usize { 80 }

/// superkingdom >= 0, phylum >= 65, class >= 75, genus >= 85, species >= 95
pub fn default_identity_tiers() -> Vec<IdentityTier> {
    vec![
        IdentityTier { min_identity: 95.0, keep_ranks: None },
        IdentityTier { min_identity: 85.0, keep_ranks: Some(7) },
        IdentityTier { min_identity: 75.0, keep_ranks: Some(4) },
        IdentityTier { min_identity: 65.0, keep_ranks: Some(3) },
        IdentityTier { min_identity: 0.0, keep_ranks: Some(2) },
    ]
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            nbest: 0,
            min_coverage: 0.0,
            tiered_identity: false,
            output_name: default_output_name(),
            identity_tiers: default_identity_tiers(),
        }
    }
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            standard_ranks: false,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
        }
    }
}

impl Config {
    /// Reject values the tools cannot run with
    pub fn validate(&self) -> Result<(), MetataxError> {
        if self.annotate.identity_tiers.is_empty() {
            return Err(MetataxError::Configuration(
                "annotate.identity_tiers must contain at least one tier".to_string(),
            ));
        }
        for tier in &self.annotate.identity_tiers {
            if !tier.min_identity.is_finite() {
                return Err(MetataxError::Configuration(format!(
                    "identity tier threshold {} is not a number",
                    tier.min_identity
                )));
            }
            if tier.keep_ranks.is_some_and(|k| k > TaxonomicRank::DEPTH) {
                return Err(MetataxError::Configuration(format!(
                    "identity tier {} keeps more than {} ranks",
                    tier.min_identity,
                    TaxonomicRank::DEPTH
                )));
            }
        }
        if self.annotate.output_name.trim().is_empty() {
            return Err(MetataxError::Configuration(
                "annotate.output_name must not be empty".to_string(),
            ));
        }
        if self.lineage.batch_size == 0 || self.lineage.batch_size > MAX_LOOKUP_BATCH {
            return Err(MetataxError::Configuration(format!(
                "lineage.batch_size must be between 1 and {}",
                MAX_LOOKUP_BATCH
            )));
        }
        if self.split.line_width == 0 {
            return Err(MetataxError::Configuration(
                "split.line_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, MetataxError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), MetataxError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| MetataxError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Load the configuration in effect.
///
/// An explicit path must exist. Otherwise the default location
/// (`METATAX_CONFIG`, then `METATAX_HOME/config.toml`) is used when present,
/// and built-in defaults when it is not.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, MetataxError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(MetataxError::Configuration(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        tracing::debug!("Loading configuration from {}", path.display());
        return load_config(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        tracing::debug!("Loading configuration from {}", default_path.display());
        load_config(&default_path)
    } else {
        tracing::debug!("No configuration file found, using defaults");
        Ok(Config::default())
    }
}
