//! Core utilities and types shared across the metatax crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

pub use config::{
    load_config, resolve_config, save_config, AnnotateConfig, Config, IdentityTier,
    LineageConfig, SplitConfig, MAX_LOOKUP_BATCH,
};
pub use error::{MetataxError, MetataxResult};
pub use system::{default_config_path, metatax_home};
pub use types::{TaxonId, TaxonomicRank};
