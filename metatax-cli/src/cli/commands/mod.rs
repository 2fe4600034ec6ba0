pub mod annotate;
pub mod lineage;
pub mod split;
