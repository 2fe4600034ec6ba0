//! Taxonomy-related types shared by the metatax tools

use serde::{Deserialize, Serialize};
use std::fmt;

/// NCBI taxonomy identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxonId(pub u32);

impl TaxonId {
    pub const ROOT: Self = Self(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the root taxon (1)
    pub fn is_root(&self) -> bool {
        self.0 == 1
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The eight ranks of a standard annotation lineage, root-most first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicRank {
    Superkingdom,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxonomicRank {
    /// All standard ranks in lineage order
    pub const ALL: [TaxonomicRank; 8] = [
        Self::Superkingdom,
        Self::Kingdom,
        Self::Phylum,
        Self::Class,
        Self::Order,
        Self::Family,
        Self::Genus,
        Self::Species,
    ];

    /// Number of ranks in a standard lineage
    pub const DEPTH: usize = Self::ALL.len();

    /// Parse a rank label as stored in NCBI-derived databases.
    ///
    /// `domain` is the label NCBI now uses for the top rank; it maps to
    /// superkingdom. Non-standard labels (`no rank`, `clade`, `subgenus`, ...)
    /// return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "superkingdom" | "domain" => Some(Self::Superkingdom),
            "kingdom" => Some(Self::Kingdom),
            "phylum" => Some(Self::Phylum),
            "class" => Some(Self::Class),
            "order" => Some(Self::Order),
            "family" => Some(Self::Family),
            "genus" => Some(Self::Genus),
            "species" => Some(Self::Species),
            _ => None,
        }
    }

    /// Position of the rank in a standard lineage (superkingdom = 0)
    pub fn depth(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superkingdom => "superkingdom",
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
        }
    }
}

impl fmt::Display for TaxonomicRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
