use metatax_core::{IdentityTier, TaxonomicRank};
use std::fmt;

/// Placeholder written for a rank that is unknown or was cut away
pub const UNKNOWN_RANK: &str = "NA";

/// Ordered taxon names from the root-most rank down, `;`-separated on disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lineage {
    names: Vec<String>,
}

impl Lineage {
    /// Parse a `;`-separated lineage. An empty string is an empty lineage.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::default();
        }
        Self {
            names: s.split(';').map(str::to_string).collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Place `(name, rank label)` pairs into the eight standard rank slots.
    ///
    /// Pairs whose label is not a standard rank are dropped; when two names
    /// claim the same rank the root-most wins. Empty slots hold `NA`.
    pub fn from_ranked<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut slots: [Option<&str>; TaxonomicRank::DEPTH] = [None; TaxonomicRank::DEPTH];
        for (name, label) in nodes {
            if let Some(rank) = TaxonomicRank::from_label(label) {
                slots[rank.depth()].get_or_insert(name);
            }
        }
        Self::from_names(slots.iter().map(|s| s.unwrap_or(UNKNOWN_RANK)))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First `keep` names, padded with `NA` to the standard depth
    pub fn truncated(&self, keep: usize) -> Vec<&str> {
        let mut ranks: Vec<&str> = self.names.iter().take(keep).map(String::as_str).collect();
        pad(&mut ranks);
        ranks
    }

    /// All names, padded with `NA` when shorter than the standard depth
    pub fn padded(&self) -> Vec<&str> {
        let mut ranks: Vec<&str> = self.names.iter().map(String::as_str).collect();
        pad(&mut ranks);
        ranks
    }
}

fn pad(ranks: &mut Vec<&str>) {
    while ranks.len() < TaxonomicRank::DEPTH {
        ranks.push(UNKNOWN_RANK);
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(";"))
    }
}

static KEEP_ALL: IdentityTier = IdentityTier {
    min_identity: f64::NEG_INFINITY,
    keep_ranks: None,
};

/// Identity thresholds ordered from the most to the least demanding
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityTiers {
    tiers: Vec<IdentityTier>,
}

impl IdentityTiers {
    /// Build from tiers in any order. An empty list falls back to the defaults.
    pub fn new(mut tiers: Vec<IdentityTier>) -> Self {
        if tiers.is_empty() {
            return Self::default();
        }
        tiers.sort_by(|a, b| b.min_identity.total_cmp(&a.min_identity));
        Self { tiers }
    }

    /// The first tier whose threshold `identity` reaches, or the lowest tier
    pub fn tier_for(&self, identity: f64) -> &IdentityTier {
        self.tiers
            .iter()
            .find(|tier| identity >= tier.min_identity)
            .or_else(|| self.tiers.last())
            .unwrap_or(&KEEP_ALL)
    }

    pub fn tiers(&self) -> &[IdentityTier] {
        &self.tiers
    }
}

impl Default for IdentityTiers {
    fn default() -> Self {
        Self::new(metatax_core::config::default_identity_tiers())
    }
}

/// How much of a hit's lineage ends up in the annotation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LineagePolicy {
    /// Whole lineage regardless of identity
    #[default]
    Full,
    /// Lineage cut according to the hit's identity
    Tiered(IdentityTiers),
}

impl LineagePolicy {
    /// Rank columns for a hit. Missing annotations render as `NA` at every rank.
    pub fn render<'a>(&self, lineage: Option<&'a Lineage>, identity: f64) -> Vec<&'a str> {
        let lineage = match lineage {
            Some(lineage) if !lineage.is_empty() => lineage,
            _ => return vec![UNKNOWN_RANK; TaxonomicRank::DEPTH],
        };

        match self {
            LineagePolicy::Full => lineage.padded(),
            LineagePolicy::Tiered(tiers) => match tiers.tier_for(identity).keep_ranks {
                None => lineage.padded(),
                Some(keep) => lineage.truncated(keep),
            },
        }
    }
}
