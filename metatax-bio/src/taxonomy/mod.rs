pub mod lineage;
pub mod table;
pub mod taxadb;

// Re-export commonly used types
pub use lineage::{IdentityTiers, Lineage, LineagePolicy, UNKNOWN_RANK};
pub use table::{write_table, AccessionTable, TABLE_HEADER};
pub use taxadb::{
    resolve_accessions, LineageNode, Resolution, ResolvedAccession, TaxaDb, TaxonomyLookup,
};
