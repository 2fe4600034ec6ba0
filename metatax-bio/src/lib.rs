//! Bioinformatics building blocks for metatax: FASTA and BLAST I/O,
//! lineages, taxonomy lookups, annotation and FASTA splitting

pub mod annotation;
pub mod formats;
pub mod split;
pub mod taxonomy;

// Re-export commonly used types
pub use annotation::{annotate_file, AnnotationOptions, AnnotationSummary};
pub use formats::{BlastHit, FastaReader, FastaRecord, FastaWriter};
pub use split::{ChunkPlan, FastaSplitter, SplitSummary};
pub use taxonomy::{
    resolve_accessions, AccessionTable, IdentityTiers, Lineage, LineagePolicy, TaxaDb,
    TaxonomyLookup,
};
