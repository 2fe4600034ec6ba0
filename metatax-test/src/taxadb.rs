//! SQLite taxonomy databases in the taxadb layout

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `taxa` table row
#[derive(Debug, Clone, Copy)]
pub struct TaxonRow {
    pub taxid: u32,
    pub parent: u32,
    pub name: &'static str,
    pub rank: &'static str,
}

const fn taxon(taxid: u32, parent: u32, name: &'static str, rank: &'static str) -> TaxonRow {
    TaxonRow {
        taxid,
        parent,
        name,
        rank,
    }
}

/// E. coli K-12 and B. subtilis down from the self-parented root
pub const STANDARD_TAXA: &[TaxonRow] = &[
    taxon(1, 1, "root", "no rank"),
    taxon(131567, 1, "cellular organisms", "no rank"),
    taxon(2, 131567, "Bacteria", "superkingdom"),
    taxon(1224, 2, "Pseudomonadota", "phylum"),
    taxon(1236, 1224, "Gammaproteobacteria", "class"),
    taxon(91347, 1236, "Enterobacterales", "order"),
    taxon(543, 91347, "Enterobacteriaceae", "family"),
    taxon(561, 543, "Escherichia", "genus"),
    taxon(562, 561, "Escherichia coli", "species"),
    taxon(511145, 562, "Escherichia coli K-12", "strain"),
    taxon(1239, 2, "Bacillota", "phylum"),
    taxon(91061, 1239, "Bacilli", "class"),
    taxon(1385, 91061, "Bacillales", "order"),
    taxon(186817, 1385, "Bacillaceae", "family"),
    taxon(1386, 186817, "Bacillus", "genus"),
    taxon(1423, 1386, "Bacillus subtilis", "species"),
];

/// Accessions of the standard database. `ORPHAN1` points at a taxid
/// missing from `taxa`.
pub const STANDARD_ACCESSIONS: &[(&str, u32)] = &[
    ("NC_000913", 511145),
    ("U00096", 511145),
    ("CP009072", 1423),
    ("ORPHAN1", 999999),
];

/// Create a taxadb SQLite file at `path`
pub fn create_taxadb(path: &Path, taxa: &[TaxonRow], accessions: &[(&str, u32)]) -> Result<()> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    conn.execute_batch(
        "CREATE TABLE taxa (
             ncbi_taxid INTEGER PRIMARY KEY,
             parent_taxid INTEGER,
             tax_name TEXT,
             lineage_level TEXT
         );
         CREATE TABLE accession (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             taxid_id INTEGER,
             accession TEXT UNIQUE
         );",
    )?;

    let tx = conn.transaction()?;
    {
        let mut insert_taxon = tx.prepare(
            "INSERT INTO taxa (ncbi_taxid, parent_taxid, tax_name, lineage_level) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for t in taxa {
            insert_taxon.execute(params![t.taxid, t.parent, t.name, t.rank])?;
        }

        let mut insert_accession =
            tx.prepare("INSERT INTO accession (taxid_id, accession) VALUES (?1, ?2)")?;
        for (accession, taxid) in accessions {
            insert_accession.execute(params![taxid, accession])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Taxadb file in its own temporary directory
pub struct TaxadbFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl TaxadbFixture {
    pub fn new(taxa: &[TaxonRow], accessions: &[(&str, u32)]) -> Result<Self> {
        let dir = TempDir::with_prefix("metatax-taxadb")?;
        let path = dir.path().join("taxadb.sqlite");
        create_taxadb(&path, taxa, accessions)?;
        Ok(Self { _dir: dir, path })
    }

    /// Database built from [`STANDARD_TAXA`] and [`STANDARD_ACCESSIONS`]
    pub fn standard() -> Result<Self> {
        Self::new(STANDARD_TAXA, STANDARD_ACCESSIONS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
