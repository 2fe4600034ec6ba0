//! Lookups against a taxadb SQLite database.
//!
//! Layout:
//! - `taxa(ncbi_taxid, parent_taxid, tax_name, lineage_level)`
//! - `accession(id, taxid_id, accession)` with `taxid_id` referencing `taxa`

use super::lineage::Lineage;
use indexmap::IndexSet;
use metatax_core::{MetataxError, MetataxResult, TaxonId, MAX_LOOKUP_BATCH};
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Upper bound on the number of ancestors followed from a taxon
pub const MAX_LINEAGE_DEPTH: u32 = 256;

/// One ancestor on a lineage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageNode {
    pub taxid: TaxonId,
    pub name: String,
    pub rank: String,
}

/// Accession and lineage lookups against a taxonomy source
pub trait TaxonomyLookup {
    /// `(accession, taxid)` for every accession the source knows, in input order
    fn taxids(&self, accessions: &[String]) -> MetataxResult<Vec<(String, TaxonId)>>;

    /// Ancestors of `taxid` from the root-most down to the taxon itself,
    /// without the root node. Unknown taxids give an empty path.
    fn lineage(&self, taxid: TaxonId) -> MetataxResult<Vec<LineageNode>>;
}

/// Read-only handle on a taxadb SQLite file
pub struct TaxaDb {
    conn: Connection,
    path: PathBuf,
}

impl TaxaDb {
    pub fn open<P: AsRef<Path>>(path: P) -> MetataxResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MetataxError::NotFound(format!(
                "taxonomy database {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            MetataxError::Database(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.check_schema()?;
        tracing::debug!("Opened taxonomy database {}", path.display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_schema(&self) -> MetataxResult<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        for table in ["taxa", "accession"] {
            let count: i64 = stmt.query_row([table], |row| row.get(0)).map_err(|e| {
                MetataxError::Database(format!(
                    "{} is not a readable SQLite database: {}",
                    self.path.display(),
                    e
                ))
            })?;
            if count == 0 {
                return Err(MetataxError::Database(format!(
                    "{} is not a taxadb database: missing table '{}'",
                    self.path.display(),
                    table
                )));
            }
        }
        Ok(())
    }

    fn taxids_batch(
        &self,
        batch: &[String],
        found: &mut HashMap<String, TaxonId>,
    ) -> MetataxResult<()> {
        let placeholders: Vec<String> = (1..=batch.len()).map(|i| format!("?{}", i)).collect();
        let query = format!(
            "SELECT accession, taxid_id FROM accession WHERE accession IN ({})",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&query)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            batch.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
        let rows = stmt.query_map(params.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        for row in rows {
            let (accession, taxid) = row?;
            found.insert(accession, TaxonId(taxid));
        }
        Ok(())
    }
}

impl TaxonomyLookup for TaxaDb {
    fn taxids(&self, accessions: &[String]) -> MetataxResult<Vec<(String, TaxonId)>> {
        let mut found = HashMap::new();
        for batch in accessions.chunks(MAX_LOOKUP_BATCH) {
            self.taxids_batch(batch, &mut found)?;
        }

        let mut seen = IndexSet::new();
        Ok(accessions
            .iter()
            .filter(|acc| seen.insert(acc.as_str()))
            .filter_map(|acc| found.get(acc).map(|taxid| (acc.clone(), *taxid)))
            .collect())
    }

    fn lineage(&self, taxid: TaxonId) -> MetataxResult<Vec<LineageNode>> {
        let mut stmt = self.conn.prepare_cached(
            "WITH RECURSIVE lineage(ncbi_taxid, parent_taxid, tax_name, lineage_level, depth) AS (
                 SELECT ncbi_taxid, parent_taxid, tax_name, lineage_level, 0
                 FROM taxa WHERE ncbi_taxid = ?1
                 UNION ALL
                 SELECT t.ncbi_taxid, t.parent_taxid, t.tax_name, t.lineage_level, l.depth + 1
                 FROM taxa t JOIN lineage l ON t.ncbi_taxid = l.parent_taxid
                 WHERE l.ncbi_taxid != l.parent_taxid AND l.depth < ?2
             )
             SELECT ncbi_taxid, parent_taxid, tax_name, lineage_level
             FROM lineage ORDER BY depth DESC",
        )?;

        let rows = stmt.query_map(rusqlite::params![taxid.0, MAX_LINEAGE_DEPTH], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, Option<u32>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            let (id, parent, name, rank) = row?;
            let is_root = TaxonId(id).is_root() || parent.map_or(true, |p| p == id);
            if is_root {
                continue;
            }
            nodes.push(LineageNode {
                taxid: TaxonId(id),
                name: name.unwrap_or_default(),
                rank: rank.unwrap_or_default(),
            });
        }
        Ok(nodes)
    }
}

/// An accession with its taxid and lineage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccession {
    pub accession: String,
    pub taxid: TaxonId,
    pub lineage: Vec<LineageNode>,
}

impl ResolvedAccession {
    /// Names joined root-most first
    pub fn lineage_names(&self) -> Lineage {
        Lineage::from_names(self.lineage.iter().map(|n| n.name.as_str()))
    }

    /// Names placed into the eight standard rank slots
    pub fn standard_lineage(&self) -> Lineage {
        Lineage::from_ranked(self.lineage.iter().map(|n| (n.name.as_str(), n.rank.as_str())))
    }
}

/// Outcome of resolving a list of accessions
#[derive(Debug, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedAccession>,
    /// Distinct accessions absent from the database
    pub unknown_accessions: usize,
    /// Distinct accessions whose taxid has no lineage
    pub missing_lineages: usize,
}

/// Resolve accessions to taxids and lineages, `batch_size` accessions at a time.
///
/// Duplicates are resolved once and the first-seen order is kept. Lineages
/// are cached per taxid. `on_batch` receives the number of distinct
/// accessions processed so far.
pub fn resolve_accessions<L: TaxonomyLookup>(
    lookup: &L,
    accessions: &[String],
    batch_size: usize,
    mut on_batch: impl FnMut(usize),
) -> MetataxResult<Resolution> {
    let unique: Vec<String> = accessions
        .iter()
        .cloned()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect();

    let mut resolution = Resolution::default();
    let mut cache: HashMap<TaxonId, Vec<LineageNode>> = HashMap::new();
    let mut processed = 0;

    for batch in unique.chunks(batch_size.clamp(1, MAX_LOOKUP_BATCH)) {
        let taxids = lookup.taxids(batch)?;
        resolution.unknown_accessions += batch.len() - taxids.len();

        for (accession, taxid) in taxids {
            let lineage = match cache.get(&taxid) {
                Some(lineage) => lineage.clone(),
                None => {
                    let lineage = lookup.lineage(taxid)?;
                    cache.insert(taxid, lineage.clone());
                    lineage
                }
            };

            if lineage.is_empty() {
                tracing::debug!("No lineage for {} (taxid {})", accession, taxid);
                resolution.missing_lineages += 1;
                continue;
            }
            resolution.resolved.push(ResolvedAccession {
                accession,
                taxid,
                lineage,
            });
        }

        processed += batch.len();
        on_batch(processed);
    }

    tracing::info!(
        "Resolved {} of {} distinct accessions",
        resolution.resolved.len(),
        unique.len()
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metatax_test::TaxadbFixture;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_open_missing_database() {
        let result = TaxaDb::open("/nonexistent/taxadb.sqlite");
        assert!(matches!(result, Err(MetataxError::NotFound(_))));
    }

    #[test]
    fn test_open_rejects_foreign_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE genes (id INTEGER PRIMARY KEY)", ()).unwrap();
        drop(conn);

        let err = TaxaDb::open(&path).err().unwrap();
        assert!(err.to_string().contains("missing table 'taxa'"));
    }

    #[test]
    fn test_open_rejects_non_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "accession\ttaxid\tlineage\n".repeat(200)).unwrap();

        assert!(matches!(TaxaDb::open(&path), Err(MetataxError::Database(_))));
    }

    #[test]
    fn test_taxids_keep_input_order_and_skip_unknown() {
        let fixture = TaxadbFixture::standard().unwrap();
        let db = TaxaDb::open(fixture.path()).unwrap();

        let found = db
            .taxids(&ids(&["CP009072", "UNKNOWN1", "NC_000913", "CP009072"]))
            .unwrap();
        assert_eq!(
            found,
            vec![
                ("CP009072".to_string(), TaxonId(1423)),
                ("NC_000913".to_string(), TaxonId(511145)),
            ]
        );
    }

    #[test]
    fn test_taxids_more_than_one_sql_batch() {
        let fixture = TaxadbFixture::standard().unwrap();
        let db = TaxaDb::open(fixture.path()).unwrap();

        let mut accessions: Vec<String> = (0..2500).map(|i| format!("FAKE{:05}", i)).collect();
        accessions.push("NC_000913".to_string());

        let found = db.taxids(&accessions).unwrap();
        assert_eq!(found, vec![("NC_000913".to_string(), TaxonId(511145))]);
    }

    #[test]
    fn test_lineage_walks_to_root() {
        let fixture = TaxadbFixture::standard().unwrap();
        let db = TaxaDb::open(fixture.path()).unwrap();

        let lineage = db.lineage(TaxonId(562)).unwrap();
        let names: Vec<&str> = lineage.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cellular organisms",
                "Bacteria",
                "Pseudomonadota",
                "Gammaproteobacteria",
                "Enterobacterales",
                "Enterobacteriaceae",
                "Escherichia",
                "Escherichia coli",
            ]
        );
        assert_eq!(lineage[1].rank, "superkingdom");
        assert_eq!(lineage.last().unwrap().taxid, TaxonId(562));
    }

    #[test]
    fn test_lineage_of_unknown_taxid_is_empty() {
        let fixture = TaxadbFixture::standard().unwrap();
        let db = TaxaDb::open(fixture.path()).unwrap();

        assert!(db.lineage(TaxonId(424242)).unwrap().is_empty());
        assert!(db.lineage(TaxonId::ROOT).unwrap().is_empty());
    }

    /// Counts lineage queries to check the per-taxid cache
    struct CountingLookup {
        inner: TaxaDb,
        lineage_calls: RefCell<usize>,
        batches: RefCell<Vec<usize>>,
    }

    impl TaxonomyLookup for CountingLookup {
        fn taxids(&self, accessions: &[String]) -> MetataxResult<Vec<(String, TaxonId)>> {
            self.batches.borrow_mut().push(accessions.len());
            self.inner.taxids(accessions)
        }

        fn lineage(&self, taxid: TaxonId) -> MetataxResult<Vec<LineageNode>> {
            *self.lineage_calls.borrow_mut() += 1;
            self.inner.lineage(taxid)
        }
    }

    #[test]
    fn test_resolve_accessions() {
        let fixture = TaxadbFixture::standard().unwrap();
        let lookup = CountingLookup {
            inner: TaxaDb::open(fixture.path()).unwrap(),
            lineage_calls: RefCell::new(0),
            batches: RefCell::new(Vec::new()),
        };

        let accessions = ids(&[
            "NC_000913",
            "U00096",
            "NC_000913",
            "MISSING",
            "ORPHAN1",
            "CP009072",
        ]);
        let mut progress = Vec::new();
        let resolution = resolve_accessions(&lookup, &accessions, 2, |n| progress.push(n)).unwrap();

        let resolved: Vec<&str> = resolution.resolved.iter().map(|r| r.accession.as_str()).collect();
        assert_eq!(resolved, vec!["NC_000913", "U00096", "CP009072"]);
        assert_eq!(resolution.unknown_accessions, 1);
        assert_eq!(resolution.missing_lineages, 1);
        assert_eq!(*lookup.batches.borrow(), vec![2, 2, 1]);
        assert_eq!(progress, vec![2, 4, 5]);
        // NC_000913 and U00096 share taxid 511145
        assert_eq!(*lookup.lineage_calls.borrow(), 3);
    }

    #[test]
    fn test_resolved_lineage_renderings() {
        let fixture = TaxadbFixture::standard().unwrap();
        let db = TaxaDb::open(fixture.path()).unwrap();
        let resolution = resolve_accessions(&db, &ids(&["NC_000913"]), 999, |_| {}).unwrap();
        let resolved = &resolution.resolved[0];

        assert_eq!(
            resolved.lineage_names().to_string(),
            "cellular organisms;Bacteria;Pseudomonadota;Gammaproteobacteria;Enterobacterales;\
             Enterobacteriaceae;Escherichia;Escherichia coli;Escherichia coli K-12"
        );
        assert_eq!(
            resolved.standard_lineage().to_string(),
            "Bacteria;NA;Pseudomonadota;Gammaproteobacteria;Enterobacterales;\
             Enterobacteriaceae;Escherichia;Escherichia coli"
        );
    }
}
