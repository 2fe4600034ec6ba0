use super::lineage::Lineage;
use super::taxadb::ResolvedAccession;
use crate::formats::open_input;
use metatax_core::{MetataxError, MetataxResult};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// Header line of an accession table
pub const TABLE_HEADER: &str = "accession\ttaxid\tAnnotation";

/// In-memory accession -> lineage table.
///
/// Loaded from a tab-separated file whose first line is a header:
/// `accession <TAB> taxid <TAB> lineage`. This is the layout written by
/// `metatax lineage`.
#[derive(Debug, Default)]
pub struct AccessionTable {
    lineages: HashMap<String, Lineage>,
}

impl AccessionTable {
    pub fn load<P: AsRef<Path>>(path: P) -> MetataxResult<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(open_input(path)?, path)?;
        tracing::info!(
            "Loaded {} accession annotations from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// `path` is only used to label parse errors
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> MetataxResult<Self> {
        let mut lineages = HashMap::new();

        for (idx, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(accession), Some(_taxid), Some(lineage)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(MetataxError::parse_at(
                    path,
                    idx + 1,
                    "expected accession, taxid and lineage columns",
                ));
            };
            lineages.insert(accession.to_string(), Lineage::parse(lineage));
        }

        Ok(Self { lineages })
    }

    pub fn insert(&mut self, accession: impl Into<String>, lineage: Lineage) {
        self.lineages.insert(accession.into(), lineage);
    }

    pub fn get(&self, accession: &str) -> Option<&Lineage> {
        self.lineages.get(accession)
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

/// Write resolved accessions as an accession table, header first.
///
/// With `standard_ranks` the lineage is laid out on the eight standard
/// ranks, otherwise every ancestor name is written. Returns the number of
/// rows written.
pub fn write_table<W: Write>(
    writer: &mut W,
    resolved: &[ResolvedAccession],
    standard_ranks: bool,
) -> MetataxResult<usize> {
    writeln!(writer, "{}", TABLE_HEADER)?;
    for entry in resolved {
        let lineage = if standard_ranks {
            entry.standard_lineage()
        } else {
            entry.lineage_names()
        };
        writeln!(writer, "{}\t{}\t{}", entry.accession, entry.taxid, lineage)?;
    }
    Ok(resolved.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::LineageNode;
    use metatax_core::TaxonId;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_load_skips_header_and_blank_lines() {
        let input = "accession\ttaxid\tAnnotation\n\
                     NC_000913\t511145\tBacteria;NA;Proteobacteria\n\
                     \n\
                     AB000001\t9606\tEukaryota;Metazoa;Chordata\r\n";
        let table = AccessionTable::from_reader(Cursor::new(input), Path::new("table.tsv")).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("accession").is_none());
        assert_eq!(
            table.get("NC_000913").unwrap().to_string(),
            "Bacteria;NA;Proteobacteria"
        );
        assert_eq!(
            table.get("AB000001").unwrap().to_string(),
            "Eukaryota;Metazoa;Chordata"
        );
    }

    #[test]
    fn test_later_rows_overwrite_earlier_ones() {
        let input = "header\nX1\t1\tA;B\nX1\t2\tC;D\n";
        let table = AccessionTable::from_reader(Cursor::new(input), Path::new("t.tsv")).unwrap();
        assert_eq!(table.get("X1").unwrap().to_string(), "C;D");
    }

    #[test]
    fn test_short_row_is_an_error() {
        let input = "header\nX1\t1\n";
        let err = AccessionTable::from_reader(Cursor::new(input), Path::new("t.tsv")).unwrap_err();
        assert!(err.to_string().contains("t.tsv: line 2"));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let table = AccessionTable::from_reader(Cursor::new("a\tb\tc\n"), Path::new("t.tsv")).unwrap();
        assert!(table.is_empty());
    }

    fn node(taxid: u32, name: &str, rank: &str) -> LineageNode {
        LineageNode {
            taxid: TaxonId(taxid),
            name: name.to_string(),
            rank: rank.to_string(),
        }
    }

    #[test]
    fn test_written_table_loads_back() {
        let resolved = vec![ResolvedAccession {
            accession: "AB000001".to_string(),
            taxid: TaxonId(9606),
            lineage: vec![
                node(2759, "Eukaryota", "superkingdom"),
                node(33208, "Metazoa", "kingdom"),
                node(7711, "Chordata", "phylum"),
                node(40674, "Mammalia", "class"),
                node(9443, "Primates", "order"),
                node(9604, "Hominidae", "family"),
                node(9605, "Homo", "genus"),
                node(9606, "Homo sapiens", "species"),
            ],
        }];

        for standard_ranks in [false, true] {
            let mut out = Vec::new();
            assert_eq!(write_table(&mut out, &resolved, standard_ranks).unwrap(), 1);

            let text = String::from_utf8(out).unwrap();
            assert!(text.starts_with("accession\ttaxid\tAnnotation\nAB000001\t9606\tEukaryota;Metazoa;"));

            let table = AccessionTable::from_reader(Cursor::new(text), Path::new("t.tsv")).unwrap();
            assert_eq!(table.get("AB000001").unwrap().len(), 8);
        }
    }
}
