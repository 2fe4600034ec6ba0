//! BLAST tabular output as produced by the annotation pipeline.
//!
//! The pipeline runs BLAST with
//! `-outfmt "6 qseqid sseqid qlen length mismatch gapopen qstart qend sstart send pident qcovs evalue bitscore"`,
//! so identity, coverage, e-value and bit score sit in columns 10 to 13.
//! Subject ids are `|`-separated with the accession in the third field.

use super::open_input;
use metatax_core::{MetataxError, MetataxResult};
use std::io::BufRead;
use std::path::{Path, PathBuf};

const QUERY_COLUMN: usize = 0;
const SUBJECT_COLUMN: usize = 1;
const IDENTITY_COLUMN: usize = 10;
const COVERAGE_COLUMN: usize = 11;
const EVALUE_COLUMN: usize = 12;
const BITSCORE_COLUMN: usize = 13;

/// Minimum number of tab-separated columns in a hit line
pub const MIN_COLUMNS: usize = BITSCORE_COLUMN + 1;

/// A single BLAST hit
#[derive(Debug, Clone, PartialEq)]
pub struct BlastHit {
    pub query_id: String,
    pub subject_id: String,
    /// Version-less accession taken from the subject id
    pub accession: String,
    /// Percentage of identical matches
    pub identity: f64,
    /// Query coverage (percent)
    pub coverage: f64,
    pub evalue: f64,
    pub bit_score: f64,
}

impl BlastHit {
    /// Parse one tab-separated hit line
    pub fn parse_line(line: &str, line_no: usize, path: &Path) -> MetataxResult<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_COLUMNS {
            return Err(MetataxError::parse_at(
                path,
                line_no,
                format!(
                    "expected at least {} tab-separated columns, found {}",
                    MIN_COLUMNS,
                    fields.len()
                ),
            ));
        }

        let number = |idx: usize, name: &str| -> MetataxResult<f64> {
            fields[idx].trim().parse::<f64>().map_err(|_| {
                MetataxError::parse_at(
                    path,
                    line_no,
                    format!("invalid {} value '{}'", name, fields[idx]),
                )
            })
        };

        let subject_id = fields[SUBJECT_COLUMN];
        let accession = extract_accession(subject_id).ok_or_else(|| {
            MetataxError::parse_at(
                path,
                line_no,
                format!("no accession field in hit id '{}'", subject_id),
            )
        })?;

        Ok(Self {
            query_id: fields[QUERY_COLUMN].to_string(),
            subject_id: subject_id.to_string(),
            accession: accession.to_string(),
            identity: number(IDENTITY_COLUMN, "identity")?,
            coverage: number(COVERAGE_COLUMN, "coverage")?,
            evalue: number(EVALUE_COLUMN, "e-value")?,
            bit_score: number(BITSCORE_COLUMN, "bit score")?,
        })
    }
}

/// Extract the accession from a `|`-separated hit id: the third field,
/// without its version suffix (`ref|NC_000913|NC_000913.3|` -> `NC_000913`).
pub fn extract_accession(subject_id: &str) -> Option<&str> {
    let field = subject_id.split('|').nth(2)?;
    Some(field.split('.').next().unwrap_or(field))
}

fn is_skipped(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

/// Streaming reader over the hits of a BLAST tabular file.
/// Blank lines and `#` comment lines are skipped.
pub struct BlastReader<R: BufRead> {
    reader: R,
    path: PathBuf,
    line: String,
    line_no: usize,
}

impl BlastReader<Box<dyn BufRead>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> MetataxResult<Self> {
        let path = path.as_ref();
        Ok(Self::new(open_input(path)?, path))
    }
}

impl<R: BufRead> BlastReader<R> {
    /// `path` is only used to label parse errors
    pub fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for BlastReader<R> {
    type Item = MetataxResult<BlastHit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(MetataxError::Io(e))),
            }

            let line = self.line.trim_end_matches(['\n', '\r']);
            if is_skipped(line) {
                continue;
            }
            return Some(BlastHit::parse_line(line, self.line_no, &self.path));
        }
    }
}

/// Collect the accessions of every `|`-style hit id of a BLAST output.
///
/// The hit id is the second whitespace-separated field. Lines without a `|`
/// are skipped along with comments and blank lines. Reading no accession at
/// all is an error.
pub fn scan_accessions<P: AsRef<Path>>(path: P) -> MetataxResult<Vec<String>> {
    let path = path.as_ref();
    let accessions = scan_accessions_from(open_input(path)?, path)?;
    if accessions.is_empty() {
        return Err(MetataxError::InvalidInput(format!(
            "No accession id read from {}",
            path.display()
        )));
    }
    Ok(accessions)
}

fn scan_accessions_from<R: BufRead>(reader: R, path: &Path) -> MetataxResult<Vec<String>> {
    let mut accessions = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skipped(&line) || !line.contains('|') {
            continue;
        }

        let accession = line
            .split_whitespace()
            .nth(1)
            .and_then(extract_accession)
            .ok_or_else(|| {
                MetataxError::parse_at(path, idx + 1, format!("malformed hit line '{}'", line))
            })?;
        accessions.push(accession.to_string());
    }

    tracing::debug!("Scanned {} accessions from {}", accessions.len(), path.display());
    Ok(accessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const HIT: &str = "contig_1\tgi|556503834|NC_000913.3|\t4641652\t1500\t3\t0\t1\t1500\t10\t1509\t99.80\t100\t0.0\t2761";

    #[test]
    fn test_extract_accession() {
        assert_eq!(extract_accession("gi|556503834|NC_000913.3|"), Some("NC_000913"));
        assert_eq!(extract_accession("ref|x|AB123"), Some("AB123"));
        assert_eq!(extract_accession("a|b|CP0001.2.1"), Some("CP0001"));
        assert_eq!(extract_accession("NC_000913.3"), None);
        assert_eq!(extract_accession("gi|123"), None);
    }

    #[test]
    fn test_parse_line() {
        let hit = BlastHit::parse_line(HIT, 1, Path::new("hits.m8")).unwrap();

        assert_eq!(hit.query_id, "contig_1");
        assert_eq!(hit.subject_id, "gi|556503834|NC_000913.3|");
        assert_eq!(hit.accession, "NC_000913");
        assert_eq!(hit.identity, 99.8);
        assert_eq!(hit.coverage, 100.0);
        assert_eq!(hit.evalue, 0.0);
        assert_eq!(hit.bit_score, 2761.0);
    }

    #[test]
    fn test_parse_line_too_few_columns() {
        let err = BlastHit::parse_line("q1\tgi|1|AB1.1\t98.0", 7, Path::new("hits.m8")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hits.m8: line 7"), "{}", msg);
        assert!(msg.contains("found 3"), "{}", msg);
    }

    #[test]
    fn test_parse_line_bad_number() {
        let line = HIT.replace("99.80", "high");
        let err = BlastHit::parse_line(&line, 2, Path::new("hits.m8")).unwrap_err();
        assert!(err.to_string().contains("invalid identity value 'high'"));
    }

    #[test]
    fn test_parse_line_without_accession_field() {
        let line = HIT.replace("gi|556503834|NC_000913.3|", "NC_000913.3");
        let err = BlastHit::parse_line(&line, 3, Path::new("hits.m8")).unwrap_err();
        assert!(matches!(err, MetataxError::Parse(_)));
    }

    #[test]
    fn test_reader_skips_comments_and_blank_lines() {
        let input = format!("# BLASTN 2.15.0+\n\n{}\n{}\r\n", HIT, HIT.replace("contig_1", "contig_2"));
        let hits: Vec<BlastHit> = BlastReader::new(Cursor::new(input), Path::new("hits.m8"))
            .collect::<MetataxResult<_>>()
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].query_id, "contig_2");
        assert_eq!(hits[1].bit_score, 2761.0);
    }

    #[test]
    fn test_reader_reports_physical_line_number() {
        let input = format!("# header\n{}\nbroken\n", HIT);
        let result: MetataxResult<Vec<BlastHit>> =
            BlastReader::new(Cursor::new(input), Path::new("hits.m8")).collect();
        assert!(result.unwrap_err().to_string().contains("line 3"));
    }

    #[test]
    fn test_scan_accessions() {
        let input = "# comment\n\
                     \n\
                     q1 gi|1|AB000001.1| 99.0\n\
                     q2\tlocal_hit_without_pipes\t80.0\n\
                     q3\tgi|2|CP000002.3|\t95.0\n\
                     q4 gi|1|AB000001.2|\n";
        let accessions = scan_accessions_from(Cursor::new(input), Path::new("hits.tsv")).unwrap();
        assert_eq!(accessions, vec!["AB000001", "CP000002", "AB000001"]);
    }

    #[test]
    fn test_scan_accessions_malformed_line() {
        let input = "q1 gi|12\n";
        let err = scan_accessions_from(Cursor::new(input), Path::new("hits.tsv")).unwrap_err();
        assert!(err.to_string().contains("malformed hit line 'q1 gi|12'"));
    }

    #[test]
    fn test_scan_accessions_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        std::fs::write(&path, "# nothing\n").unwrap();

        let err = scan_accessions(&path).unwrap_err();
        assert!(err.to_string().contains("No accession id read from"));
    }
}
