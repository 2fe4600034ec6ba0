pub mod blast;
pub mod fasta;

pub use blast::{extract_accession, scan_accessions, BlastHit, BlastReader};
pub use fasta::{count_records, FastaReader, FastaRecord, FastaWriter};

use flate2::read::MultiGzDecoder;
use metatax_core::MetataxResult;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Whether a path names a gzip-compressed file
pub fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Open a text input for reading, decompressing `.gz` files transparently
pub fn open_input<P: AsRef<Path>>(path: P) -> MetataxResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Strip trailing whitespace (including `\r`) from a raw line
pub(crate) fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|c| !c.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_trim_end() {
        assert_eq!(trim_end(b"ACGT\r\n"), b"ACGT");
        assert_eq!(trim_end(b">seq1 desc  \n"), b">seq1 desc");
        assert_eq!(trim_end(b"  \n"), b"");
        assert_eq!(trim_end(b""), b"");
    }

    #[test]
    fn test_open_input_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.m8.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"q1\ts1\n").unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_input(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "q1\ts1\n");
    }

    #[test]
    fn test_open_missing_input() {
        let result = open_input("/nonexistent/input.fasta");
        assert!(matches!(result, Err(metatax_core::MetataxError::Io(_))));
    }
}
