//! Sample BLAST, accession table and FASTA data

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;

pub const ECOLI_LINEAGE: &str = "Bacteria;NA;Pseudomonadota;Gammaproteobacteria;\
Enterobacterales;Enterobacteriaceae;Escherichia;Escherichia coli";

pub const BSUB_LINEAGE: &str =
    "Bacteria;NA;Bacillota;Bacilli;Bacillales;Bacillaceae;Bacillus;Bacillus subtilis";

/// One 14-column BLAST tabular line with fixed e-value (1e-50) and bit score (250)
pub fn blast_line(query: &str, subject: &str, identity: f64, coverage: f64) -> String {
    format!(
        "{}\t{}\t1500\t1480\t5\t0\t1\t1480\t101\t1580\t{}\t{}\t1e-50\t250",
        query, subject, identity, coverage
    )
}

/// BLAST output covering three queries, an unannotated accession and a
/// low-coverage hit
pub fn sample_blast_output() -> String {
    let lines = [
        "# BLASTN 2.15.0+".to_string(),
        blast_line("contig_1", "gi|556503834|NC_000913.3|", 99.5, 100.0),
        blast_line("contig_1", "gi|729115219|CP009072.1|", 85.0, 90.0),
        blast_line("contig_2", "gi|729115219|CP009072.1|", 97.2, 98.0),
        blast_line("contig_2", "gi|000000001|UNKNOWN1.1|", 70.0, 100.0),
        blast_line("contig_3", "gi|556503834|NC_000913.3|", 78.0, 60.0),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Accession table in the layout written by `metatax lineage`
pub fn sample_accession_table() -> String {
    format!(
        "accession\ttaxid\tAnnotation\nNC_000913\t511145\t{}\nCP009072\t1423\t{}\n",
        ECOLI_LINEAGE, BSUB_LINEAGE
    )
}

/// `count` FASTA records with seeded random sequences of varying length,
/// wrapped at 60 columns
pub fn sample_fasta(count: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let bases = [b'A', b'C', b'G', b'T'];
    let mut out = String::new();

    for i in 0..count {
        let length = 40 + (i * 37) % 200;
        let sequence: Vec<u8> = (0..length).map(|_| bases[rng.gen_range(0..4)]).collect();

        let _ = writeln!(out, ">seq_{} sample sequence {}", i + 1, i + 1);
        for line in sequence.chunks(60) {
            out.push_str(&String::from_utf8_lossy(line));
            out.push('\n');
        }
    }
    out
}
