use crate::cli::existing_file;
use crate::cli::output::*;
use crate::cli::progress::{create_progress_bar, create_spinner};
use anyhow::{Context, Result};
use clap::Args;
use metatax_bio::formats::scan_accessions;
use metatax_bio::taxonomy::{resolve_accessions, write_table, TaxaDb};
use metatax_core::{Config, MAX_LOOKUP_BATCH};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LineageArgs {
    /// BLAST output whose hit ids carry accessions
    #[arg(short, long, value_name = "FILE", value_parser = existing_file)]
    pub input: PathBuf,

    /// taxadb SQLite database
    #[arg(short = 'd', long = "taxadb", value_name = "FILE", value_parser = existing_file)]
    pub taxadb: PathBuf,

    /// Output accession table
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Lay lineages out on the eight standard ranks, NA where missing
    #[arg(long)]
    pub standard_ranks: bool,

    /// Accessions per database query (1-999)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=MAX_LOOKUP_BATCH as i64))]
    pub batch_size: Option<u16>,
}

pub fn run(args: LineageArgs, config: &Config) -> Result<()> {
    let batch_size = args
        .batch_size
        .map(usize::from)
        .unwrap_or(config.lineage.batch_size);
    let standard_ranks = args.standard_ranks || config.lineage.standard_ranks;

    action("STEP 1: reading accessions");
    let spinner = create_spinner(&format!("Scanning {}", args.input.display()));
    let accessions = scan_accessions(&args.input)
        .with_context(|| format!("Failed to read accessions from {}", args.input.display()))?;
    spinner.finish_and_clear();

    let distinct = accessions.iter().collect::<HashSet<_>>().len();
    info(&format!(
        "Found {} ids ({} distinct)",
        format_number(accessions.len()),
        format_number(distinct)
    ));

    action("STEP 2: querying the taxonomy database");
    let db = TaxaDb::open(&args.taxadb)?;
    let pb = create_progress_bar(distinct as u64, "Resolving accessions");
    let resolution = resolve_accessions(&db, &accessions, batch_size, |n| pb.set_position(n as u64))?;
    pb.finish_and_clear();

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    let rows = write_table(&mut writer, &resolution.resolved, standard_ranks)?;
    writer.flush()?;

    tree_section(
        "Lineages",
        vec![
            ("Resolved", format_number(rows)),
            ("Unknown accessions", format_number(resolution.unknown_accessions)),
            ("Taxids without lineage", format_number(resolution.missing_lineages)),
        ],
        true,
    );
    if rows == 0 {
        warning("No accession could be resolved");
    }
    success(&format!("DONE: lineages written to {}", args.output.display()));
    Ok(())
}
