use crate::cli::output::*;
use crate::cli::{existing_dir, existing_file};
use anyhow::{Context, Result};
use clap::Args;
use metatax_bio::annotation::{annotate_file, AnnotationOptions};
use metatax_bio::taxonomy::{IdentityTiers, LineagePolicy};
use metatax_core::Config;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// BLAST result file in tabular (m8) mode
    #[arg(short = 'f', long = "blast", value_name = "FILE", value_parser = existing_file)]
    pub blast: PathBuf,

    /// Accession to taxonomy table (accession, taxid, lineage)
    #[arg(short = 'g', long = "taxonomy", value_name = "FILE", value_parser = existing_file)]
    pub taxonomy: PathBuf,

    /// Number of best hits kept per query (0 keeps all)
    #[arg(long, visible_alias = "nb", value_name = "N")]
    pub nbest: Option<usize>,

    /// Minimum query coverage (percent) of a hit
    #[arg(long, visible_alias = "fc", value_name = "PERCENT")]
    pub min_coverage: Option<f64>,

    /// Cut lineages according to hit identity
    /// (superkingdom >= 0, phylum >= 65, class >= 75, genus >= 85, species >= 95)
    #[arg(long, visible_alias = "fi", overrides_with = "no_tiered_identity")]
    pub tiered_identity: bool,

    /// Keep full lineages even when the configuration enables tiering
    #[arg(long, overrides_with = "tiered_identity")]
    pub no_tiered_identity: bool,

    /// Sample identifier prefixed to query names as <SAMPLE>_
    #[arg(long, visible_alias = "id", value_name = "SAMPLE")]
    pub sample_id: Option<String>,

    /// Output file (defaults to <RESULTS>/ncbi_taxonomic_annotation.txt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Results directory
    #[arg(short, long, value_name = "DIR", default_value = ".", value_parser = existing_dir)]
    pub results: PathBuf,

    /// Append e-value and bit score columns
    #[arg(long)]
    pub extended: bool,
}

impl AnnotateArgs {
    fn options(&self, config: &Config) -> Result<AnnotationOptions> {
        let min_coverage = self.min_coverage.unwrap_or(config.annotate.min_coverage);
        if !min_coverage.is_finite() {
            anyhow::bail!("minimum coverage must be a finite number");
        }

        let tiered = match (self.tiered_identity, self.no_tiered_identity) {
            (true, _) => true,
            (_, true) => false,
            _ => config.annotate.tiered_identity,
        };
        let policy = if tiered {
            LineagePolicy::Tiered(IdentityTiers::new(config.annotate.identity_tiers.clone()))
        } else {
            LineagePolicy::Full
        };

        Ok(AnnotationOptions {
            nbest: self.nbest.unwrap_or(config.annotate.nbest),
            min_coverage,
            policy,
            sample_id: self.sample_id.clone(),
            extended: self.extended,
        })
    }

    fn output_path(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.results.join(&config.annotate.output_name))
    }
}

pub fn run(args: AnnotateArgs, config: &Config) -> Result<()> {
    let options = args.options(config)?;
    let output = args.output_path(config);

    action(&format!("Annotating {}", args.blast.display()));
    tracing::debug!("Annotation options: {:?}", options);

    let summary = annotate_file(&args.blast, &args.taxonomy, &output, &options)
        .with_context(|| format!("Failed to annotate {}", args.blast.display()))?;

    tree_section(
        "Annotation",
        vec![
            ("Queries", format_number(summary.queries)),
            ("Hits read", format_number(summary.hits_read)),
            ("Rows written", format_number(summary.rows_written)),
            ("Without lineage", format_number(summary.unannotated)),
        ],
        true,
    );
    if summary.rows_written == 0 {
        warning("No hit passed the coverage filter");
    }
    success(&format!("Annotations written to {}", output.display()));
    Ok(())
}
