use crate::cli::{existing_file, positive_gigabytes};
use crate::cli::output::*;
use crate::cli::progress::create_progress_bar;
use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use metatax_bio::formats::count_records;
use metatax_bio::split::{balanced_chunk_sizes, ChunkPlan, FastaSplitter};
use metatax_core::Config;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("plan").required(true).args(["chunks", "max_file_size"])))]
pub struct SplitArgs {
    /// Input FASTA file to split (.gz supported)
    #[arg(short, long = "input-file", value_name = "FILE", value_parser = existing_file)]
    pub input: PathBuf,

    /// Number of chunks
    #[arg(short = 'n', long, value_name = "K", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunks: Option<u64>,

    /// Approximate size of each chunk in GB instead of a chunk count
    #[arg(
        short = 'm',
        long,
        visible_alias = "max_file_size",
        value_name = "GB",
        value_parser = positive_gigabytes
    )]
    pub max_file_size: Option<f64>,

    /// Output directory
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Residues per sequence line in the chunk files
    #[arg(long, value_name = "W")]
    pub line_width: Option<usize>,
}

impl SplitArgs {
    fn plan(&self) -> Result<ChunkPlan> {
        let plan = match (self.chunks, self.max_file_size) {
            (Some(chunks), _) => ChunkPlan::by_count(usize::try_from(chunks)?)?,
            (None, Some(gigabytes)) => ChunkPlan::by_size_gb(gigabytes)?,
            (None, None) => anyhow::bail!("either --chunks or --max-file-size is required"),
        };
        Ok(plan)
    }
}

pub fn run(args: SplitArgs, config: &Config) -> Result<()> {
    let plan = args.plan()?;
    let line_width = args.line_width.unwrap_or(config.split.line_width);

    action(&format!("Splitting {}", args.input.display()));
    let total = count_records(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info(&format!("{} records", format_number(total)));

    match plan {
        ChunkPlan::ByCount { chunks } => {
            let sizes = balanced_chunk_sizes(total, chunks);
            if let (Some(first), Some(last)) = (sizes.first(), sizes.last()) {
                info(&format!(
                    "{} chunks of {} to {} records",
                    sizes.len(),
                    format_number(*last),
                    format_number(*first)
                ));
            }
        }
        ChunkPlan::BySize { max_bytes } => {
            info(&format!("Chunks of about {}", format_bytes(max_bytes)));
        }
    }

    let pb = create_progress_bar(total as u64, "Writing chunks");
    let summary = FastaSplitter::new(plan, &args.output_dir)
        .with_line_width(line_width)
        .split_counted(&args.input, total, |n| pb.set_position(n as u64))
        .with_context(|| format!("Failed to split {}", args.input.display()))?;
    pb.finish_and_clear();

    if summary.chunks.is_empty() {
        warning(&format!("No FASTA records in {}, nothing written", args.input.display()));
        return Ok(());
    }

    section_header("Chunks");
    let count = summary.chunks.len();
    for (i, chunk) in summary.chunks.iter().enumerate() {
        tree_section(
            &chunk.path.display().to_string(),
            vec![
                ("Records", format_number(chunk.records)),
                ("Size", format_bytes(chunk.bytes)),
            ],
            i + 1 == count,
        );
    }
    success(&format!(
        "Done: {} records in {} chunks",
        format_number(summary.records),
        count
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn try_parse(extra: &[&str]) -> Result<SplitArgs, clap::Error> {
        let file = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let mut argv = vec!["metatax", "split", "-i", file];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).map(|cli| match cli.command {
            Commands::Split(args) => args,
            _ => unreachable!(),
        })
    }

    #[test]
    fn test_plan_requires_exactly_one_mode() {
        assert!(try_parse(&[]).is_err());
        assert!(try_parse(&["-n", "3", "-m", "1"]).is_err());
        assert_eq!(
            try_parse(&["-n", "3"]).unwrap().plan().unwrap(),
            ChunkPlan::ByCount { chunks: 3 }
        );
        assert_eq!(
            try_parse(&["-m", "0.5"]).unwrap().plan().unwrap(),
            ChunkPlan::BySize { max_bytes: 536_870_912 }
        );
    }

    #[test]
    fn test_invalid_plans_are_usage_errors() {
        for extra in [&["-n", "0"][..], &["-m", "0"][..], &["--max-file-size=-2"][..], &["-m", "inf"][..]] {
            let err = try_parse(extra).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{:?}", extra);
        }
    }
}
