//! Splitting a multi-FASTA file into chunk files.

use crate::formats::fasta::{count_records, FastaReader, FastaWriter, DEFAULT_LINE_WIDTH};
use metatax_core::{MetataxError, MetataxResult};
use std::path::{Path, PathBuf};

/// Bytes in one gigabyte as used by size-based splitting
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// How records are distributed over chunk files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkPlan {
    /// Fixed number of chunks with balanced record counts
    ByCount { chunks: usize },
    /// A new chunk starts once the current one holds `max_bytes`
    BySize { max_bytes: u64 },
}

impl ChunkPlan {
    pub fn by_count(chunks: usize) -> MetataxResult<Self> {
        if chunks == 0 {
            return Err(MetataxError::InvalidInput(
                "number of chunks must be at least 1".to_string(),
            ));
        }
        Ok(ChunkPlan::ByCount { chunks })
    }

    /// Size threshold in gigabytes, fractions allowed
    pub fn by_size_gb(gigabytes: f64) -> MetataxResult<Self> {
        if !gigabytes.is_finite() || gigabytes <= 0.0 {
            return Err(MetataxError::InvalidInput(format!(
                "chunk size must be a positive number of gigabytes, got {}",
                gigabytes
            )));
        }
        let max_bytes = (gigabytes * BYTES_PER_GB).ceil().max(1.0) as u64;
        Ok(ChunkPlan::BySize { max_bytes })
    }
}

/// Record counts for `min(chunks, total)` chunks that differ by at most one,
/// larger chunks first
pub fn balanced_chunk_sizes(total: usize, chunks: usize) -> Vec<usize> {
    let chunks = chunks.min(total);
    if chunks == 0 {
        return Vec::new();
    }
    let base = total / chunks;
    let extra = total % chunks;
    (0..chunks)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Path of chunk `index` (1-based): `reads.fasta` -> `<dir>/reads_1.fasta`.
/// A trailing `.gz` stays last: `reads.fa.gz` -> `reads_1.fa.gz`.
pub fn chunk_path(input: &Path, output_dir: &Path, index: usize) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chunk".to_string());

    let (base, gz) = match name.strip_suffix(".gz") {
        Some(base) => (base, ".gz"),
        None => (name.as_str(), ""),
    };
    let (stem, ext) = match base.rfind('.') {
        Some(dot) if dot > 0 => base.split_at(dot),
        _ => (base, ""),
    };

    output_dir.join(format!("{}_{}{}{}", stem, index, ext, gz))
}

/// One written chunk file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub path: PathBuf,
    pub records: usize,
    /// Uncompressed FASTA bytes
    pub bytes: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub records: usize,
    pub chunks: Vec<ChunkSummary>,
}

/// Streams a FASTA file into chunk files according to a [`ChunkPlan`].
///
/// Chunk files are only created when a record is about to be written into
/// them, so an empty input produces no files.
pub struct FastaSplitter {
    plan: ChunkPlan,
    output_dir: PathBuf,
    line_width: usize,
}

impl FastaSplitter {
    pub fn new(plan: ChunkPlan, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            plan,
            output_dir: output_dir.into(),
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn plan(&self) -> ChunkPlan {
        self.plan
    }

    /// Count the input records, then split
    pub fn split(&self, input: &Path, on_record: impl FnMut(usize)) -> MetataxResult<SplitSummary> {
        let total = match self.plan {
            ChunkPlan::ByCount { .. } => count_records(input)?,
            ChunkPlan::BySize { .. } => 0,
        };
        self.split_counted(input, total, on_record)
    }

    /// Split when the record count is already known. `total` is only
    /// consulted by count-based plans. `on_record` receives the number of
    /// records written so far.
    pub fn split_counted(
        &self,
        input: &Path,
        total: usize,
        mut on_record: impl FnMut(usize),
    ) -> MetataxResult<SplitSummary> {
        if self.line_width == 0 {
            return Err(MetataxError::InvalidInput(
                "line width must be at least 1".to_string(),
            ));
        }
        std::fs::create_dir_all(&self.output_dir)?;

        let quotas = match self.plan {
            ChunkPlan::ByCount { chunks } => balanced_chunk_sizes(total, chunks),
            ChunkPlan::BySize { .. } => Vec::new(),
        };

        let mut summary = SplitSummary::default();
        let mut current: Option<FastaWriter> = None;

        for record in FastaReader::from_path(input)? {
            let record = record?;

            let full = current
                .as_ref()
                .map_or(false, |w| self.is_full(w, summary.chunks.len(), &quotas));
            if full {
                if let Some(writer) = current.take() {
                    summary.chunks.push(close(writer)?);
                }
            }

            if current.is_none() {
                let path = chunk_path(input, &self.output_dir, summary.chunks.len() + 1);
                tracing::debug!("Starting chunk {}", path.display());
                current = Some(FastaWriter::create(&path, self.line_width)?);
            }
            if let Some(writer) = current.as_mut() {
                writer.write_record(&record)?;
            }

            summary.records += 1;
            on_record(summary.records);
        }

        if let Some(writer) = current.take() {
            summary.chunks.push(close(writer)?);
        }

        if summary.records == 0 {
            tracing::warn!("No FASTA records in {}", input.display());
        } else {
            tracing::info!(
                "Split {} records from {} into {} chunks",
                summary.records,
                input.display(),
                summary.chunks.len()
            );
        }
        Ok(summary)
    }

    fn is_full(&self, writer: &FastaWriter, index: usize, quotas: &[usize]) -> bool {
        match self.plan {
            ChunkPlan::BySize { max_bytes } => writer.bytes_written() >= max_bytes,
            // the last chunk absorbs anything beyond the counted total
            ChunkPlan::ByCount { .. } => {
                index + 1 < quotas.len() && writer.records_written() >= quotas[index]
            }
        }
    }
}

fn close(writer: FastaWriter) -> MetataxResult<ChunkSummary> {
    let chunk = ChunkSummary {
        path: writer.path().to_path_buf(),
        records: writer.records_written(),
        bytes: writer.bytes_written(),
    };
    writer.finish()?;
    Ok(chunk)
}
