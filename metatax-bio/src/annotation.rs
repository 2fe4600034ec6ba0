//! Selection and rendering of taxonomic annotations from BLAST hits.
//!
//! Per query, hits below the coverage threshold are dropped, the rest are
//! ranked by `identity + coverage` and the best `nbest` are written with
//! their lineage, cut according to the lineage policy.

use crate::formats::blast::{BlastHit, BlastReader};
use crate::taxonomy::{AccessionTable, Lineage, LineagePolicy};
use indexmap::IndexMap;
use metatax_core::{MetataxError, MetataxResult};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Knobs of an annotation run
#[derive(Debug, Clone, Default)]
pub struct AnnotationOptions {
    /// Hits kept per query, 0 keeps all
    pub nbest: usize,
    /// Minimum query coverage (percent) for a hit to be considered
    pub min_coverage: f64,
    pub policy: LineagePolicy,
    pub sample_id: Option<String>,
    /// Append e-value and bit score columns
    pub extended: bool,
}

/// A BLAST hit paired with the lineage of its accession
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedHit<'t> {
    pub hit: BlastHit,
    pub lineage: Option<&'t Lineage>,
}

/// Counters reported after an annotation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub queries: usize,
    pub hits_read: usize,
    pub rows_written: usize,
    /// Written rows whose accession has no lineage in the table
    pub unannotated: usize,
}

/// Group the hits of a BLAST file by query, attaching lineages from `table`.
///
/// Queries keep their first-seen order, hits keep file order within a query.
pub fn read_hits_by_query<'t, P: AsRef<Path>>(
    path: P,
    table: &'t AccessionTable,
) -> MetataxResult<IndexMap<String, Vec<AnnotatedHit<'t>>>> {
    let path = path.as_ref();
    let grouped = group_by_query(BlastReader::from_path(path)?, table)?;
    if grouped.is_empty() {
        return Err(MetataxError::InvalidInput(format!(
            "nothing read from {}",
            path.display()
        )));
    }
    Ok(grouped)
}

/// Group already-parsed hits by query id
pub fn group_by_query<'t, I>(
    hits: I,
    table: &'t AccessionTable,
) -> MetataxResult<IndexMap<String, Vec<AnnotatedHit<'t>>>>
where
    I: IntoIterator<Item = MetataxResult<BlastHit>>,
{
    let mut grouped: IndexMap<String, Vec<AnnotatedHit<'t>>> = IndexMap::new();
    for hit in hits {
        let hit = hit?;
        let lineage = table.get(&hit.accession);
        grouped
            .entry(hit.query_id.clone())
            .or_default()
            .push(AnnotatedHit { hit, lineage });
    }
    Ok(grouped)
}

/// Coverage filter, stable descending sort on `identity + coverage`, best N
pub fn select_hits<'a, 't>(
    hits: &'a [AnnotatedHit<'t>],
    min_coverage: f64,
    nbest: usize,
) -> Vec<&'a AnnotatedHit<'t>> {
    let mut kept: Vec<&AnnotatedHit<'t>> = hits
        .iter()
        .filter(|h| h.hit.coverage >= min_coverage)
        .collect();

    kept.sort_by(|a, b| score(b).total_cmp(&score(a)));

    if nbest > 0 {
        kept.truncate(nbest);
    }
    kept
}

fn score(hit: &AnnotatedHit<'_>) -> f64 {
    hit.hit.identity + hit.hit.coverage
}

/// Shortest round-trip decimal form, always with a decimal point
pub fn format_float(value: f64) -> String {
    let s = format!("{:?}", value);
    if value.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{}.0", s)
    } else {
        s
    }
}

fn query_label(query: &str, sample_id: Option<&str>) -> String {
    match sample_id {
        Some(id) => format!("{}_{}", id, query),
        None => query.to_string(),
    }
}

/// Write one tab-separated row per selected hit, queries in map order
pub fn write_annotations<W: Write>(
    writer: &mut W,
    grouped: &IndexMap<String, Vec<AnnotatedHit<'_>>>,
    options: &AnnotationOptions,
) -> MetataxResult<AnnotationSummary> {
    let mut summary = AnnotationSummary {
        queries: grouped.len(),
        ..Default::default()
    };

    for (query, hits) in grouped {
        summary.hits_read += hits.len();
        let label = query_label(query, options.sample_id.as_deref());

        for annotated in select_hits(hits, options.min_coverage, options.nbest) {
            let hit = &annotated.hit;
            let ranks = options.policy.render(annotated.lineage, hit.identity);

            let mut row = vec![
                label.clone(),
                hit.accession.clone(),
                format_float(hit.identity),
                format_float(hit.coverage),
            ];
            row.extend(ranks.iter().map(|r| r.to_string()));
            if options.extended {
                row.push(format_float(hit.evalue));
                row.push(format_float(hit.bit_score));
            }
            writeln!(writer, "{}", row.join("\t"))?;

            summary.rows_written += 1;
            if annotated.lineage.map_or(true, Lineage::is_empty) {
                summary.unannotated += 1;
            }
        }
    }

    Ok(summary)
}

/// Read BLAST hits and the accession table, write annotations to `output`
pub fn annotate_file(
    blast_path: &Path,
    table_path: &Path,
    output: &Path,
    options: &AnnotationOptions,
) -> MetataxResult<AnnotationSummary> {
    let table = AccessionTable::load(table_path)?;
    let grouped = read_hits_by_query(blast_path, &table)?;
    tracing::debug!(
        "{} queries read from {}",
        grouped.len(),
        blast_path.display()
    );

    let mut writer = BufWriter::new(File::create(output)?);
    let summary = write_annotations(&mut writer, &grouped, options)?;
    writer.flush()?;

    tracing::info!(
        "Wrote {} annotation rows for {} queries to {}",
        summary.rows_written,
        summary.queries,
        output.display()
    );
    Ok(summary)
}

/// Annotate hits from any reader; `path` only labels parse errors
pub fn annotate_reader<R: BufRead, W: Write>(
    reader: R,
    path: &Path,
    table: &AccessionTable,
    writer: &mut W,
    options: &AnnotationOptions,
) -> MetataxResult<AnnotationSummary> {
    let grouped = group_by_query(BlastReader::new(reader, path), table)?;
    write_annotations(writer, &grouped, options)
}
