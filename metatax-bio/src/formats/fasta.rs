use super::{is_gzipped, open_input, trim_end};
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use metatax_core::{MetataxError, MetataxResult};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default number of residues per sequence line
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// A single FASTA entry: the raw header line without `>` and the joined
/// sequence. Headers are kept as bytes so they are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub header: Vec<u8>,
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    pub fn new(header: impl Into<Vec<u8>>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of bytes `write_to` produces for this record
    pub fn encoded_len(&self, line_width: usize) -> usize {
        let lines = self.sequence.len().div_ceil(line_width.max(1));
        1 + self.header.len() + 1 + self.sequence.len() + lines
    }

    /// Write the record with the sequence wrapped at `line_width` residues.
    /// Returns the number of bytes written.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W, line_width: usize) -> std::io::Result<usize> {
        writer.write_all(b">")?;
        writer.write_all(&self.header)?;
        writer.write_all(b"\n")?;

        for line in self.sequence.chunks(line_width.max(1)) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }

        Ok(self.encoded_len(line_width))
    }
}

/// Streaming FASTA parser over any buffered reader.
///
/// Header and sequence lines are right-trimmed; sequence lines are
/// concatenated as-is. Anything before the first header is ignored.
pub struct FastaReader<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    header: Option<Vec<u8>>,
    sequence: Vec<u8>,
}

impl FastaReader<Box<dyn BufRead>> {
    /// Open a FASTA file (supports .gz compression)
    pub fn from_path<P: AsRef<Path>>(path: P) -> MetataxResult<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(256),
            header: None,
            sequence: Vec::new(),
        }
    }

    fn take_record(&mut self, next_header: Option<Vec<u8>>) -> Option<FastaRecord> {
        let header = std::mem::replace(&mut self.header, next_header)?;
        Some(FastaRecord {
            header,
            sequence: std::mem::take(&mut self.sequence),
        })
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = MetataxResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            let read = match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(n) => n,
                Err(e) => return Some(Err(MetataxError::Io(e))),
            };

            if read == 0 {
                return self.take_record(None).map(Ok);
            }

            let line = trim_end(&self.buffer);
            if let Some(header) = line.strip_prefix(b">") {
                let header = header.to_vec();
                if self.header.is_none() {
                    self.header = Some(header);
                } else if let Some(record) = self.take_record(Some(header)) {
                    return Some(Ok(record));
                }
            } else if self.header.is_some() {
                self.sequence.extend_from_slice(line);
            }
        }
    }
}

/// Count the records of a FASTA file by counting lines that start with `>`
pub fn count_records<P: AsRef<Path>>(path: P) -> MetataxResult<usize> {
    let path = path.as_ref();

    if is_gzipped(path) {
        return count_records_streaming(open_input(path)?);
    }

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(count_headers(&mmap[..]))
}

fn count_headers(data: &[u8]) -> usize {
    let mut count = usize::from(data.first() == Some(&b'>'));
    count += data.windows(2).filter(|w| *w == b"\n>").count();
    count
}

fn count_records_streaming<R: BufRead>(mut reader: R) -> MetataxResult<usize> {
    let mut count = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.first() == Some(&b'>') {
            count += 1;
        }
    }
    Ok(count)
}

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn as_writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Plain(w) => w,
            Sink::Gzip(w) => w,
        }
    }
}

/// FASTA file writer that wraps sequences and keeps track of what it wrote.
///
/// Files ending in `.gz` are gzip-compressed; `bytes_written` always counts
/// the uncompressed FASTA text.
pub struct FastaWriter {
    path: PathBuf,
    sink: Sink,
    line_width: usize,
    bytes_written: u64,
    records_written: usize,
}

impl FastaWriter {
    pub fn create<P: AsRef<Path>>(path: P, line_width: usize) -> MetataxResult<Self> {
        let path = path.as_ref();
        if line_width == 0 {
            return Err(MetataxError::InvalidInput(
                "line width must be at least 1".to_string(),
            ));
        }

        let file = BufWriter::new(File::create(path)?);
        let sink = if is_gzipped(path) {
            Sink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Sink::Plain(file)
        };

        Ok(Self {
            path: path.to_path_buf(),
            sink,
            line_width,
            bytes_written: 0,
            records_written: 0,
        })
    }

    pub fn write_record(&mut self, record: &FastaRecord) -> MetataxResult<()> {
        let written = record.write_to(self.sink.as_writer(), self.line_width)?;
        self.bytes_written += written as u64;
        self.records_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush everything to disk, finishing the gzip stream if any
    pub fn finish(self) -> MetataxResult<()> {
        match self.sink {
            Sink::Plain(mut w) => w.flush()?,
            Sink::Gzip(w) => w.finish()?.flush()?,
        }
        Ok(())
    }
}
