//! Sequence file reading
//!
//! Format and compression are picked from the file name. FASTA and FASTQ go
//! through `bio`; Stockholm alignments are read line by line here. Gap
//! characters are removed from every record so alignments can be fed
//! straight to the prediction programs.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;

use rnaloops_shared::{Record, Stage, stage_debug, stage_info};

use crate::error::{RnaLoopsError, RnaLoopsResult};
use crate::traits::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    Fastq,
    Stockholm,
}

/// Detected layout of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileKind {
    pub format: SequenceFormat,
    pub gzipped: bool,
}

/// Work out format and compression from the file extension
pub fn detect_file_kind(path: &Path) -> RnaLoopsResult<FileKind> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| RnaLoopsError::input(format!("unreadable file name: {}", path.display())))?;

    let mut parts: Vec<&str> = name.split('.').collect();
    let gzipped = parts.len() > 2 && parts.last() == Some(&"gz");
    if gzipped {
        parts.pop();
    }

    let extension = if parts.len() > 1 { parts.last().copied().unwrap_or("") } else { "" };
    let format = match extension {
        "fasta" | "fas" | "fa" | "fna" | "ffn" | "faa" | "mpfa" | "frn" | "txt" | "fsa" => {
            SequenceFormat::Fasta
        }
        "fastq" | "fq" => SequenceFormat::Fastq,
        "stk" | "stockholm" | "sto" => SequenceFormat::Stockholm,
        _ => {
            return Err(RnaLoopsError::input(format!(
                "could not recognize {} as fasta, fastq or stockholm (optionally .gz compressed)",
                path.display()
            )));
        }
    };

    Ok(FileKind { format, gzipped })
}

/// Remove alignment gap characters
pub fn strip_gaps(sequence: &str, gaps: &[char]) -> String {
    sequence.chars().filter(|c| !gaps.contains(c)).collect()
}

const FASTA_GAPS: &[char] = &['-'];
const STOCKHOLM_GAPS: &[char] = &['-', '.'];

/// Sequence file reader for the multi-record path
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceFileReader;

impl SequenceFileReader {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path, gzipped: bool) -> RnaLoopsResult<Box<dyn Read>> {
        let file = File::open(path)
            .map_err(|e| RnaLoopsError::input(format!("cannot open {}: {e}", path.display())))?;

        if gzipped {
            Ok(Box::new(MultiGzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }

    fn read_fasta(input: Box<dyn Read>) -> RnaLoopsResult<Vec<Record>> {
        fasta::Reader::new(input)
            .records()
            .map(|record| {
                let record = record
                    .map_err(|e| RnaLoopsError::input(format!("malformed fasta: {e}")))?;
                let sequence = String::from_utf8_lossy(record.seq());
                Ok(Record::new(record.id(), strip_gaps(&sequence, FASTA_GAPS)))
            })
            .collect()
    }

    fn read_fastq(input: Box<dyn Read>) -> RnaLoopsResult<Vec<Record>> {
        fastq::Reader::new(input)
            .records()
            .map(|record| {
                let record = record
                    .map_err(|e| RnaLoopsError::input(format!("malformed fastq: {e}")))?;
                let sequence = String::from_utf8_lossy(record.seq());
                Ok(Record::new(record.id(), strip_gaps(&sequence, FASTA_GAPS)))
            })
            .collect()
    }

    /// Stockholm: `#` annotation lines are skipped, `//` ends an alignment,
    /// other lines are `<id> <sequence chunk>` and chunks of one id are
    /// concatenated in order of first appearance
    fn read_stockholm(input: Box<dyn Read>) -> RnaLoopsResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut alignment: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut flush = |alignment: &mut Vec<(String, String)>,
                         index: &mut HashMap<String, usize>| {
            records.extend(
                alignment
                    .drain(..)
                    .map(|(id, sequence)| Record::new(id, strip_gaps(&sequence, STOCKHOLM_GAPS))),
            );
            index.clear();
        };

        for (number, line) in BufReader::new(input).lines().enumerate() {
            let line = line.map_err(|e| RnaLoopsError::input(format!("malformed stockholm: {e}")))?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "//" {
                flush(&mut alignment, &mut index);
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(id), Some(chunk), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(RnaLoopsError::input(format!(
                    "malformed stockholm line {}: expected '<id> <sequence>'",
                    number + 1
                )));
            };

            match index.get(id) {
                Some(&position) => alignment[position].1.push_str(chunk),
                None => {
                    index.insert(id.to_string(), alignment.len());
                    alignment.push((id.to_string(), chunk.to_string()));
                }
            }
        }
        flush(&mut alignment, &mut index);

        Ok(records)
    }
}

impl RecordReader for SequenceFileReader {
    fn read_records(&self, path: &Path) -> RnaLoopsResult<Vec<Record>> {
        let kind = detect_file_kind(path)?;
        stage_debug!(
            Stage::Input,
            "📂 Reading {} as {:?}{}",
            path.display(),
            kind.format,
            if kind.gzipped { " (gzip)" } else { "" }
        );

        let input = Self::open(path, kind.gzipped)?;
        let records = match kind.format {
            SequenceFormat::Fasta => Self::read_fasta(input)?,
            SequenceFormat::Fastq => Self::read_fastq(input)?,
            SequenceFormat::Stockholm => Self::read_stockholm(input)?,
        };

        let mean_length = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.sequence.len()).sum::<usize>() as f64 / records.len() as f64
        };
        stage_info!(
            Stage::Input,
            "Reading successful. Input sequences: {}. Average sequence length: {:.0}",
            records.len(),
            mean_length
        );

        Ok(records)
    }
}
