//! Result classification
//!
//! Turns the text printed by a successful external program into a
//! `StructuredResult`. The shape is picked from the same `AlgorithmKind`
//! the invocation was built from, never from the text itself.
//!
//! Output format: one prediction per line, fields separated by `|`.
//! Score-shaped programs end with a single newline. Partition-function
//! programs always end with two trailing lines, and their second field is a
//! non-negative weight that gets normalized into a probability.

use thiserror::Error;

use rnaloops_shared::{AlgorithmKind, PfcResult, ResultShape, Row, ScoreResult, StructuredResult};

pub const FIELD_DELIMITER: char = '|';

/// Decimal places kept for normalized probabilities
pub const PROBABILITY_PRECISION: usize = 5;

/// Column holding the partition weight in pfc rows
const WEIGHT_COLUMN: usize = 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected at least two trailing lines in partition function output, got {lines}")]
    Truncated { lines: usize },

    #[error("row {row} has no weight column")]
    MissingWeight { row: usize },

    #[error("row {row} has invalid weight '{value}'")]
    InvalidWeight { row: usize, value: String },

    #[error("all partition weights are zero, probabilities are undefined")]
    ZeroWeightSum,
}

/// Classify raw program output for one record
pub fn classify(
    algorithm: AlgorithmKind,
    id: &str,
    raw: &str,
) -> Result<StructuredResult, ParseError> {
    match algorithm.shape() {
        ResultShape::Score => Ok(StructuredResult::Score(ScoreResult {
            id: id.to_string(),
            rows: split_rows(raw, ResultShape::Score)?,
        })),
        ResultShape::Pfc => {
            let mut rows = split_rows(raw, ResultShape::Pfc)?;
            normalize_probabilities(&mut rows)?;
            Ok(StructuredResult::Pfc(PfcResult {
                id: id.to_string(),
                rows,
            }))
        }
    }
}

/// Split output text into trimmed field rows, dropping the trailing lines
/// the given shape is known to emit
pub fn split_rows(raw: &str, shape: ResultShape) -> Result<Vec<Row>, ParseError> {
    let mut lines: Vec<&str> = raw.split('\n').collect();

    match shape {
        ResultShape::Score => {
            if lines.last() == Some(&"") {
                lines.pop();
            }
        }
        ResultShape::Pfc => {
            if lines.len() < 2 {
                return Err(ParseError::Truncated { lines: lines.len() });
            }
            lines.truncate(lines.len() - 2);
        }
    }

    Ok(lines.into_iter().map(split_fields).collect())
}

fn split_fields(line: &str) -> Row {
    line.split(FIELD_DELIMITER).map(|field| field.trim().to_string()).collect()
}

/// Append `weight / sum(weights)` to every row
pub fn normalize_probabilities(rows: &mut [Row]) -> Result<(), ParseError> {
    let weights = rows
        .iter()
        .enumerate()
        .map(|(index, row)| parse_weight(index, row))
        .collect::<Result<Vec<f64>, ParseError>>()?;

    if rows.is_empty() {
        return Ok(());
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(ParseError::ZeroWeightSum);
    }

    for (row, weight) in rows.iter_mut().zip(weights) {
        row.push(format_probability(weight / total));
    }

    Ok(())
}

fn parse_weight(index: usize, row: &Row) -> Result<f64, ParseError> {
    let raw = row.get(WEIGHT_COLUMN).ok_or(ParseError::MissingWeight { row: index })?;
    let invalid = || ParseError::InvalidWeight {
        row: index,
        value: raw.clone(),
    };

    let weight: f64 = raw.parse().map_err(|_| invalid())?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(invalid());
    }
    Ok(weight)
}

/// Round to `PROBABILITY_PRECISION` places and print without padding zeros,
/// keeping at least one fractional digit (`0.2`, `1.0`, `0.33333`)
pub fn format_probability(probability: f64) -> String {
    let fixed = format!("{:.*}", PROBABILITY_PRECISION, probability);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
