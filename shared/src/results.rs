//! Structured results parsed from external program output

use serde::{Deserialize, Serialize};

use crate::types::ResultShape;

/// One parsed output line, already split into trimmed fields
pub type Row = Vec<String>;

/// Rows copied verbatim from a score-shaped program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub id: String,
    pub rows: Vec<Row>,
}

/// Rows from a partition-function program; the last field of every row is
/// the normalized probability appended during classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PfcResult {
    pub id: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StructuredResult {
    Score(ScoreResult),
    Pfc(PfcResult),
}

impl StructuredResult {
    pub fn id(&self) -> &str {
        match self {
            StructuredResult::Score(result) => &result.id,
            StructuredResult::Pfc(result) => &result.id,
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            StructuredResult::Score(_) => ResultShape::Score,
            StructuredResult::Pfc(_) => ResultShape::Pfc,
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            StructuredResult::Score(result) => &result.rows,
            StructuredResult::Pfc(result) => &result.rows,
        }
    }
}
