//! Core types used throughout the rnaloops workspace

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{SharedError, SharedResult};

/// One analysis unit: a named raw sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub sequence: String,
}

impl Record {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

/// Output shape produced by an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// `class|score|class` rows
    Score,
    /// `class|partition-weight` rows, normalized into probabilities
    Pfc,
}

/// The closed set of external prediction programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    #[serde(rename = "motmfepretty")]
    MotMfePretty,
    #[serde(rename = "motpfc")]
    MotPfc,
    #[serde(rename = "motshapeX")]
    MotShapeX,
    #[serde(rename = "mothishapes")]
    MotHishapes,
    #[serde(rename = "motshapeX_pfc")]
    MotShapeXPfc,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::MotMfePretty,
        AlgorithmKind::MotPfc,
        AlgorithmKind::MotShapeX,
        AlgorithmKind::MotHishapes,
        AlgorithmKind::MotShapeXPfc,
    ];

    /// Base executable name, before any variant suffix
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::MotMfePretty => "motmfepretty",
            AlgorithmKind::MotPfc => "motpfc",
            AlgorithmKind::MotShapeX => "motshapeX",
            AlgorithmKind::MotHishapes => "mothishapes",
            AlgorithmKind::MotShapeXPfc => "motshapeX_pfc",
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            AlgorithmKind::MotMfePretty | AlgorithmKind::MotShapeX | AlgorithmKind::MotHishapes => {
                ResultShape::Score
            }
            AlgorithmKind::MotPfc | AlgorithmKind::MotShapeXPfc => ResultShape::Pfc,
        }
    }

    /// Whether the program takes a `-q` shape level
    pub fn uses_shape_level(&self) -> bool {
        matches!(self, AlgorithmKind::MotShapeX | AlgorithmKind::MotShapeXPfc)
    }

    /// Whether the program has a suboptimal (`_subopt`) variant
    pub fn supports_subopt(&self) -> bool {
        matches!(self, AlgorithmKind::MotMfePretty)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = SharedError;

    fn from_str(s: &str) -> SharedResult<Self> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SharedError::UnknownAlgorithm { name: s.to_string() })
    }
}

/// Motif source used as grammar constraint (`-Q`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifDatabase {
    /// RNA 3D Motif Atlas (BGSU)
    Bgsu,
    Rfam,
    Both,
}

impl MotifDatabase {
    pub fn flag_value(&self) -> &'static str {
        match self {
            MotifDatabase::Bgsu => "1",
            MotifDatabase::Rfam => "2",
            MotifDatabase::Both => "3",
        }
    }
}

impl FromStr for MotifDatabase {
    type Err = SharedError;

    fn from_str(s: &str) -> SharedResult<Self> {
        match s.trim() {
            "1" => Ok(MotifDatabase::Bgsu),
            "2" => Ok(MotifDatabase::Rfam),
            "3" => Ok(MotifDatabase::Both),
            other => Err(SharedError::invalid("database", other)),
        }
    }
}

/// Motif orientation used (`-b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifDirection {
    /// 5' -> 3'
    Forward,
    /// 3' -> 5'
    Reverse,
    Both,
}

impl MotifDirection {
    pub fn flag_value(&self) -> &'static str {
        match self {
            MotifDirection::Forward => "1",
            MotifDirection::Reverse => "2",
            MotifDirection::Both => "3",
        }
    }
}

impl FromStr for MotifDirection {
    type Err = SharedError;

    fn from_str(s: &str) -> SharedResult<Self> {
        match s.trim() {
            "1" => Ok(MotifDirection::Forward),
            "2" => Ok(MotifDirection::Reverse),
            "3" => Ok(MotifDirection::Both),
            other => Err(SharedError::invalid("direction", other)),
        }
    }
}

/// Hishape sub-mode, selects the `mothishapes_<mode>` executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HishapeMode {
    H,
    M,
    B,
}

impl HishapeMode {
    pub fn suffix(&self) -> &'static str {
        match self {
            HishapeMode::H => "h",
            HishapeMode::M => "m",
            HishapeMode::B => "b",
        }
    }
}

impl FromStr for HishapeMode {
    type Err = SharedError;

    fn from_str(s: &str) -> SharedResult<Self> {
        match s.trim() {
            "h" => Ok(HishapeMode::H),
            "m" => Ok(HishapeMode::M),
            "b" => Ok(HishapeMode::B),
            other => Err(SharedError::invalid("hishape_mode", other)),
        }
    }
}

/// Shape abstraction level, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ShapeLevel(u8);

impl ShapeLevel {
    pub fn new(level: u8) -> SharedResult<Self> {
        if (1..=5).contains(&level) {
            Ok(Self(level))
        } else {
            Err(SharedError::invalid("shape_level", level))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for ShapeLevel {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for ShapeLevel {
    type Error = SharedError;

    fn try_from(level: u8) -> SharedResult<Self> {
        Self::new(level)
    }
}

impl From<ShapeLevel> for u8 {
    fn from(level: ShapeLevel) -> u8 {
        level.0
    }
}

/// Tunable parameters handed to every external invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmOptions {
    pub k_best: u32,
    pub database: MotifDatabase,
    pub direction: MotifDirection,
    pub subopt: bool,
    pub energy_range: f64,
    pub hishape_mode: HishapeMode,
    pub shape_level: ShapeLevel,
    pub time_instrumentation: bool,
}

impl Default for AlgorithmOptions {
    fn default() -> Self {
        Self {
            k_best: 10,
            database: MotifDatabase::Both,
            direction: MotifDirection::Both,
            subopt: false,
            energy_range: 1.0,
            hishape_mode: HishapeMode::H,
            shape_level: ShapeLevel::default(),
            time_instrumentation: false,
        }
    }
}

impl AlgorithmOptions {
    /// Reject values the external programs cannot accept
    pub fn validate(&self) -> SharedResult<()> {
        if self.k_best == 0 {
            return Err(SharedError::invalid("k_best", self.k_best));
        }
        if !self.energy_range.is_finite() || self.energy_range < 0.0 {
            return Err(SharedError::invalid("energy_range", self.energy_range));
        }
        Ok(())
    }
}
