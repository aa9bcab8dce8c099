use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of minimization steps used when none is configured.
pub const DEFAULT_STEPS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinimizationMethod {
    #[default]
    ConjugateGradients,
    SteepestDescent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForceField {
    Gaff,
    #[default]
    Mmff94s,
    Mmff94,
    Uff,
    Ghemical,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseParamError {
    #[error(
        "Unknown minimization method '{0}'. Expected 'conjugate gradients' or 'steepest descent'."
    )]
    UnknownMethod(String),

    #[error("Unknown force field '{0}'. Expected one of GAFF, MMFF94s, MMFF94, UFF, Ghemical.")]
    UnknownForceField(String),

    #[error("Index {index} is out of range for {kind} (0..{len}).")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

static METHOD_NAMES: Map<&'static str, MinimizationMethod> = phf_map! {
    "conjugate gradients" => MinimizationMethod::ConjugateGradients,
    "conjugate gradient" => MinimizationMethod::ConjugateGradients,
    "cg" => MinimizationMethod::ConjugateGradients,
    "steepest descent" => MinimizationMethod::SteepestDescent,
    "sd" => MinimizationMethod::SteepestDescent,
};

static FORCE_FIELD_NAMES: Map<&'static str, ForceField> = phf_map! {
    "gaff" => ForceField::Gaff,
    "mmff94s" => ForceField::Mmff94s,
    "mmff94" => ForceField::Mmff94,
    "uff" => ForceField::Uff,
    "ghemical" => ForceField::Ghemical,
};

// Lowercases and folds '-' / '_' to spaces so that "steepest-descent" and "Steepest_Descent"
// resolve like the canonical name.
fn normalize_key(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl MinimizationMethod {
    /// All methods in the order a configuration form lists them.
    pub const ALL: [MinimizationMethod; 2] = [Self::ConjugateGradients, Self::SteepestDescent];

    /// The exact string PyMOL's `minimize` expects for `method=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConjugateGradients => "conjugate gradients",
            Self::SteepestDescent => "steepest descent",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::ConjugateGradients => 0,
            Self::SteepestDescent => 1,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, ParseParamError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ParseParamError::IndexOutOfRange {
                kind: "minimization method",
                index,
                len: Self::ALL.len(),
            })
    }
}

impl ForceField {
    /// All force fields in the order a configuration form lists them.
    pub const ALL: [ForceField; 5] = [
        Self::Gaff,
        Self::Mmff94s,
        Self::Mmff94,
        Self::Uff,
        Self::Ghemical,
    ];

    /// The exact string PyMOL's `minimize` expects for `forcefield=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaff => "GAFF",
            Self::Mmff94s => "MMFF94s",
            Self::Mmff94 => "MMFF94",
            Self::Uff => "UFF",
            Self::Ghemical => "Ghemical",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Gaff => 0,
            Self::Mmff94s => 1,
            Self::Mmff94 => 2,
            Self::Uff => 3,
            Self::Ghemical => 4,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, ParseParamError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ParseParamError::IndexOutOfRange {
                kind: "force field",
                index,
                len: Self::ALL.len(),
            })
    }
}

impl FromStr for MinimizationMethod {
    type Err = ParseParamError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METHOD_NAMES
            .get(normalize_key(s).as_str())
            .copied()
            .ok_or_else(|| ParseParamError::UnknownMethod(s.to_string()))
    }
}

impl FromStr for ForceField {
    type Err = ParseParamError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORCE_FIELD_NAMES
            .get(normalize_key(s).as_str())
            .copied()
            .ok_or_else(|| ParseParamError::UnknownForceField(s.to_string()))
    }
}

impl fmt::Display for MinimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-facing knobs of a local optimization.
///
/// `steps` is not range-checked here; the configuration builder rejects zero before a value
/// of this type is ever handed to the script renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimizationParams {
    pub method: MinimizationMethod,
    pub force_field: ForceField,
    pub steps: u32,
}

impl Default for MinimizationParams {
    fn default() -> Self {
        Self {
            method: MinimizationMethod::default(),
            force_field: ForceField::default(),
            steps: DEFAULT_STEPS,
        }
    }
}
