use crate::Number;
use serde::{Deserialize, Serialize};

/// Absolute tolerance used by `==`. It is not scaled by operand magnitude.
pub const EQUALITY_EPSILON: Number = 1e-40;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub equality_epsilon: Number,
    /// Also answer log2e, log10e, ln2, ln10, sqrt2, sqrt3, inv_sqrt2 and inv_sqrt3.
    pub extended_constants: bool,
    /// Let identifiers carry digits after the first character.
    pub alphanumeric_identifiers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            equality_epsilon: EQUALITY_EPSILON,
            extended_constants: false,
            alphanumeric_identifiers: false,
        }
    }
}
