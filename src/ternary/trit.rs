//! Single ternary signal value (trit).
//!
//! Every wire, port and latch in a circuit carries one of three values:
//! - `N` = NEG (-1)
//! - `O` = ZERO (0)
//! - `P` = POS (+1)

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A ternary signal value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trit {
    /// Negative (-1)
    N,
    /// Zero (0)
    #[default]
    O,
    /// Positive (+1)
    P,
}

impl Trit {
    /// All possible trit values in order: N, O, P
    pub const ALL: [Trit; 3] = [Trit::N, Trit::O, Trit::P];

    /// Create a trit from an integer value.
    ///
    /// Returns `None` if value is not in {-1, 0, 1}.
    #[inline]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Trit::N),
            0 => Some(Trit::O),
            1 => Some(Trit::P),
            _ => None,
        }
    }

    /// Convert to integer value.
    #[inline]
    pub const fn to_i8(self) -> i8 {
        match self {
            Trit::N => -1,
            Trit::O => 0,
            Trit::P => 1,
        }
    }

    /// Unsigned digit used for positional encoding: N=0, O=1, P=2.
    #[inline]
    pub const fn digit(self) -> usize {
        match self {
            Trit::N => 0,
            Trit::O => 1,
            Trit::P => 2,
        }
    }

    /// Invert the trit (flip N ↔ P, O stays O).
    #[inline]
    pub const fn neg(self) -> Self {
        match self {
            Trit::N => Trit::P,
            Trit::O => Trit::O,
            Trit::P => Trit::N,
        }
    }

    /// Returns true if this trit is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        matches!(self, Trit::O)
    }

    /// Returns true if this trit is positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Trit::P)
    }

    /// Returns true if this trit is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Trit::N)
    }

    /// Single-character form used in scheme files and displays.
    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Trit::N => '-',
            Trit::O => '0',
            Trit::P => '+',
        }
    }
}

impl fmt::Debug for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trit::N => write!(f, "N"),
            Trit::O => write!(f, "O"),
            Trit::P => write!(f, "P"),
        }
    }
}

impl fmt::Display for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::ops::Neg for Trit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Trit::neg(self)
    }
}

impl From<Trit> for i8 {
    fn from(trit: Trit) -> Self {
        trit.to_i8()
    }
}

impl TryFrom<i8> for Trit {
    type Error = ParseTritError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Trit::from_i8(value).ok_or_else(|| ParseTritError(value.to_string()))
    }
}

/// Error returned when text does not name a trit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid trit '{0}' (expected one of -, 0, +, N, O, P, -1, 1)")]
pub struct ParseTritError(pub String);

impl FromStr for Trit {
    type Err = ParseTritError;

    /// Accepts the display symbols, the debug letters and the integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-" | "N" | "n" | "-1" | "NEG" => Ok(Trit::N),
            "0" | "O" | "o" | "ZERO" => Ok(Trit::O),
            "+" | "P" | "p" | "1" | "+1" | "POS" => Ok(Trit::P),
            other => Err(ParseTritError(other.to_string())),
        }
    }
}
