use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How far a [`Bitfield`](crate::Bitfield) may extend its buffer when a bit
/// beyond its current length is set.
///
/// The policy is fixed at construction. Reads never grow the buffer and
/// clearing an out-of-range bit is always a no-op, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// Capacity is fixed; out-of-range sets are ignored.
    #[default]
    Disabled,
    /// The buffer may grow to hold at most this many bits, rounded up to a
    /// whole byte.
    Bounded(usize),
    /// The buffer grows to cover whatever index is set.
    Unbounded,
}

impl Growth {
    /// Interprets a numeric ceiling the way loosely-typed callers express it:
    /// `0` disables growth, `f64::INFINITY` removes the ceiling and any other
    /// whole, non-negative number is a bit ceiling.
    pub fn from_bits_f64(bits: f64) -> Result<Self> {
        if bits.is_nan() {
            return Err(Error::NonIntegerGrowth(bits));
        }
        if bits < 0.0 {
            return Err(Error::NegativeGrowth(bits));
        }
        if bits.is_infinite() {
            return Ok(Growth::Unbounded);
        }
        if bits.fract() != 0.0 {
            return Err(Error::NonIntegerGrowth(bits));
        }
        // `as` saturates, and a ceiling of usize::MAX bits is never reached anyway.
        Ok(Growth::from(Some(bits as usize)))
    }

    /// Returns `true` if the buffer may be extended to `byte_len` bytes.
    pub(crate) fn permits(&self, byte_len: usize) -> bool {
        match *self {
            Growth::Disabled => false,
            Growth::Bounded(bits) => byte_len <= bits.div_ceil(8),
            Growth::Unbounded => true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Growth::Disabled)
    }
}

impl From<Option<usize>> for Growth {
    fn from(bits: Option<usize>) -> Self {
        match bits {
            None | Some(0) => Growth::Disabled,
            Some(n) => Growth::Bounded(n),
        }
    }
}

impl FromStr for Growth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "none" | "disabled" => Ok(Growth::Disabled),
            "unbounded" | "infinity" | "inf" => Ok(Growth::Unbounded),
            other => other
                .parse::<usize>()
                .map(|bits| Growth::from(Some(bits)))
                .map_err(|_| Error::InvalidGrowth(s.to_string())),
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Disabled => write!(f, "disabled"),
            Growth::Bounded(bits) => write!(f, "{}", bits),
            Growth::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Construction options for a [`Bitfield`](crate::Bitfield).
///
/// Deserializes from e.g. `{"grow": {"bounded": 100}}` or `{"grow": "unbounded"}`;
/// missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub grow: Growth,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grow(mut self, grow: impl Into<Growth>) -> Self {
        self.grow = grow.into();
        self
    }
}

impl From<Growth> for Options {
    fn from(grow: Growth) -> Self {
        Options { grow }
    }
}
