use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A parsed episode number.
///
/// Specials are often numbered between regular episodes ("12.5"), so the
/// number is either whole or fractional. Equality and ordering are numeric:
/// `Whole(12) == Fractional(12.0)` and `Whole(12) < Fractional(12.5)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodeNumber {
    Whole(u32),
    Fractional(f64),
}

impl EpisodeNumber {
    /// Tolerant parse of an episode token. Surrounding whitespace is ignored,
    /// integers are tried first, then finite non-negative decimals.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(n) = token.parse::<u32>() {
            return Some(Self::Whole(n));
        }
        match token.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Some(Self::Fractional(n)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Whole(n) => f64::from(*n),
            Self::Fractional(n) => *n,
        }
    }

    /// 1-based position this number denotes in a contiguous listing, if any.
    pub fn as_position(&self) -> Option<usize> {
        match self {
            Self::Whole(n) if *n >= 1 => Some(*n as usize),
            Self::Fractional(n) if n.fract() == 0.0 && *n >= 1.0 => Some(*n as usize),
            _ => None,
        }
    }
}

impl From<u32> for EpisodeNumber {
    fn from(n: u32) -> Self {
        Self::Whole(n)
    }
}

impl FromStr for EpisodeNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid episode number: {s:?}"))
    }
}

impl PartialEq for EpisodeNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EpisodeNumber {}

impl PartialOrd for EpisodeNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EpisodeNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_f64().total_cmp(&other.as_f64())
    }
}

impl Hash for EpisodeNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_f64().to_bits().hash(state);
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole(n) => write!(f, "{n}"),
            Self::Fractional(n) => write!(f, "{n}"),
        }
    }
}
