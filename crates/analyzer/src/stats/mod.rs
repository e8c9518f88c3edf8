//! Stats — online accumulators answering mean/mode/median/range on demand.
//!
//! Every accumulator shares a [`Tally`] core (sum, count, extremes and a
//! value → occurrences map). The two median strategies differ only in
//! what they keep to find the middle of the sorted data:
//!
//! - [`LowMemory`]: just the occurrence map, sorted into (value, count)
//!   pairs on demand.
//! - [`Fast`]: every raw value, sorted in place on demand.
//!
//! Both produce identical results for the same multiset of inputs.

pub mod tally;
pub mod low_memory;
pub mod fast;

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

pub use tally::Tally;
pub use low_memory::LowMemory;
pub use fast::Fast;

/// Values fed to an accumulator.
pub type Sample = i64;

/// Capabilities shared by every accumulator.
///
/// Only `tally` and `append` are required; the statistics are read off
/// the shared core.
pub trait Summary {
    /// The shared running totals.
    fn tally(&self) -> &Tally;

    /// Add a value, returning the new total count.
    fn append(&mut self, value: Sample) -> u64;

    fn count(&self) -> u64 {
        self.tally().count()
    }

    fn high(&self) -> Option<Sample> {
        self.tally().high()
    }

    fn low(&self) -> Option<Sample> {
        self.tally().low()
    }

    fn mean(&self) -> Option<f64> {
        self.tally().mean()
    }

    /// Every value tied for the highest frequency, ascending.
    fn mode(&self) -> Option<Vec<Sample>> {
        self.tally().mode()
    }

    fn range(&self) -> Option<u64> {
        self.tally().range()
    }
}

/// Accumulators that can locate the median.
///
/// There is no default: only the concrete strategies implement it, so a
/// bare [`Tally`] cannot be asked for a median.
pub trait MedianCapable: Summary {
    /// Average of the values at ranks `(n - 1) / 2` and `n / 2` of the
    /// ascending data. `None` when empty.
    fn median(&self) -> Option<f64>;
}

/// Zero-based ranks of the two central values for `count` values.
///
/// Equal when `count` is odd, adjacent when even.
pub(crate) fn median_ranks(count: u64) -> (u64, u64) {
    debug_assert!(count > 0);
    ((count - 1) / 2, count / 2)
}

/// Exact integer sum, rounded to `f64` once, then halved.
pub(crate) fn midpoint(lo: Sample, hi: Sample) -> f64 {
    (i128::from(lo) + i128::from(hi)) as f64 / 2.0
}

/// Which median strategy an accumulator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorKind {
    /// Occurrence map only; memory grows with distinct values
    #[default]
    LowMemory,
    /// Every raw value; memory grows with the number of values
    Fast,
}

impl AccumulatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccumulatorKind::LowMemory => "low_memory",
            AccumulatorKind::Fast => "fast",
        }
    }

    pub fn build(self) -> Accumulator {
        Accumulator::new(self)
    }
}

impl fmt::Display for AccumulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccumulatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "low_memory" | "lomem" => Ok(AccumulatorKind::LowMemory),
            "fast" => Ok(AccumulatorKind::Fast),
            other => Err(format!("unknown accumulator strategy: {}", other)),
        }
    }
}

/// Either strategy, chosen at runtime.
#[derive(Debug, Clone)]
pub enum Accumulator {
    LowMemory(LowMemory),
    Fast(Fast),
}

impl Accumulator {
    pub fn new(kind: AccumulatorKind) -> Self {
        match kind {
            AccumulatorKind::LowMemory => Accumulator::LowMemory(LowMemory::new()),
            AccumulatorKind::Fast => Accumulator::Fast(Fast::new()),
        }
    }

    pub fn kind(&self) -> AccumulatorKind {
        match self {
            Accumulator::LowMemory(_) => AccumulatorKind::LowMemory,
            Accumulator::Fast(_) => AccumulatorKind::Fast,
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(AccumulatorKind::default())
    }
}

impl Summary for Accumulator {
    fn tally(&self) -> &Tally {
        match self {
            Accumulator::LowMemory(acc) => acc.tally(),
            Accumulator::Fast(acc) => acc.tally(),
        }
    }

    fn append(&mut self, value: Sample) -> u64 {
        match self {
            Accumulator::LowMemory(acc) => acc.append(value),
            Accumulator::Fast(acc) => acc.append(value),
        }
    }
}

impl MedianCapable for Accumulator {
    fn median(&self) -> Option<f64> {
        match self {
            Accumulator::LowMemory(acc) => acc.median(),
            Accumulator::Fast(acc) => acc.median(),
        }
    }
}
