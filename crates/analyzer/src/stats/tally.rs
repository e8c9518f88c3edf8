use std::collections::HashMap;

use super::{Sample, Summary};

/// Running totals shared by every accumulator.
///
/// Append-only: values are never removed, so `high >= low` and
/// `count == Σ occurrences` hold after every append.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    // i128 so long runs of large samples cannot overflow
    sum: i128,
    count: u64,
    high: Option<Sample>,
    low: Option<Sample>,
    occurrences: HashMap<Sample, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, returning the new total count.
    pub fn record(&mut self, value: Sample) -> u64 {
        if self.high.map_or(true, |high| value > high) {
            self.high = Some(value);
        }
        if self.low.map_or(true, |low| value < low) {
            self.low = Some(value);
        }

        self.sum += i128::from(value);
        *self.occurrences.entry(value).or_insert(0) += 1;
        self.count += 1;
        self.count
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn sum(&self) -> i128 {
        self.sum
    }

    pub fn high(&self) -> Option<Sample> {
        self.high
    }

    pub fn low(&self) -> Option<Sample> {
        self.low
    }

    /// Distinct value → number of times it was recorded.
    pub fn occurrences(&self) -> &HashMap<Sample, u64> {
        &self.occurrences
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum as f64 / self.count as f64)
    }

    /// All values sharing the highest frequency, ascending.
    pub fn mode(&self) -> Option<Vec<Sample>> {
        let top = self.occurrences.values().copied().max()?;
        let mut modes: Vec<Sample> = self
            .occurrences
            .iter()
            .filter(|(_, count)| **count == top)
            .map(|(value, _)| *value)
            .collect();
        modes.sort_unstable();
        Some(modes)
    }

    pub fn range(&self) -> Option<u64> {
        match (self.high, self.low) {
            (Some(high), Some(low)) => Some(high.abs_diff(low)),
            _ => None,
        }
    }
}

impl Summary for Tally {
    fn tally(&self) -> &Tally {
        self
    }

    fn append(&mut self, value: Sample) -> u64 {
        self.record(value)
    }
}
