use std::cell::{Cell, RefCell};

use super::{median_ranks, midpoint, MedianCapable, Sample, Summary, Tally};

/// Median strategy that keeps every raw value.
///
/// Values are sorted in place the first time a median is asked for and
/// stay sorted until the next append.
#[derive(Debug, Clone, Default)]
pub struct Fast {
    tally: Tally,
    values: RefCell<Vec<Sample>>,
    sorted: Cell<bool>,
}

impl Fast {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Summary for Fast {
    fn tally(&self) -> &Tally {
        &self.tally
    }

    fn append(&mut self, value: Sample) -> u64 {
        self.values.get_mut().push(value);
        self.sorted.set(false);
        self.tally.record(value)
    }
}

impl MedianCapable for Fast {
    fn median(&self) -> Option<f64> {
        if self.tally.is_empty() {
            return None;
        }

        if !self.sorted.get() {
            self.values.borrow_mut().sort_unstable();
            self.sorted.set(true);
        }

        let (rank_lo, rank_hi) = median_ranks(self.tally.count());
        let values = self.values.borrow();
        let lo = *values.get(usize::try_from(rank_lo).ok()?)?;
        let hi = *values.get(usize::try_from(rank_hi).ok()?)?;
        Some(midpoint(lo, hi))
    }
}
