use std::cell::OnceCell;

use super::{median_ranks, midpoint, MedianCapable, Sample, Summary, Tally};

/// Median strategy that keeps only the occurrence map.
///
/// The median walks an ascending list of `(value, occurrences)` pairs,
/// built on first use and discarded by the next append.
#[derive(Debug, Clone, Default)]
pub struct LowMemory {
    tally: Tally,
    sorted: OnceCell<Vec<(Sample, u64)>>,
}

impl LowMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self) -> &[(Sample, u64)] {
        self.sorted.get_or_init(|| {
            let mut pairs: Vec<(Sample, u64)> = self
                .tally
                .occurrences()
                .iter()
                .map(|(value, count)| (*value, *count))
                .collect();
            pairs.sort_unstable_by_key(|(value, _)| *value);
            pairs
        })
    }
}

impl Summary for LowMemory {
    fn tally(&self) -> &Tally {
        &self.tally
    }

    fn append(&mut self, value: Sample) -> u64 {
        self.sorted.take();
        self.tally.record(value)
    }
}

impl MedianCapable for LowMemory {
    fn median(&self) -> Option<f64> {
        if self.tally.is_empty() {
            return None;
        }
        let (rank_lo, rank_hi) = median_ranks(self.tally.count());

        let mut seen = 0u64;
        let mut mid_lo = None;
        for &(value, count) in self.sorted() {
            seen += count;
            if mid_lo.is_none() && rank_lo < seen {
                mid_lo = Some(value);
            }
            if rank_hi < seen {
                return mid_lo.map(|lo| midpoint(lo, value));
            }
        }
        None
    }
}
