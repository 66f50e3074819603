//! Static row-contiguous partitioning of the interior rows.

use std::ops::Range;

use crate::error::ConfigError;

/// Half-open range of interior rows `[first, last)` owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub first: usize,
    pub last: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.last - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.first >= self.last
    }

    pub fn rows(&self) -> Range<usize> {
        self.first..self.last
    }
}

/// Split rows `1..=n` into `workers` contiguous bands of `n / workers` rows.
/// The last band also takes the `n % workers` leftover rows.
pub fn partition(n: usize, workers: usize) -> Result<Vec<RowRange>, ConfigError> {
    if n == 0 {
        return Err(ConfigError::ZeroSize);
    }
    if workers == 0 {
        return Err(ConfigError::NoWorkers);
    }
    if workers > n {
        return Err(ConfigError::TooManyWorkers { workers, size: n });
    }

    let height = n / workers;
    let ranges: Vec<RowRange> = (0..workers)
        .map(|w| {
            let first = w * height + 1;
            let last = if w + 1 == workers { n + 1 } else { first + height };
            RowRange { first, last }
        })
        .collect();

    for (w, range) in ranges.iter().enumerate() {
        if range.is_empty() {
            tracing::warn!("worker {} owns no rows and will do no useful work", w);
        }
    }
    tracing::debug!(
        "partitioned {} rows over {} workers ({} rows each, {} extra on the last)",
        n,
        workers,
        height,
        n % workers
    );
    Ok(ranges)
}
