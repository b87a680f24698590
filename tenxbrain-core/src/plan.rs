//! Partitioning of the column axis into contiguous, fully covering chunks.

use crate::consts::BYTES_PER_COUNT;
use crate::errors::{Result, SummaryError};

/// A half-open range of column indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    /// Number of columns in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An ordered partition of `[0, total_columns)` into disjoint ranges.
///
/// Every range except possibly the last has length exactly `chunk_size`;
/// together they cover the column axis with no gaps and no overlap, in
/// ascending order. Building a plan is pure and deterministic, so the same
/// inputs always give the same partition.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    total_columns: usize,
    chunk_size: usize,
    ranges: Vec<ColumnRange>,
}

impl ChunkPlan {
    /// Partition `total_columns` columns into chunks of at most `chunk_size`.
    ///
    /// Both arguments must be positive; a chunk size at or above the column
    /// count produces a single range covering everything.
    pub fn new(total_columns: usize, chunk_size: usize) -> Result<Self> {
        if total_columns == 0 {
            return Err(SummaryError::NoColumns);
        }
        if chunk_size == 0 {
            return Err(SummaryError::ZeroChunkSize);
        }

        let mut ranges = Vec::with_capacity(total_columns.div_ceil(chunk_size));
        let mut start = 0;
        while start < total_columns {
            let end = (start + chunk_size).min(total_columns);
            ranges.push(ColumnRange { start, end });
            start = end;
        }

        Ok(ChunkPlan {
            total_columns,
            chunk_size,
            ranges,
        })
    }

    /// The column count this plan covers.
    pub fn total_columns(&self) -> usize {
        self.total_columns
    }

    /// The configured chunk size (the last range may be shorter).
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The ranges, in ascending order.
    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    /// Number of chunks in the plan.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = ColumnRange;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ColumnRange>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter().copied()
    }
}

/// Clamp a requested chunk size so one materialized block of `u32` counts
/// fits within `memory_budget` bytes.
///
/// Never returns less than one column, even when a single column already
/// exceeds the budget; the budget bounds the block, not the accumulators.
pub fn effective_chunk_size(rows: usize, requested: usize, memory_budget: usize) -> usize {
    let per_column = rows.max(1) * BYTES_PER_COUNT;
    let fits = (memory_budget / per_column).max(1);
    requested.min(fits).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(10, 3, 4)]
    #[case(10, 10, 1)]
    #[case(10, 11, 1)]
    #[case(1, 10, 1)]
    #[case(12, 4, 3)]
    #[case(13, 4, 4)]
    fn chunk_count(#[case] total: usize, #[case] chunk: usize, #[case] expected: usize) {
        let plan = ChunkPlan::new(total, chunk).unwrap();
        assert_eq!(plan.len(), expected);
        assert_eq!(plan.len(), total.div_ceil(chunk));
    }

    #[rstest]
    fn partition_law() {
        for total in [1, 2, 3, 7, 10, 33, 100] {
            for chunk in [1, 2, 5, 7, 32, 100, 1000] {
                let plan = ChunkPlan::new(total, chunk).unwrap();
                let ranges = plan.ranges();

                // contiguous ascending cover of [0, total)
                assert_eq!(ranges[0].start, 0);
                assert_eq!(ranges[ranges.len() - 1].end, total);
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }

                // all full-size except possibly the last
                for range in &ranges[..ranges.len() - 1] {
                    assert_eq!(range.len(), chunk);
                }
                let last = ranges[ranges.len() - 1];
                assert!(last.len() <= chunk);
                assert!(!last.is_empty());
            }
        }
    }

    #[rstest]
    fn last_chunk_length_is_the_remainder() {
        let plan = ChunkPlan::new(10, 3).unwrap();
        assert_eq!(plan.ranges()[3], ColumnRange { start: 9, end: 10 });

        let even = ChunkPlan::new(12, 4).unwrap();
        assert_eq!(even.ranges()[2].len(), 4);
    }

    #[rstest]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            ChunkPlan::new(0, 5),
            Err(SummaryError::NoColumns)
        ));
        assert!(matches!(
            ChunkPlan::new(5, 0),
            Err(SummaryError::ZeroChunkSize)
        ));
    }

    #[rstest]
    fn budget_clamps_chunk_size() {
        // 100 rows -> 400 bytes per column; 2800 bytes fit exactly 7 columns
        assert_eq!(effective_chunk_size(100, 10_000, 2800), 7);
        // generous budget leaves the request alone
        assert_eq!(effective_chunk_size(100, 50, 1 << 30), 50);
        // a single column over budget still yields one column
        assert_eq!(effective_chunk_size(1_000_000, 10_000, 16), 1);
    }
}
