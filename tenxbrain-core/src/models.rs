#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exact single-pass summary of a non-negative integer count matrix.
///
/// All running sums are carried in `u64`, which is exact for any volume of
/// `u32` UMI counts this package can encounter (a full 1.3M-cell column of
/// saturated counts is still far below 2^64). The only floating-point
/// quantity is [`row_mean`](Self::row_mean); a row mean is exact as long as
/// the underlying row sum is below 2^53, which holds by a wide margin for
/// real UMI data (row sums top out around 10^9).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatrixSummary {
    /// Number of matrix rows (genes).
    pub rows: usize,
    /// Number of matrix columns (cells).
    pub columns: usize,
    /// Total counts per column, indexed by absolute column position.
    pub column_sum: Vec<u64>,
    /// Number of strictly positive entries per column.
    pub column_nonzero: Vec<u64>,
    /// Total counts per row, accumulated across every column block.
    pub row_sum: Vec<u64>,
    /// Mean count per row: `row_sum / columns`.
    pub row_mean: Vec<f64>,
}

impl MatrixSummary {
    /// Grand total of all counts in the matrix.
    pub fn total_counts(&self) -> u64 {
        self.column_sum.iter().sum()
    }

    /// Mean number of genes detected (nonzero entries) per column.
    pub fn mean_genes_detected(&self) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        let detected: u64 = self.column_nonzero.iter().sum();
        detected as f64 / self.columns as f64
    }
}
