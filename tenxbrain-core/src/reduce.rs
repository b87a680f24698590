//! Single-pass streaming reduction over a chunked column partition.
//!
//! Each block is read exactly once. Column statistics for a chunk land in
//! the output slice owned by that chunk, so they never interact across
//! chunks; row sums are the one accumulator every chunk contributes to.
//! Because all accumulation is integer addition into absolute positions,
//! the result is independent of chunk size and of processing order, and the
//! parallel path is bit-identical to the sequential one.

use ndarray::{Array2, s};

use crate::errors::{Result, SummaryError};
use crate::models::MatrixSummary;
use crate::plan::{ChunkPlan, ColumnRange};

/// A lazily readable matrix that can materialize dense column blocks.
///
/// The source is read-only and shared; `read_block` is the sole point of
/// I/O during a reduction and the returned block must have shape
/// `rows x (end - start)`.
pub trait BlockSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Matrix dimensions as `(rows, columns)`.
    fn shape(&self) -> (usize, usize);

    /// Materialize columns `[start, end)` as a dense block.
    fn read_block(&self, start: usize, end: usize) -> std::result::Result<Array2<u32>, Self::Error>;
}

/// In-memory matrices are their own block source. Used in tests and for
/// datasets small enough to load whole.
impl BlockSource for Array2<u32> {
    type Error = std::convert::Infallible;

    fn shape(&self) -> (usize, usize) {
        self.dim()
    }

    fn read_block(&self, start: usize, end: usize) -> std::result::Result<Array2<u32>, Self::Error> {
        Ok(self.slice(s![.., start..end]).to_owned())
    }
}

/// Reduce the matrix behind `source` in a single pass over `plan`.
///
/// Produces exact per-column sums, per-column nonzero counts, and per-row
/// sums, with row means finalized against the total column count. The plan
/// is checked against the source's dimensions before any block is read; a
/// failed read aborts the whole reduction with no partial result.
///
/// Re-running with the same source and plan yields identical output.
pub fn reduce<S: BlockSource>(source: &S, plan: &ChunkPlan) -> Result<MatrixSummary> {
    let (rows, columns) = check_plan(source, plan)?;

    let mut column_sum = vec![0u64; columns];
    let mut column_nonzero = vec![0u64; columns];
    let mut row_sum = vec![0u64; rows];

    for range in plan {
        let block = materialize(source, rows, range)?;
        accumulate_block(
            &block,
            &mut column_sum[range.start..range.end],
            &mut column_nonzero[range.start..range.end],
            &mut row_sum,
        );
    }

    Ok(finalize(rows, columns, column_sum, column_nonzero, row_sum))
}

/// Parallel variant of [`reduce`].
///
/// Chunks are materialized and summarized by rayon workers; each worker
/// owns its chunk's column statistics outright and a private partial
/// row-sum vector. The partials are combined by elementwise addition after
/// all workers finish, which is the only synchronization point.
#[cfg(feature = "parallel")]
pub fn reduce_parallel<S>(source: &S, plan: &ChunkPlan) -> Result<MatrixSummary>
where
    S: BlockSource + Sync,
{
    use rayon::prelude::*;

    let (rows, columns) = check_plan(source, plan)?;

    struct ChunkStats {
        range: ColumnRange,
        column_sum: Vec<u64>,
        column_nonzero: Vec<u64>,
        row_sum: Vec<u64>,
    }

    let partials = plan
        .ranges()
        .par_iter()
        .map(|&range| -> Result<ChunkStats> {
            let block = materialize(source, rows, range)?;
            let mut column_sum = vec![0u64; range.len()];
            let mut column_nonzero = vec![0u64; range.len()];
            let mut row_sum = vec![0u64; rows];
            accumulate_block(&block, &mut column_sum, &mut column_nonzero, &mut row_sum);
            Ok(ChunkStats {
                range,
                column_sum,
                column_nonzero,
                row_sum,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut column_sum = vec![0u64; columns];
    let mut column_nonzero = vec![0u64; columns];
    let mut row_sum = vec![0u64; rows];
    for stats in partials {
        let ColumnRange { start, end } = stats.range;
        column_sum[start..end].copy_from_slice(&stats.column_sum);
        column_nonzero[start..end].copy_from_slice(&stats.column_nonzero);
        for (total, partial) in row_sum.iter_mut().zip(&stats.row_sum) {
            *total += partial;
        }
    }

    Ok(finalize(rows, columns, column_sum, column_nonzero, row_sum))
}

fn check_plan<S: BlockSource>(source: &S, plan: &ChunkPlan) -> Result<(usize, usize)> {
    let (rows, columns) = source.shape();
    if plan.total_columns() != columns {
        return Err(SummaryError::PlanShapeMismatch {
            plan_columns: plan.total_columns(),
            matrix_columns: columns,
        });
    }
    Ok((rows, columns))
}

fn materialize<S: BlockSource>(source: &S, rows: usize, range: ColumnRange) -> Result<Array2<u32>> {
    let block = source
        .read_block(range.start, range.end)
        .map_err(|e| SummaryError::BlockRead {
            start: range.start,
            end: range.end,
            source: Box::new(e),
        })?;

    let (got_rows, got_columns) = block.dim();
    if got_rows != rows || got_columns != range.len() {
        return Err(SummaryError::BlockShape {
            start: range.start,
            end: range.end,
            rows,
            columns: range.len(),
            got_rows,
            got_columns,
        });
    }
    Ok(block)
}

/// Fold one dense block into the accumulators. The column slices are local
/// to the block; `row_sum` spans the full row axis and is added into.
fn accumulate_block(
    block: &Array2<u32>,
    column_sum: &mut [u64],
    column_nonzero: &mut [u64],
    row_sum: &mut [u64],
) {
    for (offset, column) in block.columns().into_iter().enumerate() {
        let mut sum = 0u64;
        let mut nonzero = 0u64;
        for (i, &value) in column.iter().enumerate() {
            if value > 0 {
                sum += u64::from(value);
                nonzero += 1;
                row_sum[i] += u64::from(value);
            }
        }
        column_sum[offset] += sum;
        column_nonzero[offset] += nonzero;
    }
}

fn finalize(
    rows: usize,
    columns: usize,
    column_sum: Vec<u64>,
    column_nonzero: Vec<u64>,
    row_sum: Vec<u64>,
) -> MatrixSummary {
    // columns > 0 is guaranteed by the plan preconditions
    let row_mean = row_sum
        .iter()
        .map(|&total| total as f64 / columns as f64)
        .collect();

    MatrixSummary {
        rows,
        columns,
        column_sum,
        column_nonzero,
        row_sum,
        row_mean,
    }
}
