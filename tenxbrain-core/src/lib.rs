//! # Chunked streaming summaries for out-of-core count matrices.
//!
//! This crate holds the compute core of tenxbrain: given a count matrix that is
//! far too large to hold in memory (the shipped dataset is 27,998 genes by
//! 1,306,127 cells), it partitions the columns into blocks, materializes each
//! block exactly once through a [`BlockSource`], and accumulates per-column
//! sums, per-column nonzero counts, and per-row sums in a single pass.
//! Per-row means are finalized at the end by dividing by the column count.
//!
//! Resident memory is bounded by one materialized block (`rows x chunk_size`
//! values) plus the accumulator vectors (`rows + 2 * columns` words),
//! independent of the total column count.
//!
//! - [`plan`] - partitioning the column axis into contiguous chunks
//! - [`reduce`] - the single-pass reduction over those chunks
//! - [`models`] - the resulting [`MatrixSummary`] record
//! - [`errors`] - typed failures, all caught before or during the pass

pub mod consts;
pub mod errors;
pub mod models;
pub mod plan;
pub mod reduce;

pub use consts::{DEFAULT_CHUNK_SIZE, DEFAULT_MEMORY_BUDGET};
pub use errors::SummaryError;
pub use models::MatrixSummary;
pub use plan::{ChunkPlan, ColumnRange, effective_chunk_size};
#[cfg(feature = "parallel")]
pub use reduce::reduce_parallel;
pub use reduce::{BlockSource, reduce};
