use thiserror::Error;

/// Error type for chunk planning and streaming reduction.
///
/// Dimension and plan problems are reported before any block is read; a
/// failed block read aborts the whole reduction and no partial result is
/// kept.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The matrix has no columns, so there is nothing to plan over.
    #[error("total column count must be positive")]
    NoColumns,

    /// A chunk size of zero can never cover the column axis.
    #[error("chunk size must be positive")]
    ZeroChunkSize,

    /// The chunk plan was built for a different matrix.
    #[error("chunk plan covers {plan_columns} columns but the matrix has {matrix_columns}")]
    PlanShapeMismatch {
        plan_columns: usize,
        matrix_columns: usize,
    },

    /// The source handed back a block of the wrong shape.
    #[error(
        "block for columns {start}..{end} has shape {got_rows}x{got_columns}, expected {rows}x{columns}"
    )]
    BlockShape {
        start: usize,
        end: usize,
        rows: usize,
        columns: usize,
        got_rows: usize,
        got_columns: usize,
    },

    /// A block could not be materialized from the backing store.
    #[error("failed to materialize column block {start}..{end}")]
    BlockRead {
        start: usize,
        end: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type alias for tenxbrain-core operations.
pub type Result<T> = std::result::Result<T, SummaryError>;
