use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for tenxbrain-store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File is not a ccm file.
    #[error("{0} doesn't appear to be a valid .ccm file")]
    BadMagic(PathBuf),

    /// File length disagrees with the dimensions in its header.
    #[error("{path} holds {actual} bytes but a {rows}x{columns} matrix needs {expected}")]
    Truncated {
        path: PathBuf,
        rows: usize,
        columns: usize,
        expected: usize,
        actual: usize,
    },

    /// Header dimensions overflow the address space.
    #[error("{0} declares dimensions too large to address")]
    DimensionOverflow(PathBuf),

    /// Requested columns fall outside the matrix.
    #[error("column range {start}..{end} is out of bounds for {columns} columns")]
    ColumnRangeOutOfBounds {
        start: usize,
        end: usize,
        columns: usize,
    },

    /// A written column has the wrong number of rows.
    #[error("column has {got} values, expected {rows}")]
    ColumnLength { got: usize, rows: usize },

    /// More columns written than the header declares.
    #[error("attempted to write column {index} to a {columns}-column matrix")]
    ColumnOverflow { index: usize, columns: usize },

    /// Writer finished before every column was written.
    #[error("only {written} of {columns} columns were written")]
    IncompleteWrite { written: usize, columns: usize },

    /// A gene table line that does not parse as id + symbol.
    #[error("malformed gene record at line {line}: {text:?}")]
    MalformedGeneRecord { line: usize, text: String },
}

/// Result type alias for tenxbrain-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
