//! # On-disk storage for tenxbrain datasets.
//!
//! This small crate owns the `.ccm` columnar count-matrix format and the
//! plain-text metadata tables that travel with it. A `.ccm` file holds a
//! fixed header followed by column-major `u32` counts, which makes a
//! contiguous range of columns a contiguous range of bytes; [`CcmReader`]
//! memory-maps the file and serves dense column blocks without ever holding
//! more than the requested block, which is what lets the reduction core
//! stream a 150 GB matrix through a bounded budget.

pub mod ccm;
pub mod error;
pub mod metadata;

pub use ccm::{CCM_HEADER_LEN, CCM_MAGIC, CcmReader, CcmWriter, write_dense};
pub use error::{Result, StoreError};
pub use metadata::{GeneRecord, read_barcodes, read_gene_table};
