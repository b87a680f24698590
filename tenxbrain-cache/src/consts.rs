//! Constants for cache configuration and dataset naming.

// Environment variable names

/// Environment variable name for setting the cache directory location.
///
/// When set, this overrides the default cache location (`~/.tenxbrain/`).
pub const TENXBRAIN_CACHE_ENV: &str = "TENXBRAIN_CACHE";

/// Environment variable name for setting the hub base URL.
///
/// When set, this overrides the default hub serving the dataset files.
pub const TENXBRAIN_HUB_ENV: &str = "TENXBRAIN_HUB";

/// Default hub base URL (the 10x Genomics sample bucket hosting the 1.3M
/// brain cell dataset).
pub const DEFAULT_HUB_URL: &str = "https://cf.10xgenomics.com/samples/cell-exp/1.3.0/1M_neurons";

// Command-line interface command names

/// Main tenxbrain command name.
pub const TENXBRAIN_CMD: &str = "tenxbrain";

/// Subcommand for downloading dataset files into the cache.
pub const TENXBRAIN_FETCH: &str = "fetch";

/// Subcommand for computing or loading the dataset summary.
pub const TENXBRAIN_STATS: &str = "stats";

/// Subcommand for locating a cached resource.
pub const TENXBRAIN_SEEK: &str = "seek";

/// Subcommand for listing cached resources.
pub const TENXBRAIN_INSPECT: &str = "inspect";

/// Subcommand for removing cached resources.
pub const TENXBRAIN_REMOVE: &str = "rm";

// Directory structure constants

/// Subdirectory for downloaded dataset files.
pub const DEFAULT_DATASET_SUBFOLDER: &str = "datasets";

/// Subdirectory for persisted summary records.
pub const DEFAULT_SUMMARY_SUBFOLDER: &str = "summaries";

// File extension constants

/// Extension for persisted summary records (bincode-serialized).
pub const DEFAULT_SUMMARY_EXT: &str = ".summary.bin";

/// Extension for in-flight downloads, renamed away on completion.
pub const PARTIAL_EXT: &str = ".part";

// The shipped dataset: 1.3 million mouse brain cells (10x Genomics).

/// Logical dataset name.
pub const BRAIN_1M: &str = "1M_neurons";

/// Logical name of the columnar count matrix file.
pub const BRAIN_1M_MATRIX: &str = "1M_neurons.ccm";

/// Logical name of the gene table (one row per matrix row).
pub const BRAIN_1M_GENES: &str = "1M_neurons_genes.tsv.gz";

/// Logical name of the barcode list (one line per matrix column).
pub const BRAIN_1M_BARCODES: &str = "1M_neurons_barcodes.tsv.gz";

/// Number of genes (matrix rows) in the shipped dataset.
pub const BRAIN_1M_GENE_COUNT: usize = 27_998;

/// Number of cells (matrix columns) in the shipped dataset.
pub const BRAIN_1M_CELL_COUNT: usize = 1_306_127;
