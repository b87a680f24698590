/// Default number of columns materialized per block.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default memory budget for one materialized block, in bytes (1 GiB).
///
/// The effective chunk size is clamped so that `rows * chunk_size` `u32`
/// values fit this budget; see [`crate::plan::effective_chunk_size`].
pub const DEFAULT_MEMORY_BUDGET: usize = 1 << 30;

/// Size of one stored count value (`u32`), in bytes.
pub const BYTES_PER_COUNT: usize = 4;
