//! # tenxbrain
//!
//! Cached access to the 10x Genomics 1.3 million brain cell UMI count
//! matrix, with per-gene and per-cell summary statistics computed in a
//! single bounded-memory pass. See the member crates for the pieces:
//! the chunked reduction core, the `.ccm` column store, and the
//! download/summary caches.

#[cfg(feature = "core")]
#[doc(inline)]
pub use tenxbrain_core as core;

#[cfg(feature = "store")]
#[doc(inline)]
pub use tenxbrain_store as store;

#[cfg(feature = "cache")]
#[doc(inline)]
pub use tenxbrain_cache as cache;
