//! # Cached access to the 1.3M brain cell dataset.
//!
//! This crate is the data-access layer of tenxbrain. [`client::HubClient`]
//! resolves logical file names to local paths, downloading from the hub on
//! first request and reusing the cached copy thereafter.
//! [`results::SummaryCache`] persists the streaming-reduction summary so
//! the full pass over the matrix runs once per dataset version, and
//! [`dataset`] wires client, store, and compute core together into the
//! fetch-summarize-annotate flow the CLI exposes.

pub mod client;
pub mod consts;
pub mod dataset;
pub mod results;
pub mod utils;

pub use client::{CachedResource, HubClient};
pub use dataset::{
    AnnotatedCell, AnnotatedDataset, AnnotatedGene, DatasetSpec, ReduceOptions, brain_1m,
    fetch_annotated, summarize,
};
pub use results::{CacheOutcome, DatasetSummary, SummaryCache};
