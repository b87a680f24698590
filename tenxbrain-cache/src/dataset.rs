//! End-to-end dataset access: resolve files, summarize once, annotate.
//!
//! This is the glue the CLI drives: the hub client resolves the matrix and
//! metadata files (downloading on first run), the summary cache is
//! consulted before any computation, and on a miss the chunk planner and
//! streaming reducer produce the summary that is then persisted and joined
//! onto the gene and barcode tables.

use anyhow::{Result, ensure};

use tenxbrain_core::{
    ChunkPlan, DEFAULT_CHUNK_SIZE, DEFAULT_MEMORY_BUDGET, effective_chunk_size,
};
use tenxbrain_store::{CcmReader, GeneRecord, read_barcodes, read_gene_table};

#[cfg(not(feature = "parallel"))]
use tenxbrain_core::reduce;
#[cfg(feature = "parallel")]
use tenxbrain_core::reduce_parallel;

use super::client::HubClient;
use super::consts::{BRAIN_1M, BRAIN_1M_BARCODES, BRAIN_1M_GENES, BRAIN_1M_MATRIX};
use super::results::{CacheOutcome, DatasetSummary, SummaryCache};

/// Logical names of the files making up one dataset on the hub.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    /// Dataset name, also the summary cache key.
    pub name: &'static str,
    /// Columnar count matrix file.
    pub matrix: &'static str,
    /// Gene table, one record per matrix row.
    pub genes: &'static str,
    /// Barcode list, one line per matrix column.
    pub barcodes: &'static str,
}

/// The shipped dataset: 1.3 million mouse brain cells.
pub fn brain_1m() -> DatasetSpec {
    DatasetSpec {
        name: BRAIN_1M,
        matrix: BRAIN_1M_MATRIX,
        genes: BRAIN_1M_GENES,
        barcodes: BRAIN_1M_BARCODES,
    }
}

/// Tunables for the streaming reduction.
#[derive(Debug, Clone, Copy)]
pub struct ReduceOptions {
    /// Requested columns per block.
    pub chunk_size: usize,
    /// Upper bound in bytes for one materialized block; clamps the chunk
    /// size when the matrix is tall.
    pub memory_budget: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        ReduceOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            memory_budget: DEFAULT_MEMORY_BUDGET,
        }
    }
}

/// A gene joined with its per-row statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedGene {
    pub id: String,
    pub symbol: String,
    /// Mean count across all cells.
    pub mean_count: f64,
}

/// A cell joined with its per-column statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedCell {
    pub barcode: String,
    /// Total UMI counts in this cell (library size).
    pub total_count: u64,
    /// Number of genes with a nonzero count in this cell.
    pub genes_detected: u64,
}

/// The dataset's metadata tables with summary statistics attached.
#[derive(Debug, Clone)]
pub struct AnnotatedDataset {
    pub name: String,
    pub genes: Vec<AnnotatedGene>,
    pub cells: Vec<AnnotatedCell>,
}

/// Return the dataset summary, computing it only if no cached record
/// exists under the dataset's name.
///
/// On a miss this opens the matrix, clamps the chunk size to the memory
/// budget, plans the column partition, and runs the single-pass reduction.
pub fn summarize(
    client: &HubClient,
    spec: &DatasetSpec,
    options: &ReduceOptions,
) -> Result<CacheOutcome> {
    let cache = SummaryCache::new(client);
    cache.get_or_compute(spec.name, || {
        let matrix_path = client.resolve(spec.matrix)?;
        let reader = CcmReader::open(&matrix_path)?;

        let chunk_size = effective_chunk_size(
            reader.rows(),
            options.chunk_size,
            options.memory_budget,
        );
        let plan = ChunkPlan::new(reader.columns(), chunk_size)?;

        #[cfg(feature = "parallel")]
        let summary = reduce_parallel(&reader, &plan)?;
        #[cfg(not(feature = "parallel"))]
        let summary = reduce(&reader, &plan)?;

        Ok(DatasetSummary {
            matrix: spec.matrix.to_string(),
            summary,
        })
    })
}

/// Join a summary onto the dataset's gene and barcode tables.
///
/// The tables must line up exactly with the matrix dimensions the summary
/// was computed over.
pub fn annotate(
    name: &str,
    genes: Vec<GeneRecord>,
    barcodes: Vec<String>,
    record: &DatasetSummary,
) -> Result<AnnotatedDataset> {
    let summary = &record.summary;
    ensure!(
        genes.len() == summary.rows,
        "gene table has {} records but the matrix has {} rows",
        genes.len(),
        summary.rows
    );
    ensure!(
        barcodes.len() == summary.columns,
        "barcode list has {} entries but the matrix has {} columns",
        barcodes.len(),
        summary.columns
    );

    let genes = genes
        .into_iter()
        .zip(&summary.row_mean)
        .map(|(gene, &mean_count)| AnnotatedGene {
            id: gene.id,
            symbol: gene.symbol,
            mean_count,
        })
        .collect();

    let cells = barcodes
        .into_iter()
        .enumerate()
        .map(|(j, barcode)| AnnotatedCell {
            barcode,
            total_count: summary.column_sum[j],
            genes_detected: summary.column_nonzero[j],
        })
        .collect();

    Ok(AnnotatedDataset {
        name: name.to_string(),
        genes,
        cells,
    })
}

/// Resolve, summarize, and annotate a dataset in one call.
///
/// Returns the annotated dataset together with the provenance of its
/// summary (cached or freshly computed).
pub fn fetch_annotated(
    client: &HubClient,
    spec: &DatasetSpec,
    options: &ReduceOptions,
) -> Result<(AnnotatedDataset, bool)> {
    let genes = read_gene_table(client.resolve(spec.genes)?)?;
    let barcodes = read_barcodes(client.resolve(spec.barcodes)?)?;

    let outcome = summarize(client, spec, options)?;
    let cached = outcome.is_cached();
    let record = outcome.into_inner();

    let dataset = annotate(spec.name, genes, barcodes, &record)?;
    Ok((dataset, cached))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::path::Path;
    use tempfile::TempDir;
    use tenxbrain_store::write_dense;

    /// A dataset staged entirely from local files, so no test touches the
    /// network.
    const TINY: DatasetSpec = DatasetSpec {
        name: "tiny",
        matrix: "tiny.ccm",
        genes: "tiny_genes.tsv",
        barcodes: "tiny_barcodes.tsv",
    };

    fn stage_tiny_dataset(dir: &Path) -> HubClient {
        let client = HubClient::builder()
            .with_cache_folder(dir.join("cache"))
            .finish()
            .unwrap();

        let matrix = arr2(&[[1u32, 0, 2], [3, 4, 0]]);
        let matrix_path = dir.join(TINY.matrix);
        write_dense(&matrix_path, &matrix).unwrap();

        let genes_path = dir.join(TINY.genes);
        std::fs::write(&genes_path, "ENSMUSG01\tXkr4\nENSMUSG02\tRp1\n").unwrap();

        let barcodes_path = dir.join(TINY.barcodes);
        std::fs::write(&barcodes_path, "AAA-1\nCCC-1\nGGG-1\n").unwrap();

        for path in [&matrix_path, &genes_path, &barcodes_path] {
            client.add_local_dataset(path, false).unwrap();
        }
        client
    }

    #[fixture]
    fn tempdir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn fresh_then_cached(tempdir: TempDir) {
        let client = stage_tiny_dataset(tempdir.path());
        let options = ReduceOptions {
            chunk_size: 2,
            ..Default::default()
        };

        let (dataset, cached) = fetch_annotated(&client, &TINY, &options).unwrap();
        assert!(!cached);

        assert_eq!(dataset.genes.len(), 2);
        assert_eq!(dataset.genes[0].symbol, "Xkr4");
        assert_eq!(dataset.genes[0].mean_count, 1.0);
        assert_eq!(dataset.genes[1].mean_count, 7.0 / 3.0);

        assert_eq!(dataset.cells.len(), 3);
        assert_eq!(dataset.cells[0].total_count, 4);
        assert_eq!(dataset.cells[0].genes_detected, 2);
        assert_eq!(dataset.cells[2].total_count, 2);
        assert_eq!(dataset.cells[2].genes_detected, 1);

        // second run loads the persisted record
        let (again, cached) = fetch_annotated(&client, &TINY, &options).unwrap();
        assert!(cached);
        assert_eq!(again.genes, dataset.genes);
        assert_eq!(again.cells, dataset.cells);
    }

    #[rstest]
    fn summary_survives_even_a_one_column_budget(tempdir: TempDir) {
        let client = stage_tiny_dataset(tempdir.path());
        let options = ReduceOptions {
            chunk_size: 10_000,
            memory_budget: 1, // forces chunk size down to a single column
        };

        let outcome = summarize(&client, &TINY, &options).unwrap();
        let record = outcome.into_inner();
        assert_eq!(record.summary.column_sum, vec![4, 4, 2]);
        assert_eq!(record.summary.row_sum, vec![3, 7]);
    }

    #[rstest]
    fn mismatched_metadata_is_rejected(tempdir: TempDir) {
        let client = stage_tiny_dataset(tempdir.path());
        let record = summarize(&client, &TINY, &ReduceOptions::default())
            .unwrap()
            .into_inner();

        let genes = read_gene_table(client.resolve(TINY.genes).unwrap()).unwrap();
        let err = annotate("tiny", genes, vec!["AAA-1".into()], &record).unwrap_err();
        assert!(err.to_string().contains("barcode list"));
    }

    #[rstest]
    fn shipped_dataset_spec_is_wired_up() {
        let spec = brain_1m();
        assert_eq!(spec.name, "1M_neurons");
        assert_eq!(spec.matrix, "1M_neurons.ccm");
    }
}
