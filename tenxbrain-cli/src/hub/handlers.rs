use std::path::PathBuf;

use clap::ArgMatches;
use tenxbrain_cache::client::HubClient;
use tenxbrain_cache::dataset::{ReduceOptions, brain_1m, fetch_annotated};
use tenxbrain_cache::results::SummaryCache;
use tenxbrain_cache::utils::{get_default_cache_folder, print_resources};

fn build_client(matches: &ArgMatches) -> HubClient {
    let cache_folder = matches
        .get_one::<String>("cache-folder")
        .map(PathBuf::from)
        .unwrap_or_else(get_default_cache_folder);

    let mut builder = HubClient::builder().with_cache_folder(cache_folder);
    if let Ok(Some(url)) = matches.try_get_one::<String>("hub-url") {
        builder = builder.with_hub_url(url.clone());
    }
    builder.finish().expect("Failed to create the hub client")
}

pub fn run_fetch(matches: &ArgMatches) {
    let client = build_client(matches);
    let force = matches.get_flag("force");

    match matches.get_one::<String>("identifier") {
        Some(identifier) => {
            let path = PathBuf::from(identifier);
            if path.is_file() {
                println!(
                    "Detected '{}' as a local file. Adding to cache...",
                    path.display()
                );
                client
                    .add_local_dataset(&path, force)
                    .expect("Failed to add local file to cache");
            } else {
                let local = client
                    .resolve(identifier)
                    .expect("Failed to fetch file from the hub");
                println!("{}", local.display());
            }
        }
        None => {
            let spec = brain_1m();
            for name in [spec.matrix, spec.genes, spec.barcodes] {
                let local = client
                    .resolve(name)
                    .expect("Failed to fetch file from the hub");
                println!("{}", local.display());
            }
        }
    }
}

pub fn run_stats(matches: &ArgMatches) {
    let client = build_client(matches);
    let spec = brain_1m();

    let mut options = ReduceOptions::default();
    if let Some(&chunk_size) = matches.get_one::<usize>("chunk-size") {
        options.chunk_size = chunk_size;
    }
    if let Some(&memory_budget) = matches.get_one::<usize>("memory-budget") {
        options.memory_budget = memory_budget;
    }

    if matches.get_flag("force") {
        SummaryCache::new(&client)
            .invalidate(spec.name)
            .expect("Failed to drop the cached summary");
    }

    let (dataset, cached) =
        fetch_annotated(&client, &spec, &options).expect("Failed to summarize the dataset");

    if cached {
        println!("Loaded cached summary for {}", dataset.name);
    } else {
        println!("Computed fresh summary for {}", dataset.name);
    }

    let total: u64 = dataset.cells.iter().map(|c| c.total_count).sum();
    let mean_detected =
        dataset.cells.iter().map(|c| c.genes_detected).sum::<u64>() as f64
            / dataset.cells.len().max(1) as f64;
    println!("Genes: {}", dataset.genes.len());
    println!("Cells: {}", dataset.cells.len());
    println!("Total UMI counts: {}", total);
    println!("Mean genes detected per cell: {:.1}", mean_detected);
}

pub fn run_seek(matches: &ArgMatches) {
    let client = build_client(matches);
    let identifier = matches
        .get_one::<String>("identifier")
        .expect("A logical file name is required");

    let path = client.seek(identifier).expect("Failed to seek file in cache");
    println!("{}", path.display());
}

pub fn run_inspect(matches: &ArgMatches) {
    let client = build_client(matches);
    let resources = client.list().expect("Failed to list the cache folder");
    let n = resources.len();
    print_resources(resources);
    println!("Number of cached files: {}", n);
}

pub fn run_remove(matches: &ArgMatches) {
    let client = build_client(matches);
    let identifier = matches
        .get_one::<String>("identifier")
        .expect("A logical file name is required");

    client
        .remove(identifier)
        .expect("Failed to remove file from cache");
}
