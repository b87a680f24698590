use clap::{Arg, ArgAction, Command, value_parser};
use tenxbrain_cache::consts::{
    TENXBRAIN_FETCH, TENXBRAIN_INSPECT, TENXBRAIN_REMOVE, TENXBRAIN_SEEK, TENXBRAIN_STATS,
};

fn cache_folder_arg() -> Arg {
    Arg::new("cache-folder")
        .long("cache-folder")
        .short('f')
        .help("Cache folder path")
}

pub fn create_fetch_cli() -> Command {
    Command::new(TENXBRAIN_FETCH)
        .about("Download the dataset files into the cache, or add local copies")
        .arg(
            Arg::new("identifier")
                .long("identifier")
                .short('i')
                .help("Logical file name or local file path; omit to fetch the whole dataset"),
        )
        .arg(cache_folder_arg())
        .arg(
            Arg::new("hub-url")
                .long("hub-url")
                .short('u')
                .help("Base URL of the hub serving the dataset files"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite an existing cached copy when adding a local file"),
        )
}

pub fn create_stats_cli() -> Command {
    Command::new(TENXBRAIN_STATS)
        .about("Compute (or load) per-gene and per-cell summary statistics")
        .arg(cache_folder_arg())
        .arg(
            Arg::new("hub-url")
                .long("hub-url")
                .short('u')
                .help("Base URL of the hub serving the dataset files"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .short('c')
                .value_parser(value_parser!(usize))
                .help("Columns materialized per block (default 10000)"),
        )
        .arg(
            Arg::new("memory-budget")
                .long("memory-budget")
                .short('m')
                .value_parser(value_parser!(usize))
                .help("Byte budget for one materialized block (default 1 GiB)"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Discard any cached summary and recompute"),
        )
}

pub fn create_seek_cli() -> Command {
    Command::new(TENXBRAIN_SEEK)
        .about("Print the local path of a cached file by logical name")
        .arg(
            Arg::new("identifier")
                .long("identifier")
                .short('i')
                .required(true)
                .help("Logical file name"),
        )
        .arg(cache_folder_arg())
}

pub fn create_inspect_cli() -> Command {
    Command::new(TENXBRAIN_INSPECT)
        .about("Inspect the contents of the cache folder")
        .arg(cache_folder_arg())
}

pub fn create_remove_cli() -> Command {
    Command::new(TENXBRAIN_REMOVE)
        .about("Remove a cached file by logical name")
        .arg(
            Arg::new("identifier")
                .long("identifier")
                .short('i')
                .required(true)
                .help("Logical file name"),
        )
        .arg(cache_folder_arg())
}
