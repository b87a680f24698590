mod hub;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "tenxbrain";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Downloads, caches, and summarizes the 1.3 million brain cell UMI count matrix.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(hub::cli::create_fetch_cli())
        .subcommand(hub::cli::create_stats_cli())
        .subcommand(hub::cli::create_seek_cli())
        .subcommand(hub::cli::create_inspect_cli())
        .subcommand(hub::cli::create_remove_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        Some((tenxbrain_cache::consts::TENXBRAIN_FETCH, matches)) => {
            hub::handlers::run_fetch(matches);
        }
        Some((tenxbrain_cache::consts::TENXBRAIN_STATS, matches)) => {
            hub::handlers::run_stats(matches);
        }
        Some((tenxbrain_cache::consts::TENXBRAIN_SEEK, matches)) => {
            hub::handlers::run_seek(matches);
        }
        Some((tenxbrain_cache::consts::TENXBRAIN_INSPECT, matches)) => {
            hub::handlers::run_inspect(matches);
        }
        Some((tenxbrain_cache::consts::TENXBRAIN_REMOVE, matches)) => {
            hub::handlers::run_remove(matches);
        }
        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
