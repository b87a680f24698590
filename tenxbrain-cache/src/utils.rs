use super::consts::{DEFAULT_HUB_URL, TENXBRAIN_CACHE_ENV, TENXBRAIN_HUB_ENV};
use dirs::home_dir;
use std::env;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use super::client::CachedResource;

#[derive(Tabled)]
pub struct ResourcePrint {
    name: String,
    size: u64,
    path: String,
}

/// Get default cache folder from environment variable, if not available then create it in home folder
///
/// # Returns
/// - path to cache folder
pub fn get_default_cache_folder() -> PathBuf {
    if let Ok(val) = env::var(TENXBRAIN_CACHE_ENV) {
        PathBuf::from(val)
    } else {
        let home = env::var("HOME")
            .or_else(|_| {
                home_dir()
                    .map(|p| p.to_string_lossy().into_owned())
                    .ok_or(std::env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| "/tmp".to_string());

        let mut path = PathBuf::from(home);
        path.push(".tenxbrain/");
        path
    }
}

/// Get default hub base URL from environment variable
///
/// # Returns
/// - hub base URL
pub fn get_default_hub_url() -> String {
    env::var(TENXBRAIN_HUB_ENV).unwrap_or_else(|_| DEFAULT_HUB_URL.to_string())
}

pub fn print_resources(resources: Vec<CachedResource>) {
    let mut resource_print: Vec<ResourcePrint> = Vec::new();

    for resource in resources {
        resource_print.push(ResourcePrint {
            name: resource.name,
            size: resource.size,
            path: resource.path.to_string_lossy().into_owned(),
        })
    }

    let table = Table::new(resource_print);

    println!("{}", table);
}
