//! Hub caching client implementation.
//!
//! This module provides the core [`HubClient`] type and its builder for
//! resolving logical dataset file names to local paths, downloading from
//! the hub on first request and reusing the cached copy thereafter.

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use ureq::{Error as UreqError, get};

use std::fs::{File, create_dir_all, read_dir, remove_file, rename};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::consts::{DEFAULT_DATASET_SUBFOLDER, DEFAULT_SUMMARY_SUBFOLDER, PARTIAL_EXT};
use super::utils::{get_default_cache_folder, get_default_hub_url};

/// Builder for constructing a [`HubClient`] with custom configuration.
///
/// Use this builder to configure cache location and hub base URL before
/// creating a client instance.
///
/// # Examples
///
/// ```rust,no_run
/// use tenxbrain_cache::client::HubClient;
/// use std::path::PathBuf;
///
/// # fn main() -> anyhow::Result<()> {
/// let client = HubClient::builder()
///     .with_cache_folder(PathBuf::from("/custom/cache"))
///     .with_hub_url("https://hub.example.org/1M_neurons".to_string())
///     .finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct HubClientBuilder {
    cache_folder: Option<PathBuf>,
    hub_url: Option<String>,
}

impl HubClientBuilder {
    /// Creates a new, empty HubClientBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache folder for the HubClient.
    pub fn with_cache_folder(mut self, path: PathBuf) -> Self {
        self.cache_folder = Some(path);
        self
    }

    /// Sets the hub base URL for the HubClient.
    pub fn with_hub_url(mut self, url: String) -> Self {
        self.hub_url = Some(url);
        self
    }

    /// Consumes the builder and creates a HubClient.
    pub fn finish(self) -> Result<HubClient> {
        // handle the cache dir
        let raw_path_to_cache_folder = self.cache_folder.unwrap_or_else(get_default_cache_folder);
        let raw_str_to_cache_folder = raw_path_to_cache_folder.to_string_lossy().into_owned();
        let expanded_str = shellexpand::env(&raw_str_to_cache_folder)
            .unwrap_or_else(|_| raw_str_to_cache_folder.clone().into())
            .into_owned();
        let abs_path_to_cache_folder = PathBuf::from(expanded_str);
        create_dir_all(&abs_path_to_cache_folder)?;

        // handle the hub url
        let hub_url = self.hub_url.unwrap_or_else(get_default_hub_url);

        // create sub folders
        create_dir_all(abs_path_to_cache_folder.join(DEFAULT_DATASET_SUBFOLDER))?;
        create_dir_all(abs_path_to_cache_folder.join(DEFAULT_SUMMARY_SUBFOLDER))?;

        Ok(HubClient {
            cache_folder: abs_path_to_cache_folder,
            hub_url,
        })
    }
}

/// A cached file as reported by [`HubClient::list`].
#[derive(Debug, Clone)]
pub struct CachedResource {
    /// Logical name (the file name within the cache).
    pub name: String,
    /// Size on disk in bytes.
    pub size: u64,
    /// Local path.
    pub path: PathBuf,
}

/// Client for resolving and caching dataset files from a remote hub.
///
/// `HubClient` keeps two subfolders under its cache directory:
/// - **datasets/**: files downloaded from the hub (count matrix, metadata)
/// - **summaries/**: locally computed summary records
///
/// Resolution is by logical name: the first request for a name downloads
/// `{hub_url}/{name}` into the cache, every later request returns the
/// cached path without touching the network.
///
/// # Examples
///
/// ```rust,no_run
/// use tenxbrain_cache::client::HubClient;
/// use tenxbrain_cache::consts::BRAIN_1M_MATRIX;
///
/// # fn main() -> anyhow::Result<()> {
/// let client = HubClient::builder().finish()?;
///
/// // Download on first call, cached thereafter
/// let matrix_path = client.resolve(BRAIN_1M_MATRIX)?;
/// println!("Matrix at: {:?}", matrix_path);
/// # Ok(())
/// # }
/// ```
pub struct HubClient {
    /// Path to the root cache directory
    pub cache_folder: PathBuf,
    /// Hub base URL
    pub hub_url: String,
}

impl HubClient {
    /// Creates a new builder for constructing a [`HubClient`].
    pub fn builder() -> HubClientBuilder {
        HubClientBuilder::default()
    }

    fn dataset_path(&self, name: &str) -> PathBuf {
        self.cache_folder.join(DEFAULT_DATASET_SUBFOLDER).join(name)
    }

    fn summary_path(&self, name: &str) -> PathBuf {
        self.cache_folder.join(DEFAULT_SUMMARY_SUBFOLDER).join(name)
    }

    /// Folder where summary records are persisted.
    pub(crate) fn summary_folder(&self) -> PathBuf {
        self.cache_folder.join(DEFAULT_SUMMARY_SUBFOLDER)
    }

    /// Resolve a logical name to a local file path, downloading from the
    /// hub on first request.
    ///
    /// The download streams into a `.part` file that is renamed into place
    /// only on success, so an interrupted transfer never leaves a file the
    /// cache would later mistake for complete.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.dataset_path(name);
        if path.exists() {
            return Ok(path);
        }

        let url = format!("{}/{}", self.hub_url.trim_end_matches('/'), name);
        println!("Downloading {} to {}", url, path.display());
        self.download(&url, &path)
            .with_context(|| format!("Failed to download {} from the hub", name))?;
        Ok(path)
    }

    /// Writable path for persisting a computed artifact under a logical
    /// name. Only the path is produced; the caller writes the file.
    pub fn store(&self, name: &str) -> Result<PathBuf> {
        let path = self.summary_path(name);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Copy a local file into the dataset cache under its file name.
    ///
    /// Useful when the raw files were obtained out of band. Returns the
    /// logical name the file is now resolvable under.
    pub fn add_local_dataset(&self, file: &Path, force: bool) -> Result<String> {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("{} has no usable file name", file.display()))?
            .to_string();

        let cache_path = self.dataset_path(&name);
        if !force && cache_path.exists() {
            println!("{} already exists in cache", cache_path.display());
            return Ok(name);
        }

        std::fs::copy(file, &cache_path)
            .with_context(|| format!("Failed to copy {} into the cache", file.display()))?;
        println!("Dataset file cached to {}", cache_path.display());
        Ok(name)
    }

    /// Get local path to a cached dataset file or summary with specific name
    /// # Arguments
    /// - name: the logical name
    ///
    /// # Returns
    /// - the local path of the file
    pub fn seek(&self, name: &str) -> Result<PathBuf> {
        let file_path = self.dataset_path(name);
        if file_path.exists() {
            Ok(file_path)
        } else {
            let summary_path = self.summary_path(name);
            if summary_path.exists() {
                Ok(summary_path)
            } else {
                Err(anyhow!("{} does not exist in cache.", name))
            }
        }
    }

    /// List all cached dataset files and summaries.
    pub fn list(&self) -> Result<Vec<CachedResource>> {
        let mut resources = Vec::new();
        for subfolder in [DEFAULT_DATASET_SUBFOLDER, DEFAULT_SUMMARY_SUBFOLDER] {
            let folder = self.cache_folder.join(subfolder);
            if !folder.exists() {
                continue;
            }
            for entry in read_dir(&folder)? {
                let entry = entry?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let size = entry.metadata()?.len();
                resources.push(CachedResource { name, size, path });
            }
        }
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    /// Remove a cached dataset file or summary by logical name.
    pub fn remove(&self, name: &str) -> Result<()> {
        let file_path = self.dataset_path(name);
        if file_path.exists() {
            remove_file(&file_path)?;
            println!("{} is removed.", file_path.display());
            return Ok(());
        }
        let summary_path = self.summary_path(name);
        if summary_path.exists() {
            remove_file(&summary_path)?;
            println!("{} is removed.", summary_path.display());
            return Ok(());
        }
        Err(anyhow!("{} does not exist in cache.", name))
    }

    /// Stream a URL into `dest` via a temporary `.part` file.
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = match get(url).call() {
            Ok(resp) => resp,
            Err(UreqError::StatusCode(code)) => {
                return Err(anyhow!("HTTP status {} when fetching {}", code, url));
            }
            Err(e) => return Err(anyhow!("Request error when fetching {}: {}", url, e)),
        };

        let total = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let pb = match total {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}",
                        )
                        .unwrap(),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        pb.set_message("Downloading");

        let mut part = dest.to_path_buf();
        part.set_extension(match part.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}{}", ext, PARTIAL_EXT),
            None => PARTIAL_EXT.trim_start_matches('.').to_string(),
        });

        let result = (|| -> Result<()> {
            let file = File::create(&part)?;
            let mut writer = BufWriter::new(file);
            let mut reader = pb.wrap_read(response.into_body().into_reader());
            std::io::copy(&mut reader, &mut writer)?;
            Ok(())
        })();

        if let Err(e) = result {
            let _ = remove_file(&part);
            pb.finish_and_clear();
            return Err(e);
        }

        rename(&part, dest)?;
        pb.finish_and_clear();
        Ok(())
    }
}
