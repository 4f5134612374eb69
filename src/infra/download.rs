//! Source download and extraction
//!
//! Fetches release archives into the shared download cache and unpacks
//! them into the build directory. Transport failures are retried with
//! exponential backoff; every retry is logged.

use flate2::read::GzDecoder;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;

use crate::config::defaults;
use crate::error::DownloadError;

/// Progress callback type for download progress reporting
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Download manager for fetching files with retry support
#[derive(Debug, Clone)]
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
    /// Maximum retry attempts
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self::with_config(defaults::MAX_DOWNLOAD_RETRIES, 1000)
    }

    /// Create a download manager with custom settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            max_retries,
            base_delay_ms,
        }
    }

    /// Download a file with retry logic
    ///
    /// The body is streamed into a temporary file next to `dest` and
    /// renamed into place only once complete, so a shared cache never
    /// exposes a partial archive.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<DownloadResult, DownloadError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;

            match self.download_once(url, dest, progress.as_ref()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        "Download attempt {attempts}/{} failed: {e}",
                        self.max_retries
                    );
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        // Exponential backoff with cap at 30 seconds
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DownloadError::MaxRetriesExceeded {
            url: url.to_string(),
            retries: self.max_retries,
        }))
    }

    /// Single download attempt without retry
    async fn download_once(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<DownloadResult, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        let total_size = response.content_length().unwrap_or(0);

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let io_err = |path: &Path, e: &dyn std::fmt::Display| DownloadError::IoError {
            path: path.to_path_buf(),
            error: e.to_string(),
        };

        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, &e))?;
        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(|e| io_err(parent, &e))?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk).map_err(|e| io_err(dest, &e))?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;

            if let Some(cb) = progress {
                cb(downloaded, total_size);
            }
        }

        file.flush().map_err(|e| io_err(dest, &e))?;
        file.persist(dest).map_err(|e| io_err(dest, &e.error))?;

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum: hex::encode(hasher.finalize()),
        })
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches a release archive and returns its extracted source tree
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    manager: DownloadManager,
    distfiles: PathBuf,
}

impl SourceFetcher {
    /// Create a fetcher caching archives in `distfiles`
    pub fn new(distfiles: PathBuf) -> Self {
        Self {
            manager: DownloadManager::new(),
            distfiles,
        }
    }

    /// Use a custom download manager
    #[must_use]
    pub fn with_manager(mut self, manager: DownloadManager) -> Self {
        self.manager = manager;
        self
    }

    /// Download `url` (unless cached) and extract it under `build_dir`
    ///
    /// Returns the extracted source directory, named after the archive
    /// (`php-5.4.1.tar.gz` extracts to `php-5.4.1/`). An existing source
    /// directory is reused as is; it only ever appears fully extracted.
    pub async fn fetch(
        &self,
        url: &str,
        build_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, DownloadError> {
        let archive_name = archive_file_name(url);
        let source_dir = build_dir.join(source_dir_name(&archive_name));

        if source_dir.is_dir() {
            tracing::info!("Using existing source tree {}", source_dir.display());
            return Ok(source_dir);
        }

        let archive = self.distfiles.join(&archive_name);
        if archive.is_file() {
            tracing::info!("Using cached archive {}", archive.display());
        } else {
            tracing::info!("Downloading {url}");
            let result = self.manager.download(url, &archive, progress).await?;
            tracing::debug!(
                "Downloaded {} bytes, sha256 {}",
                result.size,
                result.checksum
            );
        }

        // Unpack next to the final location and move the tree into place
        // only once complete, so an interrupted run leaves nothing to reuse.
        let io_err = |path: &Path, e: std::io::Error| DownloadError::IoError {
            path: path.to_path_buf(),
            error: e.to_string(),
        };
        std::fs::create_dir_all(build_dir).map_err(|e| io_err(build_dir, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".extract-")
            .tempdir_in(build_dir)
            .map_err(|e| io_err(build_dir, e))?;

        extract_tar_gz(&archive, staging.path())?;

        let extracted = staging.path().join(source_dir_name(&archive_name));
        if !extracted.is_dir() {
            return Err(DownloadError::MissingSource { path: source_dir });
        }
        std::fs::rename(&extracted, &source_dir).map_err(|e| io_err(&source_dir, e))?;
        Ok(source_dir)
    }
}

/// Last path segment of a URL
fn archive_file_name(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("source.tar.gz")
        .to_string()
}

/// Directory name an archive is expected to extract to
fn source_dir_name(archive_name: &str) -> &str {
    archive_name
        .strip_suffix(".tar.gz")
        .or_else(|| archive_name.strip_suffix(".tgz"))
        .unwrap_or(archive_name)
}

/// Unpack a `.tar.gz` archive into `dest`
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), DownloadError> {
    let extract_err = |e: std::io::Error| DownloadError::Extract {
        archive: archive_path.to_path_buf(),
        error: e.to_string(),
    };

    std::fs::create_dir_all(dest).map_err(|e| DownloadError::IoError {
        path: dest.to_path_buf(),
        error: e.to_string(),
    })?;

    let file = File::open(archive_path).map_err(extract_err)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);
    archive.unpack(dest).map_err(extract_err)?;

    tracing::debug!("Unpacked {} to {}", archive_path.display(), dest.display());
    Ok(())
}
