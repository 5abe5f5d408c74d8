//! Download gate and HTTP downloader
//!
//! The gate turns a downloadable URI into a file in the output directory,
//! at most once and only when no file of that name is already there.
//! Transfers run on their own bounded pool so large files never hold up link
//! discovery.
//!
//! Two different URIs with the same last path segment map to the same file.
//! Whichever transfer finishes last wins; names are not disambiguated.

use crate::uri::CanonicalUri;
use crate::DownloadError;
use reqwest::{Client, Response};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

/// Transfers the bytes of a resource to a file
pub trait Downloader: Send + Sync + 'static {
    /// Writes the resource at `uri` to `destination`, returning the byte count
    fn download(
        &self,
        uri: &CanonicalUri,
        destination: &Path,
    ) -> impl Future<Output = Result<u64, DownloadError>> + Send;
}

/// [`Downloader`] streaming response bodies to disk with reqwest
///
/// Bytes go to a partial file named after both the destination and the URI,
/// and are renamed into place once complete. An interrupted transfer never
/// leaves a file the gate would consider present, and two URIs saved under
/// the same name never write into the same partial file.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, uri: &CanonicalUri, destination: &Path) -> Result<u64, DownloadError> {
        let mut response = self
            .client
            .get(uri.as_str())
            .send()
            .await
            .map_err(|source| DownloadError::Http {
                uri: uri.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let partial = partial_path(destination, uri);

        match stream_to_file(&mut response, uri, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, destination)
                    .await
                    .map_err(|source| DownloadError::Write {
                        path: destination.to_path_buf(),
                        source,
                    })?;
                Ok(bytes)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!("Could not remove {}: {}", partial.display(), cleanup);
                }
                Err(e)
            }
        }
    }
}

async fn stream_to_file(
    response: &mut Response,
    uri: &CanonicalUri,
    path: &Path,
) -> Result<u64, DownloadError> {
    let write_error = |source| DownloadError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).await.map_err(write_error)?;
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(|source| DownloadError::Http {
        uri: uri.to_string(),
        source,
    })? {
        file.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(write_error)?;

    Ok(written)
}

/// Returns `<name>.<uri digest>.part` next to `destination`
fn partial_path(destination: &Path, uri: &CanonicalUri) -> PathBuf {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(uri.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());

    destination.with_file_name(format!("{}.{}.part", name, &digest[..16]))
}

/// Derives the file name a URI is saved under
///
/// The name is the percent-decoded last path segment. URIs without one, or
/// whose segment would escape the output directory, have no file name.
pub fn destination_name(uri: &CanonicalUri) -> Option<String> {
    let name = uri.file_name()?;

    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return None;
    }

    Some(name)
}

/// Outcome of handing a URI to the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was written
    Downloaded { path: PathBuf, bytes: u64 },

    /// A file of that name already exists; nothing was transferred
    AlreadyPresent(PathBuf),

    /// The URI has no usable file name
    NoFileName,

    /// The transfer failed; the error has been logged
    Failed,
}

/// Admits downloadable URIs into the bounded download pool
pub struct DownloadGate<D> {
    downloader: D,
    output_dir: PathBuf,
    permits: Semaphore,
}

impl<D: Downloader> DownloadGate<D> {
    pub fn new(downloader: D, output_dir: impl Into<PathBuf>, pool_size: usize) -> Self {
        Self {
            downloader,
            output_dir: output_dir.into(),
            permits: Semaphore::new(pool_size.max(1)),
        }
    }

    /// Returns where `uri` would be saved
    pub fn destination_for(&self, uri: &CanonicalUri) -> Option<PathBuf> {
        destination_name(uri).map(|name| self.output_dir.join(name))
    }

    /// Downloads `uri` unless its destination already exists
    ///
    /// Failures are logged and reported in the outcome; they never propagate.
    pub async fn admit(&self, uri: &CanonicalUri) -> DownloadOutcome {
        let Some(destination) = self.destination_for(uri) else {
            tracing::warn!("No file name to save {} under, skipping", uri);
            return DownloadOutcome::NoFileName;
        };

        if file_exists(&destination).await {
            tracing::debug!("{} already present, skipping {}", destination.display(), uri);
            return DownloadOutcome::AlreadyPresent(destination);
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::warn!("Download pool closed before {}: {}", uri, e);
                return DownloadOutcome::Failed;
            }
        };

        // Another URI with the same name may have finished while this one waited
        if file_exists(&destination).await {
            tracing::debug!("{} already present, skipping {}", destination.display(), uri);
            return DownloadOutcome::AlreadyPresent(destination);
        }

        match self.downloader.download(uri, &destination).await {
            Ok(bytes) => {
                tracing::info!("Downloaded {} to {} ({} bytes)", uri, destination.display(), bytes);
                DownloadOutcome::Downloaded {
                    path: destination,
                    bytes,
                }
            }
            Err(e) => {
                tracing::warn!("Download failed for {}: {}", uri, e);
                DownloadOutcome::Failed
            }
        }
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
