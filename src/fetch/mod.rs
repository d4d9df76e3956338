// src/fetch/mod.rs

use futures::StreamExt;
use reqwest::Client;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Instant,
};
use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AcquisitionError;

/// Size of the write buffer the response body is streamed through.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Make sure the raw source is present at `cache_path`.
///
/// With `force == false` an existing file is returned untouched and no request
/// is made. Otherwise the body is streamed into `<cache_path>.part` and renamed
/// over `cache_path` only after it has been fully written; a failed download
/// leaves any previous cache file in place.
#[tracing::instrument(
    level = "info",
    skip(client, cache_path),
    fields(path = %cache_path.as_ref().display())
)]
pub async fn acquire(
    client: &Client,
    source_uri: &str,
    cache_path: impl AsRef<Path>,
    force: bool,
) -> Result<PathBuf, AcquisitionError> {
    let cache_path = cache_path.as_ref();
    if !force && is_file(cache_path).await {
        info!("file already exists, skipping download");
        return Ok(cache_path.to_path_buf());
    }

    let url = Url::parse(source_uri).map_err(|source| AcquisitionError::InvalidUrl {
        url: source_uri.to_string(),
        source,
    })?;

    if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| AcquisitionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let part_path = part_path(cache_path);
    info!(url = %url, "downloading");
    let start = Instant::now();

    let written = match download(client, &url, &part_path).await {
        Ok(n) => n,
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part_path).await {
                debug!(error = %rm, "no partial file to remove");
            }
            warn!(error = %e, "download failed");
            return Err(e);
        }
    };

    fs::rename(&part_path, cache_path)
        .await
        .map_err(|source| AcquisitionError::Io {
            path: cache_path.to_path_buf(),
            source,
        })?;

    info!(bytes = written, elapsed = ?start.elapsed(), "downloaded");
    Ok(cache_path.to_path_buf())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    path.with_file_name(name)
}

/// Stream `url` into `dest`, returning the number of body bytes written.
async fn download(client: &Client, url: &Url, dest: &Path) -> Result<u64, AcquisitionError> {
    let request_err = |source| AcquisitionError::Request {
        url: url.to_string(),
        source,
    };
    let io_err = |source| AcquisitionError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let resp = client.get(url.clone()).send().await.map_err(request_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AcquisitionError::Status {
            url: url.to_string(),
            status,
        });
    }

    let file = fs::File::create(dest).await.map_err(io_err)?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut body = resp.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(request_err)?;
        writer.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }
    writer.flush().await.map_err(io_err)?;
    writer.get_ref().sync_all().await.map_err(io_err)?;

    Ok(written)
}
