use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::cli::FetchArgs;
use crate::util::{ensure_directory, partial_path, remove_file_if_exists};

pub fn run(args: FetchArgs) -> Result<()> {
    let (archive_path, downloaded) = fetch_archive(&args.download_dir, &args.url, args.clobber)?;
    info!(path = %archive_path.display(), downloaded, "fetch completed");
    Ok(())
}

pub(crate) fn fetch_archive(dest_dir: &Path, url: &str, clobber: bool) -> Result<(PathBuf, bool)> {
    ensure_directory(dest_dir)?;

    let archive_path = dest_dir.join(archive_file_name(url)?);
    if archive_path.exists() && !clobber {
        warn!(path = %archive_path.display(), "archive exists; not downloading");
        return Ok((archive_path, false));
    }

    warn!(url = %url, path = %archive_path.display(), "downloading taxonomy archive");

    let client = Client::builder()
        .timeout(None)
        .build()
        .context("failed to build http client")?;
    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to request {url}"))?
        .error_for_status()
        .with_context(|| format!("server rejected request for {url}"))?;

    let staging_path = partial_path(&archive_path);
    let mut file = File::create(&staging_path)
        .with_context(|| format!("failed to create {}", staging_path.display()))?;
    let bytes = response
        .copy_to(&mut file)
        .with_context(|| format!("failed to download {url}"))?;
    drop(file);

    remove_file_if_exists(&archive_path)?;
    fs::rename(&staging_path, &archive_path).with_context(|| {
        format!(
            "failed to move {} to {}",
            staging_path.display(),
            archive_path.display()
        )
    })?;

    info!(path = %archive_path.display(), bytes, "downloaded taxonomy archive");
    Ok((archive_path, true))
}

fn archive_file_name(url: &str) -> Result<&str> {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .with_context(|| format!("url does not end in a file name: {url}"))
}
