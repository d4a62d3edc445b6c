use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::client::{attachment_url, Downloader, DEFAULT_CDN_URL};
use crate::manifest::{part_file_name, Manifest};

/// Restore the original file described by the manifest at `manifest_path`
/// into `out_dir`, downloading each part and appending in index order.
/// Returns the path of the restored file.
///
/// Aborts on the first failure, leaving the output partially written.
pub fn download_and_join(
    manifest_path: &Path,
    downloader: &dyn Downloader,
    out_dir: &Path,
) -> Result<PathBuf> {
    let mut manifest = Manifest::load(manifest_path)?;

    // The manifest comes from an untrusted sender: a name with path
    // components could escape `out_dir`.
    let name = manifest.original_name.as_str();
    if Path::new(name).file_name() != Some(OsStr::new(name)) {
        bail!("unsafe original_name in manifest: {name:?}");
    }

    // Manifest order is not trusted.
    manifest.parts.sort_by_key(|p| p.index);

    let out_path = out_dir.join(&manifest.original_name);
    let mut out = File::create(&out_path)
        .with_context(|| format!("create output {}", out_path.display()))?;

    // Per-run temp dir so concurrent restores of the same original_name
    // cannot clobber each other's part files.
    let temp = tempfile::tempdir().context("create temp dir")?;
    for part in &manifest.parts {
        let url = if part.url.is_empty() {
            attachment_url(DEFAULT_CDN_URL, &part.id)
        } else {
            part.url.clone()
        };

        let part_path = temp.path().join(part_file_name(&manifest.original_name, part.index));
        eprintln!("Downloading part {}...", part.index);
        downloader
            .download_to_path(&url, &part_path)
            .with_context(|| format!("download part {}", part.index))?;

        append_part(&part_path, &mut out)
            .with_context(|| format!("append part {}", part.index))?;
    }

    Ok(out_path)
}

// Copy the temp part into the output, then remove it. Removal is
// attempted even when the copy fails; the copy error still wins.
fn append_part(part_path: &Path, out: &mut File) -> Result<()> {
    let copied = OpenOptions::new()
        .read(true)
        .open(part_path)
        .and_then(|mut part| io::copy(&mut part, out));
    let _ = fs::remove_file(part_path);
    copied?;
    Ok(())
}
