use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::client::Uploader;
use crate::manifest::{part_file_name, Manifest, Part};

/// Default part size: the platform attachment limit.
pub const DEFAULT_PART_SIZE: usize = 15 * 1024 * 1024;

/// Read `path` in `part_size` chunks, upload each in order, and return the
/// manifest describing reassembly. One chunk is buffered at a time, so peak
/// memory stays at `part_size` regardless of file size.
///
/// On upload failure the whole operation aborts; parts already uploaded are
/// left orphaned on the remote store.
pub fn split_and_upload(
    path: &Path,
    uploader: &dyn Uploader,
    part_size: usize,
) -> Result<Manifest> {
    // A zero part size would read nothing and yield an empty manifest
    // for a non-empty file.
    if part_size == 0 {
        bail!("part size must be non-zero");
    }
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let total_size = file.metadata()?.len();
    let original_name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?
        .to_string_lossy()
        .to_string();

    let mut manifest =
        Manifest { original_name: original_name.clone(), total_size, parts: Vec::new() };

    let mut buf = vec![0u8; part_size];
    let mut index = 0u64;
    loop {
        let n = read_full(&mut file, &mut buf)?;
        if n == 0 {
            break;
        }
        let part_name = part_file_name(&original_name, index);
        let id = uploader
            .upload_part(&buf[..n], &part_name)
            .with_context(|| format!("upload part {index}"))?;
        manifest.parts.push(Part { index, id, url: String::new() });
        index += 1;
    }

    Ok(manifest)
}

// Fill `buf` completely unless EOF cuts the chunk short. A plain `read`
// may return less than the buffer at any time, which would produce
// undersized middle parts.
fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
