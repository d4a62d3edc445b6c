use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One uploaded chunk of the original file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Part {
    pub index: u64,
    pub id: String,
    /// Direct fetch URL. Empty when the joiner should derive it from `id`.
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Manifest {
    pub original_name: String,
    pub total_size: u64,
    pub parts: Vec<Part>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Manifest> {
        let f = File::open(path).with_context(|| format!("open manifest {}", path.display()))?;
        let mf = serde_json::from_reader(f)
            .with_context(|| format!("parse manifest {}", path.display()))?;
        Ok(mf)
    }

    /// Write the manifest as indented JSON so recipients can read it.
    pub fn save_pretty(&self, path: &Path) -> Result<()> {
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(f, self)?;
        Ok(())
    }
}

/// Utility: standard part filename for an index
pub fn part_file_name(original_name: &str, index: u64) -> String {
    format!("{original_name}.part{index}")
}
