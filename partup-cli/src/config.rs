use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize)]
struct Config {
    token: String,
}

fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("no user config directory")?;
    Ok(dir.join("partup").join("config.json"))
}

pub fn save_token(token: &str) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let f = fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer(f, &Config { token: token.to_string() })?;
    Ok(())
}

/// Ok(None) when no token has been saved yet.
pub fn load_token() -> Result<Option<String>> {
    let path = config_path()?;
    let f = match fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("open {}", path.display())),
    };
    let cfg: Config =
        serde_json::from_reader(f).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg.token))
}
