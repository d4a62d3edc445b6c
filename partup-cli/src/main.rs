use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use partup_core::client::{AuthMode, Client};
use partup_core::join::download_and_join;
use partup_core::split::{split_and_upload, DEFAULT_PART_SIZE};

mod config;

const TOKEN_ENV: &str = "PARTUP_TOKEN";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Auth {
    Session,
    Bot,
}

impl From<Auth> for AuthMode {
    fn from(a: Auth) -> AuthMode {
        match a {
            Auth::Session => AuthMode::Session,
            Auth::Bot => AuthMode::Bot,
        }
    }
}

#[derive(Parser)]
#[command(name = "partup", version, about = "Upload large files to chat by splitting them into parts")]
struct Cli {
    /// API token (falls back to PARTUP_TOKEN, then the saved config)
    #[arg(long, short = 't', global = true)]
    token: Option<String>,
    /// Header the token is sent under
    #[arg(long, value_enum, default_value_t = Auth::Session, global = true)]
    auth: Auth,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Upload a file, splitting it when larger than the part size
    Send {
        file: PathBuf,
        /// Destination channel id
        #[arg(long, short = 'c')]
        channel: String,
        #[arg(long, default_value_t = DEFAULT_PART_SIZE)]
        part_size: usize,
    },
    /// Restore a split file from its manifest
    Restore {
        manifest: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Some(Cmd::Send { file, channel, part_size }) => {
            send(&file, &channel, part_size, cli.token, cli.auth.into())
        }
        Some(Cmd::Restore { manifest, out_dir }) => {
            restore(&manifest, &out_dir, cli.token, cli.auth.into())
        }
        // Bare `partup --token X` persists the token for later runs.
        None => match cli.token {
            Some(token) => {
                config::save_token(&token)?;
                println!("Token saved successfully!");
                Ok(())
            }
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

/// Precedence: flag > environment > saved config.
fn resolve_token(flag: Option<String>) -> Result<String> {
    if let Some(t) = flag {
        return Ok(t);
    }
    if let Ok(t) = std::env::var(TOKEN_ENV) {
        if !t.is_empty() {
            return Ok(t);
        }
    }
    if let Some(t) = config::load_token().unwrap_or(None) {
        return Ok(t);
    }
    bail!(
        "token is required. Use --token, set {TOKEN_ENV}, or save one with 'partup --token <token>'"
    );
}

fn send(
    file: &Path,
    channel: &str,
    part_size: usize,
    token: Option<String>,
    auth: AuthMode,
) -> Result<()> {
    let token = resolve_token(token)?;
    let client = Client::new(&token, auth);

    let size = std::fs::metadata(file)
        .with_context(|| format!("stat {}", file.display()))?
        .len();
    let name = file
        .file_name()
        .with_context(|| format!("no file name in {}", file.display()))?
        .to_string_lossy()
        .to_string();

    if size > part_size as u64 {
        eprintln!("File exceeds the part size, splitting and uploading...");
        let manifest = split_and_upload(file, &client, part_size)?;

        let manifest_path = PathBuf::from(format!("{}.json", file.display()));
        manifest.save_pretty(&manifest_path)?;

        eprintln!("Uploading manifest...");
        let data = std::fs::read(&manifest_path)?;
        let manifest_name = manifest_path
            .file_name()
            .context("manifest path has no file name")?
            .to_string_lossy()
            .to_string();
        let manifest_id = client
            .upload(&data, &manifest_name)
            .context("upload manifest")?;

        client
            .send_message(channel, &format!("Uploaded split file: {name}"), Some(&manifest_id))
            .context("send message")?;

        println!("Upload complete!");
        println!("Manifest attachment id: {manifest_id}");
    } else {
        eprintln!("Uploading file...");
        let data = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
        let id = client.upload(&data, &name)?;
        client.send_message(channel, "", Some(&id))?;
        println!("Upload complete!");
    }

    Ok(())
}

fn restore(manifest: &Path, out_dir: &Path, token: Option<String>, auth: AuthMode) -> Result<()> {
    // Downloads are plain GETs, so a token is optional here.
    let token = token
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .or_else(|| config::load_token().unwrap_or(None))
        .unwrap_or_default();
    let client = Client::new(&token, auth);

    eprintln!("Restoring from {}...", manifest.display());
    let out = download_and_join(manifest, &client, out_dir)?;
    println!("Successfully restored {}", out.display());
    Ok(())
}
