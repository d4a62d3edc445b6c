use anyhow::Result;
use reqwest::blocking::multipart;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CDN_URL: &str = "https://cdn.stoatusercontent.com";
pub const DEFAULT_API_URL: &str = "https://api.revolt.chat";

/// Which auth header the token is sent under. The API accepts session
/// tokens and bot tokens via different header names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Session,
    Bot,
}

impl AuthMode {
    pub fn header_name(self) -> &'static str {
        match self {
            AuthMode::Session => "x-session-token",
            AuthMode::Bot => "x-bot-token",
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upload failed: {status} - {body}")]
    Upload { status: u16, body: String },
    #[error("send message failed: {status} - {body}")]
    Send { status: u16, body: String },
    #[error("download failed: {status}")]
    Download { status: u16 },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Seam between the splitter and the network; lets tests substitute an
/// in-memory store.
pub trait Uploader {
    fn upload_part(&self, data: &[u8], filename: &str) -> Result<String>;
}

/// Seam between the joiner and the network.
pub trait Downloader {
    fn download_to_path(&self, url: &str, dest: &Path) -> Result<()>;
}

#[derive(Deserialize)]
struct Attachment {
    id: String,
}

pub struct Client {
    pub token: String,
    pub auth: AuthMode,
    pub cdn_url: String,
    pub api_url: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(token: &str, auth: AuthMode) -> Client {
        Client {
            token: token.to_string(),
            auth,
            cdn_url: DEFAULT_CDN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Upload bytes as a multipart `file` field; returns the attachment id.
    pub fn upload(&self, data: &[u8], filename: &str) -> Result<String, TransportError> {
        let part = multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(format!("{}/attachments", self.cdn_url))
            .header(self.auth.header_name(), &self.token)
            .multipart(form)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TransportError::Upload { status: status.as_u16(), body });
        }
        let att: Attachment = resp.json()?;
        Ok(att.id)
    }

    /// Post a message to a channel, optionally referencing one attachment.
    pub fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        attachment_id: Option<&str>,
    ) -> Result<(), TransportError> {
        let payload = message_payload(content, attachment_id);
        let resp = self
            .http
            .post(format!("{}/channels/{}/messages", self.api_url, channel_id))
            .header(self.auth.header_name(), &self.token)
            .json(&payload)
            .send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().unwrap_or_default();
            return Err(TransportError::Send { status: status.as_u16(), body });
        }
        Ok(())
    }

    /// Plain GET streamed to `dest`, overwriting any existing file.
    pub fn download(&self, url: &str, dest: &Path) -> Result<(), TransportError> {
        let mut resp = self.http.get(url).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(TransportError::Download { status: status.as_u16() });
        }
        let mut out = File::create(dest)?;
        resp.copy_to(&mut out)?;
        Ok(())
    }
}

impl Uploader for Client {
    fn upload_part(&self, data: &[u8], filename: &str) -> Result<String> {
        Ok(self.upload(data, filename)?)
    }
}

impl Downloader for Client {
    fn download_to_path(&self, url: &str, dest: &Path) -> Result<()> {
        Ok(self.download(url, dest)?)
    }
}

/// Fetch URL for an attachment id under a CDN base.
pub fn attachment_url(base: &str, id: &str) -> String {
    format!("{base}/attachments/{id}")
}

// The API rejects an empty attachments list, so the field is dropped
// entirely when there is no attachment.
fn message_payload(content: &str, attachment_id: Option<&str>) -> serde_json::Value {
    let mut payload = serde_json::json!({ "content": content });
    if let Some(id) = attachment_id.filter(|id| !id.is_empty()) {
        payload["attachments"] = serde_json::json!([id]);
    }
    payload
}
