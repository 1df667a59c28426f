//! Media blob storage
//!
//! Accepts audio blobs referenced by game 2 submissions, writes them
//! under the media directory, and returns a durable relative URL. A
//! storage failure is logged by the caller and the referencing field
//! left empty; it never blocks the game flow.

use lexipath_common::{Error, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// On-disk media store serving `/media/...` URLs
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open the store, creating its directory tree if missing
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(root.join("audio"))
            .map_err(|e| Error::Config(format!("Failed to create media directory: {}", e)))?;
        Ok(Self { root })
    }

    /// Directory served under `/media`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an audio blob, returning its durable relative URL
    pub async fn save_audio(&self, bytes: &[u8], extension: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::InvalidInput("Empty audio upload".to_string()));
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join("audio").join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored audio blob");

        Ok(format!("/media/audio/{}", file_name))
    }
}

/// Map an upload content type to a stored file extension
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    // Parameters like ";codecs=opus" don't affect the extension
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "audio/webm" => "webm",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        _ => "bin",
    }
}
