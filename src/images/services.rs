use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, UploadError};
use crate::storage::FileStorage;

/// A file part taken off the request, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content: Bytes,
    /// Client-supplied name. Only its extension is ever looked at.
    pub declared_name: Option<String>,
    /// Client-supplied content type. Informational only.
    pub declared_type: Option<String>,
}

impl UploadedFile {
    /// MIME type detected from the leading bytes of the content.
    pub fn sniff_mime(&self) -> Option<&'static str> {
        infer::get(&self.content).map(|kind| kind.mime_type())
    }

    fn declared_extension(&self) -> Option<String> {
        let name = self.declared_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn extension_matches(mime: &str, ext: &str) -> bool {
    match mime {
        "image/jpeg" => matches!(ext, "jpg" | "jpeg" | "jpe"),
        other => ext_from_mime(other) == Some(ext),
    }
}

/// Pick the stored name: a fresh token plus the client's extension when it
/// agrees with the sniffed type, else the canonical extension.
fn stored_file_name(file: &UploadedFile, mime: &str, canonical_ext: &str) -> String {
    let ext = file
        .declared_extension()
        .filter(|ext| extension_matches(mime, ext))
        .unwrap_or_else(|| canonical_ext.to_string());
    format!("{}.{}", Uuid::new_v4().simple(), ext)
}

/// Validate the upload as an image and persist it. Returns the stored
/// reference for the user record.
pub async fn store_profile_image(
    storage: &dyn FileStorage,
    file: &UploadedFile,
) -> Result<String, AppError> {
    storage
        .ensure_directory()
        .await
        .context("prepare profile image directory")?;

    let mime = file.sniff_mime();
    let Some((mime, ext)) = mime.and_then(|m| ext_from_mime(m).map(|ext| (m, ext))) else {
        debug!(
            sniffed = mime.unwrap_or("unknown"),
            declared = file.declared_type.as_deref().unwrap_or("none"),
            "rejecting upload"
        );
        return Err(UploadError::InvalidType(mime.unwrap_or("unknown").to_string()).into());
    };

    let name = stored_file_name(file, mime, ext);
    let key = storage
        .store_upload(&name, file.content.clone())
        .await
        .with_context(|| format!("store profile image {name}"))?;

    info!(key = %key, mime, bytes = file.content.len(), "profile image stored");
    Ok(key)
}
