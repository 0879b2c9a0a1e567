//! File payload handling
//!
//! Turns a shared file URI into the `data:<mime>;base64,<...>` string the
//! document endpoints expect. MIME inference is a closed extension set; the
//! backend only distinguishes these five families and treats everything else
//! as an opaque blob.

use crate::error::{Result, ShareError};
use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};

/// Infer a MIME type from a file name's extension.
///
/// Closed set: pdf, jpg/jpeg, png, doc/docx, xls/xlsx. Anything else is
/// `application/octet-stream`.
pub fn infer_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "doc" | "docx" => "application/msword",
        "xls" | "xlsx" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// Encode raw bytes as a MIME-prefixed base64 data URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Resolve a shared URI to a local filesystem path.
///
/// The share sheet hands over `file://` URLs on iOS and plain paths from some
/// Android providers; both are accepted. Other schemes are rejected.
pub fn uri_to_path(uri: &str) -> Result<PathBuf> {
    if let Ok(url) = url::Url::parse(uri) {
        if url.scheme() == "file" {
            return url
                .to_file_path()
                .map_err(|_| ShareError::InvalidInput(format!("Unusable file URL: {uri}")));
        }
        if url.scheme().len() > 1 {
            // A real non-file scheme (content://, http://, ...). Single-letter
            // schemes are Windows drive letters mis-parsed as URLs.
            return Err(ShareError::InvalidInput(format!(
                "Unsupported URI scheme '{}': {uri}",
                url.scheme()
            )));
        }
    }
    Ok(PathBuf::from(uri))
}

/// Read a shared file and encode it for upload
pub async fn load_as_data_url(uri: &str) -> Result<String> {
    let path = uri_to_path(uri)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let bytes = tokio::fs::read(&path).await?;
    let mime = infer_mime_type(&file_name);

    tracing::debug!(file = %file_name, mime, size = bytes.len(), "encoded file payload");
    Ok(encode_data_url(mime, &bytes))
}
