//! Share-item collection
//!
//! Normalizes whatever the OS hands the share target into a typed item list.
//! Each attachment declares one or more type identifiers; the first match in
//! the fixed precedence image → movie → file URL → plain text wins, and an
//! attachment never yields more than one item.
//!
//! Loading is asynchronous per attachment. The collector joins every load
//! before returning, so partial results are never surfaced; an attachment
//! whose loader comes back empty contributes nothing and is not an error.

use futures_util::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};

/// Media classification carried into the host-app payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    File,
}

/// One normalized share item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareItem {
    File { uri: String, media_type: MediaType },
    Text { text: String },
}

impl ShareItem {
    pub fn is_file(&self) -> bool {
        matches!(self, ShareItem::File { .. })
    }

    /// JSON shape the host app reads back from the preference store:
    /// `{"path": ..., "type": "image"|"video"|"file"}` or
    /// `{"text": ..., "type": "text"}`
    pub fn payload_entry(&self) -> serde_json::Value {
        match self {
            ShareItem::File { uri, media_type } => serde_json::json!({
                "path": uri,
                "type": media_type,
            }),
            ShareItem::Text { text } => serde_json::json!({
                "text": text,
                "type": "text",
            }),
        }
    }
}

/// Type identifiers an OS attachment can declare, in match precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    Image,
    Movie,
    FileUrl,
    PlainText,
}

impl DeclaredKind {
    pub const PRECEDENCE: [DeclaredKind; 4] = [
        DeclaredKind::Image,
        DeclaredKind::Movie,
        DeclaredKind::FileUrl,
        DeclaredKind::PlainText,
    ];
}

/// What an attachment loader produced
#[derive(Debug, Clone)]
pub enum LoadedPayload {
    Url(String),
    Text(String),
}

/// An OS-provided attachment (item provider). Implementations wrap the
/// platform loader; tests use fakes with artificial delays.
pub trait Attachment: Send + Sync {
    /// Whether the attachment declares data of the given kind
    fn conforms_to(&self, kind: DeclaredKind) -> bool;

    /// Load the attachment's data for the given kind. `None` means the loader
    /// reported no data; the attachment is then dropped from the batch.
    fn load(&self, kind: DeclaredKind) -> BoxFuture<'_, Option<LoadedPayload>>;
}

fn item_from_payload(kind: DeclaredKind, payload: LoadedPayload) -> Option<ShareItem> {
    match (kind, payload) {
        (DeclaredKind::Image, LoadedPayload::Url(uri)) => Some(ShareItem::File {
            uri,
            media_type: MediaType::Image,
        }),
        (DeclaredKind::Movie, LoadedPayload::Url(uri)) => Some(ShareItem::File {
            uri,
            media_type: MediaType::Video,
        }),
        (DeclaredKind::FileUrl, LoadedPayload::Url(uri)) => Some(ShareItem::File {
            uri,
            media_type: MediaType::File,
        }),
        (DeclaredKind::PlainText, LoadedPayload::Text(text)) => Some(ShareItem::Text { text }),
        // Loader answered with a shape that does not fit the declared kind
        _ => None,
    }
}

async fn collect_one(attachment: &dyn Attachment) -> Option<ShareItem> {
    let kind = DeclaredKind::PRECEDENCE
        .into_iter()
        .find(|k| attachment.conforms_to(*k))?;

    let payload = attachment.load(kind).await?;
    item_from_payload(kind, payload)
}

/// Collect all attachments into share items.
///
/// Returns only after every attachment has been attempted; unresolved
/// attachments are omitted, never treated as a batch failure.
pub async fn collect_items(attachments: &[Box<dyn Attachment>]) -> Vec<ShareItem> {
    let loads = attachments.iter().map(|a| collect_one(a.as_ref()));
    let resolved = join_all(loads).await;

    let items: Vec<ShareItem> = resolved.into_iter().flatten().collect();
    tracing::debug!(
        attachments = attachments.len(),
        items = items.len(),
        "collected share items"
    );
    items
}
