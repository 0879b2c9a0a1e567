//! Method-channel command surface
//!
//! The host app reaches native code over two narrow channels:
//! `app_group_prefs` (preference reads/writes in the shared namespace) and
//! `native_downloader` (enqueue a background file download). Calls arrive as
//! a method name plus a JSON argument map; this module parses them into a
//! typed command enum and dispatches against the platform collaborators.
//!
//! The download side stops at the typed request and its validation — the
//! platform's own download manager performs the transfer and owns
//! notifications.

use crate::error::Result;
use crate::storage::{PreferenceStore, APP_GROUP};
use serde_json::Value;

/// Channel names as registered by the host app
pub const PREFS_CHANNEL: &str = "app_group_prefs";
pub const DOWNLOAD_CHANNEL: &str = "native_downloader";

/// A validated download request for the platform download manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    pub title: String,
    pub description: String,
}

/// Platform download-manager hook
pub trait Downloader: Send + Sync {
    /// Enqueue a download, returning the platform's download id
    fn enqueue(&mut self, request: DownloadRequest) -> Result<i64>;
}

/// Parsed method-channel call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCommand {
    SetString { group: String, key: String, value: String },
    GetString { group: String, key: String },
    Remove { group: String, key: String },
    DownloadFile {
        url: String,
        file_name: String,
        title: String,
        description: String,
    },
}

/// Reply sent back over the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelReply {
    Bool(bool),
    MaybeString(Option<String>),
    DownloadId(i64),
    Error { code: String, message: String },
    NotImplemented,
}

fn arg_str(args: &Value, name: &str) -> Option<String> {
    args.get(name).and_then(|v| v.as_str()).map(|s| s.to_string())
}

impl ChannelCommand {
    /// Parse a raw method call. Unknown channel/method combinations yield
    /// `None`; the dispatcher answers those with [`ChannelReply::NotImplemented`].
    pub fn parse(channel: &str, method: &str, args: &Value) -> Option<Self> {
        let group = arg_str(args, "group").unwrap_or_else(|| APP_GROUP.to_string());

        match (channel, method) {
            (PREFS_CHANNEL, "setString") => Some(ChannelCommand::SetString {
                group,
                key: arg_str(args, "key")?,
                value: arg_str(args, "value")?,
            }),
            (PREFS_CHANNEL, "getString") => Some(ChannelCommand::GetString {
                group,
                key: arg_str(args, "key")?,
            }),
            (PREFS_CHANNEL, "remove") => Some(ChannelCommand::Remove {
                group,
                key: arg_str(args, "key")?,
            }),
            (DOWNLOAD_CHANNEL, "downloadFile") => {
                let file_name = arg_str(args, "fileName").unwrap_or_else(|| "download".to_string());
                let title = arg_str(args, "title").unwrap_or_else(|| file_name.clone());
                Some(ChannelCommand::DownloadFile {
                    url: arg_str(args, "url").unwrap_or_default(),
                    description: arg_str(args, "description")
                        .unwrap_or_else(|| "İndiriliyor".to_string()),
                    file_name,
                    title,
                })
            }
            _ => None,
        }
    }
}

/// Dispatch one raw method call against the platform collaborators.
///
/// Mirrors the host contract: preference writes answer `Bool(ok)`, reads
/// answer `MaybeString`, a blank download URL is rejected with an
/// `ARG_ERROR` before the downloader is touched, and downloader failures
/// come back as `DL_ERROR`.
pub fn dispatch(
    channel: &str,
    method: &str,
    args: &Value,
    prefs: &mut dyn PreferenceStore,
    downloader: &mut dyn Downloader,
) -> ChannelReply {
    let Some(command) = ChannelCommand::parse(channel, method, args) else {
        // Malformed prefs args answer like the host does: false / null
        return match (channel, method) {
            (PREFS_CHANNEL, "setString") | (PREFS_CHANNEL, "remove") => ChannelReply::Bool(false),
            (PREFS_CHANNEL, "getString") => ChannelReply::MaybeString(None),
            _ => ChannelReply::NotImplemented,
        };
    };

    match command {
        ChannelCommand::SetString { key, value, .. } => {
            ChannelReply::Bool(prefs.set_string(&key, &value))
        }
        ChannelCommand::GetString { key, .. } => ChannelReply::MaybeString(prefs.get_string(&key)),
        ChannelCommand::Remove { key, .. } => ChannelReply::Bool(prefs.remove(&key)),
        ChannelCommand::DownloadFile { url, file_name, title, description } => {
            if url.trim().is_empty() {
                return ChannelReply::Error {
                    code: "ARG_ERROR".to_string(),
                    message: "url gerekli".to_string(),
                };
            }
            match downloader.enqueue(DownloadRequest { url, file_name, title, description }) {
                Ok(id) => ChannelReply::DownloadId(id),
                Err(e) => ChannelReply::Error {
                    code: "DL_ERROR".to_string(),
                    message: e.to_string(),
                },
            }
        }
    }
}
