//! App-group preference storage and host-app handoff
//!
//! The host app and the share extension exchange state through a single
//! shared key-value namespace (`UserDefaults` app group on iOS,
//! `SharedPreferences` on Android). This module treats that store as an
//! external collaborator behind the [`PreferenceStore`] trait: string keys,
//! string values, read once at startup, no write-then-immediate-read
//! guarantees assumed.
//!
//! The workflow consumes the session state the host app wrote (token, company
//! ids, company lists) and produces exactly one value: the completed share
//! payload under [`keys::SHARE_MEDIA_JSON`], picked up by the host after the
//! custom-scheme handoff.

use crate::api::catalog::Company;
use crate::error::Result;
use crate::items::ShareItem;
use std::collections::HashMap;

/// Fixed app-group namespace shared with the host app
pub const APP_GROUP: &str = "group.com.office701.articapital";

/// Note placeholder shown by the share sheet; a note equal to this submits
/// as an empty description
pub const NOTE_PLACEHOLDER: &str = "Not ekle...";

/// Keys within the app-group namespace
pub mod keys {
    pub const USER_TOKEN: &str = "UserToken";
    pub const LOGGED_IN_USER_NAME: &str = "LoggedInUserName";
    pub const USER_RANK: &str = "UserRank";
    pub const COMP_ID: &str = "CompID";
    pub const COMP_ADR_ID: &str = "CompAdrID";
    /// Pipe-delimited company-name list (display fallback)
    pub const COMPANIES: &str = "Companies";
    /// JSON-encoded array of `{compName, compID}` pairs
    pub const COMPANIES_JSON: &str = "CompaniesJSON";
    /// Completed share payload for the host app
    pub const SHARE_MEDIA_JSON: &str = "ShareMediaJSON";
}

/// User rank value that marks an administrator account
const ADMIN_RANK: &str = "50";

/// External key-value store shared with the host app
pub trait PreferenceStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    /// Returns false when the platform store refused the write
    fn set_string(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str) -> bool;
}

/// In-memory store for tests and desktop use
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }
}

/// Session state read once when the share sheet opens
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_token: String,
    pub account_name: String,
    pub user_rank: String,
    pub company_id: Option<i64>,
    pub company_address_id: Option<i64>,
    pub companies: Vec<Company>,
    pub company_names: Vec<String>,
}

impl SessionContext {
    /// Load the session snapshot from the app-group store.
    ///
    /// The JSON company list is authoritative for the catalog; the
    /// pipe-delimited name list is kept as a display fallback. A malformed
    /// company JSON degrades to the fallback instead of failing the load.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let get = |key: &str| store.get_string(key).unwrap_or_default();

        let company_names: Vec<String> = get(keys::COMPANIES)
            .split('|')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .collect();

        let companies: Vec<Company> = store
            .get_string(keys::COMPANIES_JSON)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable company list, using name fallback");
                    None
                }
            })
            .unwrap_or_default();

        let user_rank = get(keys::USER_RANK);
        let logged_in_name = get(keys::LOGGED_IN_USER_NAME);

        // Admins share on their own behalf; everyone else defaults to their
        // first company
        let account_name = if user_rank == ADMIN_RANK {
            if logged_in_name.is_empty() {
                company_names.first().cloned().unwrap_or_default()
            } else {
                logged_in_name
            }
        } else {
            company_names
                .first()
                .cloned()
                .unwrap_or(logged_in_name)
        };

        Self {
            user_token: get(keys::USER_TOKEN),
            account_name,
            user_rank,
            company_id: get(keys::COMP_ID).trim().parse().ok(),
            company_address_id: get(keys::COMP_ADR_ID).trim().parse().ok(),
            companies,
            company_names,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_rank == ADMIN_RANK
    }

    pub fn has_token(&self) -> bool {
        !self.user_token.trim().is_empty()
    }
}

/// How the user chose to share the collected items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// Upload into a project as a document
    Project,
    /// Hand off as a plain message
    Message,
}

impl ShareMode {
    fn as_str(self) -> &'static str {
        match self {
            ShareMode::Project => "project",
            ShareMode::Message => "message",
        }
    }
}

/// Completed share payload written back for the host app
#[derive(Debug, Clone)]
pub struct SharePayload {
    pub mode: ShareMode,
    pub account: String,
    pub folder: String,
    pub share_with: String,
    pub text: Option<String>,
    pub items: Vec<ShareItem>,
}

impl SharePayload {
    pub fn to_json(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "type": "share",
            "mode": self.mode.as_str(),
            "account": self.account,
            "folder": self.folder,
            "shareWith": self.share_with,
            "items": self.items.iter().map(|i| i.payload_entry()).collect::<Vec<_>>(),
        });
        // The note only travels when the user actually typed one
        if let Some(text) = self.text.as_deref() {
            if !text.trim().is_empty() && text != NOTE_PLACEHOLDER {
                payload["text"] = serde_json::Value::String(text.to_string());
            }
        }
        payload
    }

    /// Persist under the shared namespace for the host app to pick up
    pub fn write_to(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        let json = serde_json::to_string(&self.to_json())?;
        if !store.set_string(keys::SHARE_MEDIA_JSON, &json) {
            return Err(crate::error::ShareError::InvalidState(
                "preference store rejected share payload write".to_string(),
            ));
        }
        Ok(())
    }
}

/// Custom URL scheme that returns control to the host application.
///
/// The host bundle id is the extension bundle id minus its
/// `.ShareExtension` suffix (or its last component, when the suffix is absent).
pub fn handoff_url(extension_bundle_id: &str) -> String {
    let host = extension_bundle_id
        .strip_suffix(".ShareExtension")
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            let parts: Vec<&str> = extension_bundle_id.split('.').collect();
            if parts.len() > 1 {
                parts[..parts.len() - 1].join(".")
            } else {
                extension_bundle_id.to_string()
            }
        });
    format!("ShareMedia-{host}://")
}
