//! Document upload submission
//!
//! Validates a completed selection plus the collected share items, builds
//! exactly one REST request and reports a single success/failure outcome.
//!
//! Add vs update: a required document with `isAdded=true` whose existing
//! record was resolved goes to `PUT user/account/company/documentUpdate`
//! carrying `documentID`; every other case goes to
//! `POST user/account/projects/documentAdd` carrying `appID` and
//! `isAdditional=0`. One document per submission; extra file items are
//! ignored, text items never qualify.

use crate::api::catalog::{Company, Project, RequiredDocument};
use crate::api::client::CapitalClient;
use crate::error::{Result, ShareError};
use crate::file;
use crate::items::ShareItem;
use crate::storage::{SessionContext, NOTE_PLACEHOLDER};
use serde::{Deserialize, Serialize};

/// Which endpoint and body shape the submission uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Create a new document record for the project
    Add { app_id: i64 },
    /// Replace the company's existing record
    Update { document_id: i64 },
}

impl UploadMode {
    /// Update only when the document is on file and its record was resolved;
    /// an unresolved `isAdded` falls back to add.
    pub fn for_document(document: &RequiredDocument, project: &Project) -> Self {
        match document.existing_document_id {
            Some(document_id) if document.is_added => UploadMode::Update { document_id },
            _ => UploadMode::Add { app_id: project.id },
        }
    }
}

/// A validated submission, ready for file encoding and dispatch
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub user_token: String,
    pub company_id: i64,
    pub document_type_id: i64,
    pub description: String,
    pub mode: UploadMode,
    pub file_uri: String,
}

impl DocumentUpload {
    /// Check every precondition and build the submission. Runs before any
    /// I/O; each unmet precondition maps to its own error so the UI can point
    /// at the missing field.
    pub fn prepare(
        session: &SessionContext,
        company: Option<&Company>,
        project: Option<&Project>,
        document: Option<&RequiredDocument>,
        note: &str,
        items: &[ShareItem],
    ) -> Result<Self> {
        if !session.has_token() {
            return Err(ShareError::MissingSessionToken);
        }
        let company = company.ok_or(ShareError::NoCompanySelected)?;
        let project = match project {
            Some(p) if !p.is_sentinel() => p,
            _ => return Err(ShareError::NoProjectSelected),
        };
        let document = document.ok_or(ShareError::NoDocumentTypeSelected)?;

        // First file item only; text items cannot become documents
        let file_uri = items
            .iter()
            .find_map(|item| match item {
                ShareItem::File { uri, .. } => Some(uri.clone()),
                ShareItem::Text { .. } => None,
            })
            .ok_or(ShareError::NoFileAttached)?;

        Ok(Self {
            user_token: session.user_token.clone(),
            company_id: company.company_id,
            document_type_id: document.document_type_id,
            description: clean_note(note),
            mode: UploadMode::for_document(document, project),
            file_uri,
        })
    }

    /// Read and encode the file, then dispatch the request.
    ///
    /// `success=false` surfaces as [`ShareError::Api`] with the server's
    /// combined message; transport and parse failures keep their own
    /// categories. None of them consume the submission, so the caller can
    /// retry without re-collecting items.
    pub async fn submit(&self, client: &CapitalClient) -> Result<UploadOutcome> {
        let file_payload = file::load_as_data_url(&self.file_uri).await?;

        let outcome: UploadOutcome = match self.mode {
            UploadMode::Add { app_id } => {
                let body = DocumentAddBody {
                    user_token: &self.user_token,
                    comp_id: self.company_id,
                    app_id,
                    is_additional: 0,
                    document_type: self.document_type_id,
                    document_desc: &self.description,
                    file: &file_payload,
                };
                client.post("user/account/projects/documentAdd", &body).await?
            }
            UploadMode::Update { document_id } => {
                let body = DocumentUpdateBody {
                    user_token: &self.user_token,
                    comp_id: self.company_id,
                    document_id,
                    document_type: self.document_type_id,
                    document_desc: &self.description,
                    file: &file_payload,
                };
                client.put("user/account/company/documentUpdate", &body).await?
            }
        };

        if !outcome.success {
            return Err(ShareError::Api {
                message: outcome.combined_error(),
            });
        }
        Ok(outcome)
    }
}

/// Placeholder and whitespace-only notes submit as an empty description
fn clean_note(note: &str) -> String {
    let trimmed = note.trim();
    if trimmed.is_empty() || trimmed == NOTE_PLACEHOLDER {
        String::new()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Serialize)]
struct DocumentAddBody<'a> {
    #[serde(rename = "userToken")]
    user_token: &'a str,
    #[serde(rename = "compID")]
    comp_id: i64,
    #[serde(rename = "appID")]
    app_id: i64,
    #[serde(rename = "isAdditional")]
    is_additional: i32,
    #[serde(rename = "documentType")]
    document_type: i64,
    #[serde(rename = "documentDesc")]
    document_desc: &'a str,
    file: &'a str,
}

#[derive(Debug, Serialize)]
struct DocumentUpdateBody<'a> {
    #[serde(rename = "userToken")]
    user_token: &'a str,
    #[serde(rename = "compID")]
    comp_id: i64,
    #[serde(rename = "documentID")]
    document_id: i64,
    #[serde(rename = "documentType")]
    document_type: i64,
    #[serde(rename = "documentDesc")]
    document_desc: &'a str,
    file: &'a str,
}

/// Backend verdict on a submission
#[derive(Debug, Clone, Deserialize)]
pub struct UploadOutcome {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,

    #[serde(rename = "statusCode", default)]
    pub status_code: Option<i64>,
}

impl UploadOutcome {
    /// Combined error string from the parts the server supplied
    pub fn combined_error(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            parts.push(message.trim().to_string());
        }
        if let Some(detail) = self
            .error_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
        {
            parts.push(detail.trim().to_string());
        }
        if let Some(code) = self.status_code {
            parts.push(format!("({code})"));
        }
        if parts.is_empty() {
            "Belge yüklenemedi".to_string()
        } else {
            parts.join(" ")
        }
    }
}
