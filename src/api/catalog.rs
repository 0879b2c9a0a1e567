//! Company / project / required-document catalog
//!
//! Read-only calls backing the share sheet's selection flow:
//! - `GET user/account/projects/all?userToken=<t>&compID=<id>` — the user's
//!   projects, filtered server-side by company
//! - `GET user/account/projects/<id>?userToken=<t>` — project detail with the
//!   required-document list and the documents the company already has on file
//!
//! Companies themselves never hit the network; they come from the app-group
//! preference cache written by the host app (see [`crate::storage`]).
//!
//! A required document with `isAdded=true` is resolved to its existing record
//! by matching `documentName` against the detail's raw `documents` sub-list,
//! case-insensitive and trimmed. The backend offers no foreign key here; the
//! name join is its contract. If no entry matches despite `isAdded=true`, the
//! document stays unresolved and upload falls back to add semantics instead of
//! failing the fetch.

use crate::api::client::CapitalClient;
use crate::error::{Result, ShareError};
use serde::{Deserialize, Deserializer, Serialize};

/// Tenant the user uploads documents on behalf of. Cached locally, immutable
/// for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "compName")]
    pub name: String,

    #[serde(rename = "compID")]
    pub company_id: i64,
}

/// A unit of work belonging to a company ("application" on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "appID")]
    pub id: i64,

    #[serde(rename = "appTitle")]
    pub name: String,

    #[serde(rename = "appCode", default)]
    pub code: String,

    #[serde(rename = "compID", default)]
    pub company_id: i64,

    #[serde(rename = "compName", default)]
    pub company_name: String,
}

impl Project {
    /// Placeholder entry shown when a company has no projects. It cannot be
    /// progressed past: selecting it never counts as a project selection.
    pub fn sentinel() -> Self {
        Self {
            id: 0,
            name: "Proje bulunamadı".to_string(),
            code: String::new(),
            company_id: 0,
            company_name: String::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == 0
    }
}

/// A document type the backend expects for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredDocument {
    #[serde(rename = "documentID")]
    pub document_type_id: i64,

    #[serde(rename = "documentName")]
    pub document_name: String,

    #[serde(rename = "isRequired", default, deserialize_with = "loose_bool")]
    pub is_required: bool,

    /// True when the company already has a document of this type on file
    #[serde(rename = "isAdded", default, deserialize_with = "loose_bool")]
    pub is_added: bool,

    /// Record id of the existing document, resolved by name against the
    /// project detail's `documents` list. Present iff a match was found;
    /// required for update semantics.
    #[serde(skip)]
    pub existing_document_id: Option<i64>,
}

impl RequiredDocument {
    /// Update is only available once the existing record was resolved
    pub fn supports_update(&self) -> bool {
        self.is_added && self.existing_document_id.is_some()
    }
}

/// Entry of the project detail's raw `documents` sub-list: a document record
/// the company holds. `documentType` carries the type's display name.
#[derive(Debug, Clone, Deserialize)]
pub struct HeldDocument {
    #[serde(rename = "documentID")]
    pub document_id: i64,

    #[serde(rename = "documentType", default)]
    pub document_type: String,
}

/// Project detail relevant to the share flow
#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub company_id: i64,
    pub company_address_id: i64,
    pub required_documents: Vec<RequiredDocument>,
}

// --- Wire envelopes ---

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default, deserialize_with = "loose_bool")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ProjectsData {
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct ProjectDetailData {
    project: ProjectDetailWire,
}

#[derive(Debug, Deserialize)]
struct ProjectDetailWire {
    #[serde(rename = "compID", default)]
    comp_id: i64,

    #[serde(rename = "compAdrID", default)]
    comp_adr_id: i64,

    #[serde(rename = "requiredDocuments", default)]
    required_documents: Vec<RequiredDocument>,

    #[serde(default)]
    documents: Vec<HeldDocument>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(ShareError::Api {
                message: self
                    .message
                    .unwrap_or_else(|| "İşlem başarısız".to_string()),
            });
        }
        self.data.ok_or_else(|| ShareError::InvalidResponse {
            message: "response envelope has no data object".to_string(),
            response_body: None,
        })
    }
}

/// Accepts `true`/`false`, `1`/`0` and `"1"`/`"0"` — the backend is loose
/// about boolean fields.
fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => b,
        Loose::Int(i) => i != 0,
        Loose::Str(s) => matches!(s.trim(), "1" | "true" | "True"),
    })
}

/// Resolve `existing_document_id` for every added required document by
/// case-insensitive trimmed name equality against the held-document list.
/// The resolved id is the held record's own id, not the type id.
fn resolve_existing_documents(required: &mut [RequiredDocument], held: &[HeldDocument]) {
    for doc in required.iter_mut() {
        if !doc.is_added {
            continue;
        }
        let wanted = doc.document_name.trim().to_lowercase();
        doc.existing_document_id = held
            .iter()
            .find(|h| h.document_type.trim().to_lowercase() == wanted)
            .map(|h| h.document_id);

        if doc.existing_document_id.is_none() {
            tracing::warn!(
                document = %doc.document_name,
                "isAdded set but no matching record, falling back to add semantics"
            );
        }
    }
}

impl CapitalClient {
    /// List the user's projects for one company (server-side `compID` filter).
    ///
    /// An empty result is returned as-is; the workflow layer installs the
    /// sentinel entry. Transport and non-2xx failures surface as errors, never
    /// as a silent empty list.
    pub async fn list_projects(&self, user_token: &str, company_id: i64) -> Result<Vec<Project>> {
        let envelope: Envelope<ProjectsData> = self
            .get(
                "user/account/projects/all",
                &[
                    ("userToken", user_token.to_string()),
                    ("compID", company_id.to_string()),
                ],
            )
            .await?;

        Ok(envelope.into_data()?.projects)
    }

    /// Fetch a project's detail and resolve existing-document record ids
    pub async fn fetch_project_detail(
        &self,
        user_token: &str,
        project_id: i64,
    ) -> Result<ProjectDetail> {
        let envelope: Envelope<ProjectDetailData> = self
            .get(
                &format!("user/account/projects/{project_id}"),
                &[("userToken", user_token.to_string())],
            )
            .await?;

        let wire = envelope.into_data()?.project;
        let mut required = wire.required_documents;
        resolve_existing_documents(&mut required, &wire.documents);

        Ok(ProjectDetail {
            company_id: wire.comp_id,
            company_address_id: wire.comp_adr_id,
            required_documents: required,
        })
    }
}
