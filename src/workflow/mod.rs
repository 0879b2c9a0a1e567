//! Share upload workflow state machine
//!
//! One [`ShareWorkflow`] instance lives for the duration of a single
//! share-sheet session and owns all of its mutable state: the session
//! snapshot, the cached company list, the current project and
//! required-document option lists, and the user's selection.
//!
//! Selections follow a strict dependency order, company → project → document
//! type. Changing an upstream field clears everything below it.
//!
//! Catalog fetches can outlive the selection they were issued for, so every
//! setter that triggers a fetch mints a [`FetchTicket`]. The completion
//! handler passes the ticket back together with the fetch outcome; a ticket
//! that no longer matches the current epoch means the user moved on, and the
//! result is discarded on arrival (there is no in-flight cancellation).
//!
//! Submission is guarded by a lock flag instead of an idempotency key: the
//! backend deduplicates nothing, so the caller must not re-submit until a
//! terminal outcome arrives.

use crate::api::catalog::{Company, Project, ProjectDetail, RequiredDocument};
use crate::api::client::CapitalClient;
use crate::api::upload::{DocumentUpload, UploadOutcome};
use crate::error::{Result, ShareError};
use crate::items::ShareItem;
use crate::storage::SessionContext;

/// Identifies the selection a catalog fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// What happened to a fetch result when it arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    Applied,
    /// The selection changed while the fetch was in flight
    Discarded,
}

/// The user's current choices. Mutated only through [`ShareWorkflow`] setters.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub company: Option<Company>,
    pub project: Option<Project>,
    pub document_type: Option<RequiredDocument>,
    pub note: String,
}

/// Workflow for one share-sheet session
#[derive(Debug)]
pub struct ShareWorkflow {
    session: SessionContext,
    selection: SelectionState,
    projects: Vec<Project>,
    documents: Vec<RequiredDocument>,
    projects_epoch: u64,
    documents_epoch: u64,
    submitting: bool,
}

impl ShareWorkflow {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            selection: SelectionState::default(),
            projects: Vec::new(),
            documents: Vec::new(),
            projects_epoch: 0,
            documents_epoch: 0,
            submitting: false,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Companies come from the local cache, immutable for the session
    pub fn companies(&self) -> &[Company] {
        &self.session.companies
    }

    /// Current project options (may hold the sentinel entry)
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Required-document options for the selected project
    pub fn documents(&self) -> &[RequiredDocument] {
        &self.documents
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.selection.note = note.into();
    }

    /// Select a company. Clears the project and document-type selections and
    /// their option lists, and mints the ticket for the project fetch the
    /// caller must now issue.
    pub fn set_company(&mut self, company: Company) -> FetchTicket {
        self.selection.company = Some(company);
        self.selection.project = None;
        self.selection.document_type = None;
        self.projects.clear();
        self.documents.clear();
        self.projects_epoch += 1;
        self.documents_epoch += 1;
        FetchTicket(self.projects_epoch)
    }

    /// Select a project from the current option list. Requires a company;
    /// refuses the sentinel entry. Clears the document-type selection and
    /// mints the ticket for the required-document fetch.
    pub fn set_project(&mut self, project: Project) -> Result<FetchTicket> {
        if self.selection.company.is_none() {
            return Err(ShareError::InvalidState(
                "project selected before company".to_string(),
            ));
        }
        if project.is_sentinel() {
            return Err(ShareError::NoProjectSelected);
        }

        self.selection.project = Some(project);
        self.selection.document_type = None;
        self.documents.clear();
        self.documents_epoch += 1;
        Ok(FetchTicket(self.documents_epoch))
    }

    /// Select a document type. Requires a project, and the document must be a
    /// member of the currently loaded option list.
    pub fn set_document_type(&mut self, document_type_id: i64) -> Result<()> {
        if self.selection.project.is_none() {
            return Err(ShareError::InvalidState(
                "document type selected before project".to_string(),
            ));
        }

        let document = self
            .documents
            .iter()
            .find(|d| d.document_type_id == document_type_id)
            .cloned()
            .ok_or_else(|| {
                ShareError::InvalidState(format!(
                    "document type {document_type_id} is not in the loaded list"
                ))
            })?;

        self.selection.document_type = Some(document);
        Ok(())
    }

    /// Apply the outcome of a project fetch.
    ///
    /// Stale arrivals (ticket minted for an earlier company selection) are
    /// discarded wholesale, errors included. A fresh empty list installs the
    /// sentinel entry; a fresh error leaves the options empty and propagates
    /// so the screen can tell "failed to load" from "no data".
    pub fn apply_projects(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<Vec<Project>>,
    ) -> Result<FetchDisposition> {
        if ticket.0 != self.projects_epoch {
            tracing::debug!(ticket = ticket.0, current = self.projects_epoch, "stale project fetch discarded");
            return Ok(FetchDisposition::Discarded);
        }

        match fetched {
            Ok(projects) => {
                self.projects = if projects.is_empty() {
                    vec![Project::sentinel()]
                } else {
                    projects
                };
                Ok(FetchDisposition::Applied)
            }
            Err(e) => {
                self.projects.clear();
                Err(e)
            }
        }
    }

    /// Apply the outcome of a required-document fetch (same supersession
    /// rules as [`Self::apply_projects`]).
    pub fn apply_documents(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<ProjectDetail>,
    ) -> Result<FetchDisposition> {
        if ticket.0 != self.documents_epoch {
            tracing::debug!(ticket = ticket.0, current = self.documents_epoch, "stale document fetch discarded");
            return Ok(FetchDisposition::Discarded);
        }

        match fetched {
            Ok(detail) => {
                self.documents = detail.required_documents;
                Ok(FetchDisposition::Applied)
            }
            Err(e) => {
                self.documents.clear();
                Err(e)
            }
        }
    }

    /// Whether a submission is currently in flight
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate the current state against the collected items without
    /// touching the network (enables the submit button)
    pub fn validate(&self, items: &[ShareItem]) -> Result<()> {
        DocumentUpload::prepare(
            &self.session,
            self.selection.company.as_ref(),
            self.selection.project.as_ref(),
            self.selection.document_type.as_ref(),
            &self.selection.note,
            items,
        )
        .map(|_| ())
    }

    /// Run the full submission: preconditions, file encoding, one REST call.
    ///
    /// Holds the submission lock until the terminal outcome; a second call
    /// while locked is an [`ShareError::InvalidState`]. On any failure the
    /// selection is left untouched so the user can retry (possibly after
    /// switching document type) without re-selecting company or project.
    pub async fn submit(
        &mut self,
        client: &CapitalClient,
        items: &[ShareItem],
    ) -> Result<UploadOutcome> {
        if self.submitting {
            return Err(ShareError::InvalidState(
                "submission already in progress".to_string(),
            ));
        }

        let upload = DocumentUpload::prepare(
            &self.session,
            self.selection.company.as_ref(),
            self.selection.project.as_ref(),
            self.selection.document_type.as_ref(),
            &self.selection.note,
            items,
        )?;

        self.submitting = true;
        let outcome = upload.submit(client).await;
        self.submitting = false;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_token() -> SessionContext {
        SessionContext {
            user_token: "tok".to_string(),
            companies: vec![
                Company { name: "Acme".to_string(), company_id: 5 },
                Company { name: "Globex".to_string(), company_id: 6 },
            ],
            ..Default::default()
        }
    }

    fn project(id: i64, name: &str, company_id: i64) -> Project {
        Project {
            id,
            name: name.to_string(),
            code: String::new(),
            company_id,
            company_name: String::new(),
        }
    }

    fn document(type_id: i64, name: &str) -> RequiredDocument {
        RequiredDocument {
            document_type_id: type_id,
            document_name: name.to_string(),
            is_required: true,
            is_added: false,
            existing_document_id: None,
        }
    }

    fn detail(documents: Vec<RequiredDocument>) -> ProjectDetail {
        ProjectDetail {
            company_id: 5,
            company_address_id: 0,
            required_documents: documents,
        }
    }

    #[test]
    fn test_dependency_order_enforced() {
        let mut workflow = ShareWorkflow::new(session_with_token());

        // Project before company is a programming error
        assert!(matches!(
            workflow.set_project(project(42, "Roof", 5)),
            Err(ShareError::InvalidState(_))
        ));
        // Document type before project too
        assert!(matches!(
            workflow.set_document_type(1),
            Err(ShareError::InvalidState(_))
        ));
    }

    #[test]
    fn test_company_change_clears_downstream() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();
        let globex = workflow.companies()[1].clone();

        let t1 = workflow.set_company(acme);
        workflow
            .apply_projects(t1, Ok(vec![project(42, "Roof", 5)]))
            .unwrap();
        let t2 = workflow.set_project(project(42, "Roof", 5)).unwrap();
        workflow
            .apply_documents(t2, Ok(detail(vec![document(1, "Invoice")])))
            .unwrap();
        workflow.set_document_type(1).unwrap();
        assert!(workflow.selection().document_type.is_some());

        workflow.set_company(globex);
        assert!(workflow.selection().project.is_none());
        assert!(workflow.selection().document_type.is_none());
        assert!(workflow.projects().is_empty());
        assert!(workflow.documents().is_empty());
    }

    #[test]
    fn test_stale_project_fetch_is_discarded() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();
        let globex = workflow.companies()[1].clone();

        let stale_ticket = workflow.set_company(acme);
        let fresh_ticket = workflow.set_company(globex);

        // The slow fetch for the first company lands after the switch
        let disposition = workflow
            .apply_projects(stale_ticket, Ok(vec![project(1, "Old", 5)]))
            .unwrap();
        assert_eq!(disposition, FetchDisposition::Discarded);
        assert!(workflow.projects().is_empty());

        let disposition = workflow
            .apply_projects(fresh_ticket, Ok(vec![project(2, "New", 6)]))
            .unwrap();
        assert_eq!(disposition, FetchDisposition::Applied);
        assert_eq!(workflow.projects()[0].name, "New");
    }

    #[test]
    fn test_stale_document_fetch_never_overwrites_new_project() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();

        let t = workflow.set_company(acme);
        workflow
            .apply_projects(
                t,
                Ok(vec![project(42, "Roof", 5), project(43, "Solar", 5)]),
            )
            .unwrap();

        let ticket_p = workflow.set_project(project(42, "Roof", 5)).unwrap();
        // User moves on before Roof's documents arrive
        let ticket_q = workflow.set_project(project(43, "Solar", 5)).unwrap();

        let disposition = workflow
            .apply_documents(ticket_p, Ok(detail(vec![document(1, "Roof Plan")])))
            .unwrap();
        assert_eq!(disposition, FetchDisposition::Discarded);
        assert!(workflow.documents().is_empty());

        workflow
            .apply_documents(ticket_q, Ok(detail(vec![document(2, "Solar Permit")])))
            .unwrap();
        assert_eq!(workflow.documents()[0].document_name, "Solar Permit");

        // The selectable document must come from the current project's list
        assert!(workflow.set_document_type(1).is_err());
        workflow.set_document_type(2).unwrap();
        assert_eq!(
            workflow.selection().document_type.as_ref().unwrap().document_type_id,
            2
        );
    }

    #[test]
    fn test_empty_project_list_installs_sentinel() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();

        let t = workflow.set_company(acme);
        workflow.apply_projects(t, Ok(vec![])).unwrap();

        assert_eq!(workflow.projects().len(), 1);
        let sentinel = workflow.projects()[0].clone();
        assert!(sentinel.is_sentinel());

        // The sentinel cannot be progressed past
        assert!(matches!(
            workflow.set_project(sentinel),
            Err(ShareError::NoProjectSelected)
        ));
        // And submission stays blocked on the project precondition
        let err = workflow.validate(&[]).unwrap_err();
        assert!(matches!(err, ShareError::NoProjectSelected));
    }

    #[test]
    fn test_fetch_error_leaves_options_empty_and_propagates() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();

        let t = workflow.set_company(acme);
        let err = workflow
            .apply_projects(
                t,
                Err(ShareError::RequestFailed { status: 500, body: "boom".to_string() }),
            )
            .unwrap_err();
        assert!(matches!(err, ShareError::RequestFailed { status: 500, .. }));
        assert!(workflow.projects().is_empty());
    }

    #[test]
    fn test_stale_error_is_discarded_silently() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();
        let globex = workflow.companies()[1].clone();

        let stale = workflow.set_company(acme);
        let _fresh = workflow.set_company(globex);

        let disposition = workflow
            .apply_projects(
                stale,
                Err(ShareError::RequestFailed { status: 500, body: String::new() }),
            )
            .unwrap();
        assert_eq!(disposition, FetchDisposition::Discarded);
    }

    #[test]
    fn test_selection_survives_failed_validation() {
        let mut workflow = ShareWorkflow::new(session_with_token());
        let acme = workflow.companies()[0].clone();

        let t = workflow.set_company(acme);
        workflow
            .apply_projects(t, Ok(vec![project(42, "Roof", 5)]))
            .unwrap();
        let t = workflow.set_project(project(42, "Roof", 5)).unwrap();
        workflow
            .apply_documents(t, Ok(detail(vec![document(1, "Invoice"), document(2, "Contract")])))
            .unwrap();
        workflow.set_document_type(2).unwrap();

        // No file items: validation fails but the selection is untouched,
        // so the user can retry with a different document type only
        assert!(workflow.validate(&[]).is_err());
        assert!(workflow.selection().company.is_some());
        assert!(workflow.selection().project.is_some());
        workflow.set_document_type(1).unwrap();
        assert_eq!(
            workflow.selection().document_type.as_ref().unwrap().document_name,
            "Invoice"
        );
    }
}
