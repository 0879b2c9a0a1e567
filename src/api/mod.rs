//! Arti Capital service API client
//!
//! REST surface used by the share upload workflow: the catalog reads
//! (projects per company, project detail with required documents) and the
//! single document submission (add or update).

pub mod client;
pub mod catalog;
pub mod upload;

// Re-export commonly used types
pub use catalog::{Company, HeldDocument, Project, ProjectDetail, RequiredDocument};
pub use client::{CapitalClient, ClientConfig};
pub use upload::{DocumentUpload, UploadMode, UploadOutcome};
