uniffi::setup_scaffolding!();

// JNI bridge for Android
#[cfg(target_os = "android")]
mod jni_bridge;

// Core modules
pub mod error;
pub mod api;
pub mod channel;
pub mod file;
pub mod items;
pub mod storage;
pub mod workflow;

// Re-export commonly used types for convenience
pub use error::{Result, ShareError};

/// Crate version, exposed to the host app for diagnostics
#[uniffi::export]
pub fn core_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// MIME probe for the host-side pickers (same closed set the uploader uses)
#[uniffi::export]
pub fn mime_type_for(file_name: String) -> String {
    file::infer_mime_type(&file_name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_version() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("a.pdf".to_string()), "application/pdf");
    }
}
