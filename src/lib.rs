//! PDF JavaScript Sanitizer Library
//!
//! Detects embedded JavaScript actions in PDF documents (document open
//! actions, page events, interactive annotations) and removes them while
//! preserving the rest of the document structure.

pub mod core;
pub mod document;
pub mod error;
pub mod reporting;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::classifier::is_javascript_action;
    pub use crate::core::detector::{
        check_file, contains_javascript, document_contains_javascript, find_javascript, Finding,
    };
    pub use crate::core::driver::{
        remove_javascript, sanitize_document, sanitize_file, SanitizeOutcome, MAX_SANITIZE_PASSES,
    };
    pub use crate::error::{Result, SanitizeError};
    pub use crate::reporting::report::{CheckReport, RemoveReport};
}
